//! Shared helpers used by multiple probe implementations.
//!
//! Everything here is best-effort: a failed open, stat, or query contributes
//! zero bytes and returns silently. Transient buffers that may hold
//! sensitive system data are zeroized before they are dropped.

use std::fs::File;
use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};

use zeroize::Zeroize;

use crate::accumulator::{Accumulate, EntropyAccumulator};
use crate::records::StatRecord;

/// Per-file read cap. Only the first MiB of any sampled file is consumed.
pub const FILE_READ_CAP: usize = 1_048_576;

/// Fixed chunk size for file reads.
pub const FILE_CHUNK: usize = 4096;

/// Sample a file's descriptor, status metadata, and up to [`FILE_READ_CAP`]
/// bytes of content.
///
/// On open failure, contributes nothing. Content is read in
/// [`FILE_CHUNK`]-byte chunks and stops at the first short read or once the
/// cap is reached, so an oversized file contributes exactly the
/// chunk-aligned cap.
pub fn sample_file(acc: &mut dyn EntropyAccumulator, path: &str) {
    let Ok(mut file) = File::open(path) else {
        return;
    };

    // Descriptor value as a small allocation-order signal.
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        file.as_raw_fd().accumulate(acc);
    }
    #[cfg(windows)]
    {
        use std::os::windows::io::AsRawHandle;
        crate::accumulator::Address(file.as_raw_handle() as usize).accumulate(acc);
    }

    if let Ok(meta) = file.metadata() {
        StatRecord::from_metadata(&meta).accumulate(acc);
    }

    let mut chunk = [0u8; FILE_CHUNK];
    let mut total = 0usize;
    loop {
        let n = match file.read(&mut chunk) {
            Ok(n) => n,
            Err(_) => break,
        };
        if n > 0 {
            acc.write(&chunk[..n]);
            total += n;
        }
        if n < FILE_CHUNK || total >= FILE_READ_CAP {
            break;
        }
    }
    chunk.zeroize();
}

/// Sample a path string and its status metadata.
///
/// Appends the path bytes (NUL-terminated) followed by a [`StatRecord`],
/// but only if the path can be stat'ed; contributes nothing otherwise.
pub fn sample_path_stat(acc: &mut dyn EntropyAccumulator, path: &str) {
    let Ok(meta) = std::fs::metadata(path) else {
        return;
    };
    crate::accumulator::write_terminated(acc, path.as_bytes());
    StatRecord::from_metadata(&meta).accumulate(acc);
}

/// Lock-free rate limiter for expensive probes, shared process-wide.
///
/// Holds the wall-clock second of the last successful sample in an atomic;
/// zero means "never sampled". The timestamp is advanced only by
/// [`record`](Self::record) — i.e. only after the guarded probe actually
/// succeeded — so a failed attempt does not charge the window. Two threads
/// racing past [`ready`](Self::ready) in the same instant may both run the
/// probe; the extra bytes are harmless and the atomic store cannot corrupt
/// the timestamp.
pub struct SampleWindow {
    last_secs: AtomicU64,
    interval_secs: u64,
}

impl SampleWindow {
    pub const fn new(interval_secs: u64) -> Self {
        Self {
            last_secs: AtomicU64::new(0),
            interval_secs,
        }
    }

    /// Whether enough wall-clock time has passed since the last successful
    /// sample (or none has ever been taken).
    pub fn ready(&self, now_secs: u64) -> bool {
        let last = self.last_secs.load(Ordering::Relaxed);
        last == 0 || now_secs >= last.saturating_add(self.interval_secs)
    }

    /// Note a successful sample at `now_secs`.
    pub fn record(&self, now_secs: u64) {
        self.last_secs.store(now_secs, Ordering::Relaxed);
    }
}

/// Current wall-clock time in whole seconds since the Unix epoch.
pub fn unix_time_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sample_file_missing_path_contributes_nothing() {
        let mut sink = Vec::new();
        sample_file(&mut sink, "/nonexistent/envseed/fixture");
        assert!(sink.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn sample_file_small_file_full_content() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"environment fixture").unwrap();
        let mut sink = Vec::new();
        sample_file(&mut sink, tmp.path().to_str().unwrap());

        // descriptor proxy + stat record + full content
        let overhead = 4 + StatRecord::ENCODED_LEN;
        assert_eq!(sink.len(), overhead + 19);
        assert!(sink.ends_with(b"environment fixture"));
    }

    #[cfg(unix)]
    #[test]
    fn sample_file_caps_at_one_mebibyte() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        // Cap plus a little over one extra chunk.
        let payload = vec![0xA5u8; FILE_READ_CAP + FILE_CHUNK + 17];
        tmp.write_all(&payload).unwrap();

        let mut sink = Vec::new();
        sample_file(&mut sink, tmp.path().to_str().unwrap());

        let overhead = 4 + StatRecord::ENCODED_LEN;
        assert_eq!(sink.len(), overhead + FILE_READ_CAP);
    }

    #[test]
    fn sample_path_stat_appends_path_then_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().to_str().unwrap();
        let mut sink = Vec::new();
        sample_path_stat(&mut sink, path);
        assert_eq!(sink.len(), path.len() + 1 + StatRecord::ENCODED_LEN);
        assert!(sink.starts_with(path.as_bytes()));
        assert_eq!(sink[path.len()], 0);
    }

    #[test]
    fn sample_path_stat_missing_path_contributes_nothing() {
        let mut sink = Vec::new();
        sample_path_stat(&mut sink, "/nonexistent/envseed/fixture");
        assert!(sink.is_empty());
    }

    #[test]
    fn window_starts_ready() {
        let w = SampleWindow::new(600);
        assert!(w.ready(1_700_000_000));
        assert!(w.ready(0));
    }

    #[test]
    fn window_blocks_within_interval() {
        let w = SampleWindow::new(600);
        w.record(1_700_000_000);
        assert!(!w.ready(1_700_000_000));
        assert!(!w.ready(1_700_000_599));
        assert!(w.ready(1_700_000_600));
    }

    #[test]
    fn window_unchanged_until_success_recorded() {
        let w = SampleWindow::new(600);
        assert!(w.ready(1_700_000_000));
        // A failed probe never calls record(), so the window stays open.
        assert!(w.ready(1_700_000_001));
        w.record(1_700_000_001);
        assert!(!w.ready(1_700_000_002));
    }
}
