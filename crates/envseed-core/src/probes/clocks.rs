//! ClockProbe — reads every clock the platform exposes, in a fixed sequence.
//!
//! Clock readings are the workhorse of the dynamic pass: two samples taken
//! at different times differ in their nanosecond fields with overwhelming
//! probability. A clock API that does not exist on the build target is
//! simply absent from the sequence; nothing is substituted.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::accumulator::{Accumulate, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

#[cfg(unix)]
use crate::records::{TimespecRecord, TimevalRecord};

pub struct ClockProbe;

static CLOCK_INFO: ProbeInfo = ProbeInfo {
    name: "clocks",
    description: "Every available clock source: platform counter, POSIX clocks, \
                  gettimeofday, and the standard-library clocks",
    cadence: Cadence::Dynamic,
};

/// Read one POSIX clock; `None` if the kernel rejects the clock id.
#[cfg(unix)]
fn read_clock(id: libc::clockid_t) -> Option<TimespecRecord> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: clock_gettime writes through a valid out-pointer and is
    // side-effect free.
    let ret = unsafe { libc::clock_gettime(id, &mut ts) };
    (ret == 0).then(|| TimespecRecord::from_timespec(&ts))
}

/// Raw tick count of the CPU counter since boot (macOS proprietary clock).
#[cfg(target_os = "macos")]
fn mach_time() -> u64 {
    unsafe extern "C" {
        fn mach_absolute_time() -> u64;
    }
    // SAFETY: mach_absolute_time() is a stable macOS API that returns the
    // current value of the system absolute time counter. Always safe to call.
    unsafe { mach_absolute_time() }
}

/// Nanoseconds elapsed against a process-local monotonic epoch.
fn process_clock_nanos() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}

impl EnvironmentProbe for ClockProbe {
    fn info(&self) -> &ProbeInfo {
        &CLOCK_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        // Platform-proprietary counter first.
        #[cfg(target_os = "macos")]
        mach_time().accumulate(acc);

        // POSIX clocks, fixed order.
        #[cfg(unix)]
        {
            if let Some(ts) = read_clock(libc::CLOCK_MONOTONIC) {
                ts.accumulate(acc);
            }
            if let Some(ts) = read_clock(libc::CLOCK_REALTIME) {
                ts.accumulate(acc);
            }
            #[cfg(target_os = "linux")]
            if let Some(ts) = read_clock(libc::CLOCK_BOOTTIME) {
                ts.accumulate(acc);
            }

            // Microsecond-precision wall clock, available on all UNIX systems.
            let mut tv = libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            };
            // SAFETY: gettimeofday writes through a valid out-pointer; a null
            // timezone argument is the documented modern usage.
            if unsafe { libc::gettimeofday(&mut tv, std::ptr::null_mut()) } == 0 {
                TimevalRecord::from_timeval(&tv).accumulate(acc);
            }
        }

        // Probably redundant with the above, but also the clocks the
        // standard library provides.
        if let Ok(since_epoch) = SystemTime::now().duration_since(UNIX_EPOCH) {
            since_epoch.as_nanos().accumulate(acc);
        }
        process_clock_nanos().accumulate(acc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::EnvironmentProbe;

    #[test]
    fn clock_probe_contributes_bytes() {
        let mut sink = Vec::new();
        ClockProbe.sample(&mut sink);
        assert!(!sink.is_empty());
    }

    #[test]
    fn two_spaced_samples_differ() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        ClockProbe.sample(&mut a);
        std::thread::sleep(std::time::Duration::from_millis(2));
        ClockProbe.sample(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn process_clock_is_monotonic() {
        let t1 = process_clock_nanos();
        let t2 = process_clock_nanos();
        assert!(t2 >= t1);
    }

    #[cfg(unix)]
    #[test]
    fn bogus_clock_id_is_a_silent_miss() {
        assert!(read_clock(i32::MAX as libc::clockid_t).is_none());
    }
}
