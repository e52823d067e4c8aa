//! Canonical fixed-layout records for OS-provided data.
//!
//! The kernel hands back binary structures (`stat`, `rusage`, `timespec`,
//! socket addresses) whose in-memory layout varies by architecture and libc,
//! and which may contain uninitialized padding. Hashing them as raw memory
//! would make the contributed byte stream an accident of the ABI. Each record
//! here instead declares an explicit, versioned, field-by-field layout: a
//! leading version byte, then every field as a fixed-width little-endian
//! scalar, in declaration order. Struct padding is never serialized; the tiny
//! amount of incidental entropy it might have carried is intentionally
//! forgone.

use crate::accumulator::{Accumulate, EntropyAccumulator};

/// A `clock_gettime`-style instant: seconds and nanoseconds.
///
/// Layout v1: `sec: i64`, `nsec: i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimespecRecord {
    pub sec: i64,
    pub nsec: i64,
}

impl TimespecRecord {
    pub const VERSION: u8 = 1;
    pub const ENCODED_LEN: usize = 1 + 8 + 8;

    #[cfg(unix)]
    pub fn from_timespec(ts: &libc::timespec) -> Self {
        Self {
            sec: ts.tv_sec as i64,
            nsec: ts.tv_nsec as i64,
        }
    }
}

impl Accumulate for TimespecRecord {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        Self::VERSION.accumulate(acc);
        self.sec.accumulate(acc);
        self.nsec.accumulate(acc);
    }
}

/// A `gettimeofday`-style instant: seconds and microseconds.
///
/// Layout v1: `sec: i64`, `usec: i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimevalRecord {
    pub sec: i64,
    pub usec: i64,
}

impl TimevalRecord {
    pub const VERSION: u8 = 1;
    pub const ENCODED_LEN: usize = 1 + 8 + 8;

    #[cfg(unix)]
    pub fn from_timeval(tv: &libc::timeval) -> Self {
        Self {
            sec: tv.tv_sec as i64,
            usec: tv.tv_usec as i64,
        }
    }
}

impl Accumulate for TimevalRecord {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        Self::VERSION.accumulate(acc);
        self.sec.accumulate(acc);
        self.usec.accumulate(acc);
    }
}

/// File status metadata, independent of the platform `stat` layout.
///
/// Layout v1 (Unix): `dev: u64`, `ino: u64`, `mode: u32`, `nlink: u64`,
/// `uid: u32`, `gid: u32`, `rdev: u64`, `size: u64`, then atime/mtime/ctime
/// as `(sec: i64, nsec: i64)` pairs, then `blksize: u64`, `blocks: u64`.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRecord {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    pub atime: i64,
    pub atime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub blksize: u64,
    pub blocks: u64,
}

#[cfg(unix)]
impl StatRecord {
    pub const VERSION: u8 = 1;
    pub const ENCODED_LEN: usize = 1 + 8 + 8 + 4 + 8 + 4 + 4 + 8 + 8 + 6 * 8 + 8 + 8;

    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
            mode: meta.mode(),
            nlink: meta.nlink(),
            uid: meta.uid(),
            gid: meta.gid(),
            rdev: meta.rdev(),
            size: meta.size(),
            atime: meta.atime(),
            atime_nsec: meta.atime_nsec(),
            mtime: meta.mtime(),
            mtime_nsec: meta.mtime_nsec(),
            ctime: meta.ctime(),
            ctime_nsec: meta.ctime_nsec(),
            blksize: meta.blksize(),
            blocks: meta.blocks(),
        }
    }
}

#[cfg(unix)]
impl Accumulate for StatRecord {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        Self::VERSION.accumulate(acc);
        self.dev.accumulate(acc);
        self.ino.accumulate(acc);
        self.mode.accumulate(acc);
        self.nlink.accumulate(acc);
        self.uid.accumulate(acc);
        self.gid.accumulate(acc);
        self.rdev.accumulate(acc);
        self.size.accumulate(acc);
        self.atime.accumulate(acc);
        self.atime_nsec.accumulate(acc);
        self.mtime.accumulate(acc);
        self.mtime_nsec.accumulate(acc);
        self.ctime.accumulate(acc);
        self.ctime_nsec.accumulate(acc);
        self.blksize.accumulate(acc);
        self.blocks.accumulate(acc);
    }
}

/// File status metadata on Windows.
///
/// Layout v1: `attributes: u32`, `creation: u64`, `last_access: u64`,
/// `last_write: u64`, `size: u64` (FILETIME ticks for the three times).
#[cfg(windows)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRecord {
    pub attributes: u32,
    pub creation: u64,
    pub last_access: u64,
    pub last_write: u64,
    pub size: u64,
}

#[cfg(windows)]
impl StatRecord {
    pub const VERSION: u8 = 1;
    pub const ENCODED_LEN: usize = 1 + 4 + 8 + 8 + 8 + 8;

    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::os::windows::fs::MetadataExt;
        Self {
            attributes: meta.file_attributes(),
            creation: meta.creation_time(),
            last_access: meta.last_access_time(),
            last_write: meta.last_write_time(),
            size: meta.file_size(),
        }
    }
}

#[cfg(windows)]
impl Accumulate for StatRecord {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        Self::VERSION.accumulate(acc);
        self.attributes.accumulate(acc);
        self.creation.accumulate(acc);
        self.last_access.accumulate(acc);
        self.last_write.accumulate(acc);
        self.size.accumulate(acc);
    }
}

/// Process resource-usage counters from `getrusage(2)`.
///
/// Layout v1: user time, system time (both [`TimevalRecord`]), then the
/// fourteen classic `ru_*` counters as `i64` in header order.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RusageRecord {
    pub utime: TimevalRecord,
    pub stime: TimevalRecord,
    pub maxrss: i64,
    pub ixrss: i64,
    pub idrss: i64,
    pub isrss: i64,
    pub minflt: i64,
    pub majflt: i64,
    pub nswap: i64,
    pub inblock: i64,
    pub oublock: i64,
    pub msgsnd: i64,
    pub msgrcv: i64,
    pub nsignals: i64,
    pub nvcsw: i64,
    pub nivcsw: i64,
}

#[cfg(unix)]
impl RusageRecord {
    pub const VERSION: u8 = 1;
    pub const ENCODED_LEN: usize = 1 + 2 * TimevalRecord::ENCODED_LEN + 14 * 8;

    pub fn from_rusage(ru: &libc::rusage) -> Self {
        Self {
            utime: TimevalRecord::from_timeval(&ru.ru_utime),
            stime: TimevalRecord::from_timeval(&ru.ru_stime),
            maxrss: ru.ru_maxrss as i64,
            ixrss: ru.ru_ixrss as i64,
            idrss: ru.ru_idrss as i64,
            isrss: ru.ru_isrss as i64,
            minflt: ru.ru_minflt as i64,
            majflt: ru.ru_majflt as i64,
            nswap: ru.ru_nswap as i64,
            inblock: ru.ru_inblock as i64,
            oublock: ru.ru_oublock as i64,
            msgsnd: ru.ru_msgsnd as i64,
            msgrcv: ru.ru_msgrcv as i64,
            nsignals: ru.ru_nsignals as i64,
            nvcsw: ru.ru_nvcsw as i64,
            nivcsw: ru.ru_nivcsw as i64,
        }
    }
}

#[cfg(unix)]
impl Accumulate for RusageRecord {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        Self::VERSION.accumulate(acc);
        self.utime.accumulate(acc);
        self.stime.accumulate(acc);
        for counter in [
            self.maxrss,
            self.ixrss,
            self.idrss,
            self.isrss,
            self.minflt,
            self.majflt,
            self.nswap,
            self.inblock,
            self.oublock,
            self.msgsnd,
            self.msgrcv,
            self.nsignals,
            self.nvcsw,
            self.nivcsw,
        ] {
            counter.accumulate(acc);
        }
    }
}

/// A socket address truncated to its address family's meaningful fields.
///
/// Layout v1: the raw family tag as `u16`, then a one-byte payload
/// discriminant (0 = none, 4 = IPv4, 6 = IPv6) followed by the payload:
/// IPv4 is `port: u16` + 4 address bytes; IPv6 is `port: u16`,
/// `flowinfo: u32`, 16 address bytes, `scope: u32`. Unrecognized families
/// contribute only the tag.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SockaddrRecord {
    pub family: u16,
    pub payload: SockaddrPayload,
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SockaddrPayload {
    None,
    V4 {
        port: u16,
        addr: [u8; 4],
    },
    V6 {
        port: u16,
        flowinfo: u32,
        addr: [u8; 16],
        scope: u32,
    },
}

#[cfg(unix)]
impl SockaddrRecord {
    pub const VERSION: u8 = 1;

    /// Decode a kernel-provided `sockaddr`, keeping only the fields that the
    /// reported address family actually defines.
    ///
    /// # Safety
    ///
    /// `addr`, if non-null, must point at a `sockaddr` of at least the size
    /// implied by its `sa_family` field (as guaranteed by `getifaddrs`).
    pub unsafe fn from_raw(addr: *const libc::sockaddr) -> Option<Self> {
        if addr.is_null() {
            return None;
        }
        // SAFETY: caller guarantees `addr` points at a valid sockaddr; reads
        // are unaligned-safe.
        unsafe {
            let family = (*addr).sa_family as u16;
            let payload = match family as i32 {
                libc::AF_INET => {
                    let sin = std::ptr::read_unaligned(addr as *const libc::sockaddr_in);
                    SockaddrPayload::V4 {
                        port: u16::from_be(sin.sin_port),
                        addr: sin.sin_addr.s_addr.to_ne_bytes(),
                    }
                }
                libc::AF_INET6 => {
                    let sin6 = std::ptr::read_unaligned(addr as *const libc::sockaddr_in6);
                    SockaddrPayload::V6 {
                        port: u16::from_be(sin6.sin6_port),
                        flowinfo: sin6.sin6_flowinfo,
                        addr: sin6.sin6_addr.s6_addr,
                        scope: sin6.sin6_scope_id,
                    }
                }
                _ => SockaddrPayload::None,
            };
            Some(Self { family, payload })
        }
    }
}

#[cfg(unix)]
impl Accumulate for SockaddrRecord {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        Self::VERSION.accumulate(acc);
        self.family.accumulate(acc);
        match self.payload {
            SockaddrPayload::None => 0u8.accumulate(acc),
            SockaddrPayload::V4 { port, addr } => {
                4u8.accumulate(acc);
                port.accumulate(acc);
                acc.write(&addr);
            }
            SockaddrPayload::V6 {
                port,
                flowinfo,
                addr,
                scope,
            } => {
                6u8.accumulate(acc);
                port.accumulate(acc);
                flowinfo.accumulate(acc);
                acc.write(&addr);
                scope.accumulate(acc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timespec_encoded_len_matches() {
        let mut sink = Vec::new();
        TimespecRecord { sec: 1, nsec: 2 }.accumulate(&mut sink);
        assert_eq!(sink.len(), TimespecRecord::ENCODED_LEN);
        assert_eq!(sink[0], TimespecRecord::VERSION);
    }

    #[test]
    fn timeval_encoded_len_matches() {
        let mut sink = Vec::new();
        TimevalRecord { sec: 1, usec: 2 }.accumulate(&mut sink);
        assert_eq!(sink.len(), TimevalRecord::ENCODED_LEN);
    }

    #[test]
    fn stat_record_encoded_len_matches() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let meta = tmp.path().metadata().unwrap();
        let rec = StatRecord::from_metadata(&meta);
        let mut sink = Vec::new();
        rec.accumulate(&mut sink);
        assert_eq!(sink.len(), StatRecord::ENCODED_LEN);
    }

    #[test]
    fn stat_record_is_deterministic_for_unchanged_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let a = StatRecord::from_metadata(&tmp.path().metadata().unwrap());
        let b = StatRecord::from_metadata(&tmp.path().metadata().unwrap());
        let (mut sa, mut sb) = (Vec::new(), Vec::new());
        a.accumulate(&mut sa);
        b.accumulate(&mut sb);
        assert_eq!(sa, sb);
    }

    #[cfg(unix)]
    #[test]
    fn rusage_encoded_len_matches() {
        let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
        // SAFETY: RUSAGE_SELF with a valid out-pointer.
        let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut ru) };
        assert_eq!(ret, 0);
        let mut sink = Vec::new();
        RusageRecord::from_rusage(&ru).accumulate(&mut sink);
        assert_eq!(sink.len(), RusageRecord::ENCODED_LEN);
    }

    #[cfg(unix)]
    #[test]
    fn sockaddr_v4_roundtrip_fields() {
        let mut sin: libc::sockaddr_in = unsafe { std::mem::zeroed() };
        sin.sin_family = libc::AF_INET as libc::sa_family_t;
        sin.sin_port = 8333u16.to_be();
        sin.sin_addr.s_addr = u32::from_ne_bytes([127, 0, 0, 1]);
        let rec = unsafe {
            SockaddrRecord::from_raw(&sin as *const libc::sockaddr_in as *const libc::sockaddr)
        }
        .unwrap();
        assert_eq!(rec.family, libc::AF_INET as u16);
        assert_eq!(
            rec.payload,
            SockaddrPayload::V4 {
                port: 8333,
                addr: [127, 0, 0, 1]
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn sockaddr_unknown_family_contributes_tag_only() {
        let mut sa: libc::sockaddr = unsafe { std::mem::zeroed() };
        sa.sa_family = 250 as libc::sa_family_t;
        let rec = unsafe { SockaddrRecord::from_raw(&sa as *const libc::sockaddr) }.unwrap();
        assert_eq!(rec.payload, SockaddrPayload::None);
        let mut sink = Vec::new();
        rec.accumulate(&mut sink);
        // version + family + payload discriminant
        assert_eq!(sink.len(), 1 + 2 + 1);
    }

    #[cfg(unix)]
    #[test]
    fn sockaddr_null_is_none() {
        assert!(unsafe { SockaddrRecord::from_raw(std::ptr::null()) }.is_none());
    }
}
