//! System identity probes: build constants, kernel identification, fixed
//! paths and configuration files, the environment block, and process ids.

use crate::accumulator::{write_terminated, Accumulate, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

#[cfg(unix)]
use super::helpers::{sample_file, sample_path_stat};

/// Compile-time identity of this build: type widths, target strings, the
/// toolchain floor, and the embedded crate version.
pub struct BuildInfoProbe;

static BUILD_INFO: ProbeInfo = ProbeInfo {
    name: "build_info",
    description: "Type widths, target arch/os/family, toolchain floor, crate version",
    cadence: Cadence::Static,
};

impl EnvironmentProbe for BuildInfoProbe {
    fn info(&self) -> &ProbeInfo {
        &BUILD_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        // Signedness of C char and the basic type widths.
        ((libc::c_char::MIN as i64) < 0).accumulate(acc);
        (size_of::<*const u8>() as u64).accumulate(acc);
        (size_of::<libc::c_long>() as u64).accumulate(acc);
        (size_of::<libc::c_int>() as u64).accumulate(acc);
        (size_of::<usize>() as u64).accumulate(acc);

        write_terminated(acc, std::env::consts::ARCH.as_bytes());
        write_terminated(acc, std::env::consts::OS.as_bytes());
        write_terminated(acc, std::env::consts::FAMILY.as_bytes());

        // Toolchain floor (rust-version) and the application version.
        write_terminated(acc, env!("CARGO_PKG_RUST_VERSION").as_bytes());
        write_terminated(acc, env!("CARGO_PKG_VERSION").as_bytes());
    }
}

/// Kernel identification via `uname(2)`.
#[cfg(unix)]
pub struct UnameProbe;

#[cfg(unix)]
static UNAME_INFO: ProbeInfo = ProbeInfo {
    name: "uname",
    description: "uname(2): sysname, nodename, release, version, machine",
    cadence: Cadence::Static,
};

#[cfg(unix)]
fn write_uname_field(acc: &mut dyn EntropyAccumulator, field: &[libc::c_char]) {
    let bytes: Vec<u8> = field
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    write_terminated(acc, &bytes);
}

#[cfg(unix)]
impl EnvironmentProbe for UnameProbe {
    fn info(&self) -> &ProbeInfo {
        &UNAME_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
        // SAFETY: uname fills the struct through a valid out-pointer.
        if unsafe { libc::uname(&mut uts) } != -1 {
            write_uname_field(acc, &uts.sysname);
            write_uname_field(acc, &uts.nodename);
            write_uname_field(acc, &uts.release);
            write_uname_field(acc, &uts.version);
            write_uname_field(acc, &uts.machine);
        }
    }
}

/// Metadata for a fixed list of well-known directories.
#[cfg(unix)]
pub struct PathMetadataProbe;

#[cfg(unix)]
static PATH_METADATA_INFO: ProbeInfo = ProbeInfo {
    name: "path_metadata",
    description: "stat metadata for a fixed list of well-known directories",
    cadence: Cadence::Static,
};

/// Directories consulted identically on every static pass, in order.
#[cfg(unix)]
pub const WELL_KNOWN_PATHS: &[&str] = &["/", ".", "/tmp", "/home", "/proc"];

#[cfg(unix)]
impl EnvironmentProbe for PathMetadataProbe {
    fn info(&self) -> &ProbeInfo {
        &PATH_METADATA_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for path in WELL_KNOWN_PATHS {
            sample_path_stat(acc, path);
        }
    }
}

/// Content of a fixed list of configuration and pseudo-files.
#[cfg(unix)]
pub struct ConfigFileProbe;

#[cfg(unix)]
static CONFIG_FILE_INFO: ProbeInfo = ProbeInfo {
    name: "config_files",
    description: "Fixed configuration/pseudo-files: kernel identity and host configuration",
    cadence: Cadence::Static,
};

/// Kernel identity pseudo-files (Linux), consulted before the /etc list.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const KERNEL_ID_FILES: &[&str] = &["/proc/cmdline", "/proc/cpuinfo", "/proc/version"];

/// Host configuration files common to UNIX systems.
#[cfg(unix)]
pub const HOST_CONFIG_FILES: &[&str] = &[
    "/etc/passwd",
    "/etc/group",
    "/etc/hosts",
    "/etc/resolv.conf",
    "/etc/timezone",
    "/etc/localtime",
];

#[cfg(unix)]
impl EnvironmentProbe for ConfigFileProbe {
    fn info(&self) -> &ProbeInfo {
        &CONFIG_FILE_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        for path in KERNEL_ID_FILES {
            sample_file(acc, path);
        }
        for path in HOST_CONFIG_FILES {
            sample_file(acc, path);
        }
    }
}

/// The full process environment block.
pub struct EnvironProbe;

static ENVIRON_INFO: ProbeInfo = ProbeInfo {
    name: "environ",
    description: "Every environment variable as key=value",
    cadence: Cadence::Static,
};

impl EnvironmentProbe for EnvironProbe {
    fn info(&self) -> &ProbeInfo {
        &ENVIRON_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for (key, value) in std::env::vars_os() {
            #[cfg(unix)]
            {
                use std::os::unix::ffi::OsStrExt;
                acc.write(key.as_bytes());
                acc.write(b"=");
                acc.write(value.as_bytes());
                acc.write(&[0]);
            }
            #[cfg(not(unix))]
            {
                acc.write(key.to_string_lossy().as_bytes());
                acc.write(b"=");
                acc.write(value.to_string_lossy().as_bytes());
                acc.write(&[0]);
            }
        }
    }
}

/// Process, thread, user, group, and session identifiers.
pub struct ProcessIdProbe;

static PROCESS_ID_INFO: ProbeInfo = ProbeInfo {
    name: "process_ids",
    description: "pid, ppid, session, group, user ids and the thread handle",
    cadence: Cadence::Static,
};

impl EnvironmentProbe for ProcessIdProbe {
    fn info(&self) -> &ProbeInfo {
        &PROCESS_ID_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        std::process::id().accumulate(acc);

        #[cfg(unix)]
        {
            // SAFETY: all of these id calls are always safe; error returns
            // (-1) are hashed as-is like any other value.
            unsafe {
                libc::getppid().accumulate(acc);
                libc::getsid(0).accumulate(acc);
                libc::getpgid(0).accumulate(acc);
                libc::getuid().accumulate(acc);
                libc::geteuid().accumulate(acc);
                libc::getgid().accumulate(acc);
                libc::getegid().accumulate(acc);
                (libc::pthread_self() as u64).accumulate(acc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_is_deterministic() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        BuildInfoProbe.sample(&mut a);
        BuildInfoProbe.sample(&mut b);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn uname_is_deterministic() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        UnameProbe.sample(&mut a);
        UnameProbe.sample(&mut b);
        assert_eq!(a, b);
        // Five NUL-terminated fields.
        assert!(a.iter().filter(|&&c| c == 0).count() >= 5);
    }

    #[cfg(unix)]
    #[test]
    fn path_metadata_contributes_bytes() {
        let mut sink = Vec::new();
        PathMetadataProbe.sample(&mut sink);
        // "/" always stats.
        assert!(!sink.is_empty());
    }

    #[test]
    fn environ_matches_the_live_environment() {
        let count = std::env::vars_os().count();
        let mut sink = Vec::new();
        EnvironProbe.sample(&mut sink);
        if count > 0 {
            assert!(sink.iter().filter(|&&c| c == 0).count() >= count);
        }
    }

    #[test]
    fn process_ids_are_deterministic_within_a_thread() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        ProcessIdProbe.sample(&mut a);
        ProcessIdProbe.sample(&mut b);
        assert_eq!(a, b);
    }
}
