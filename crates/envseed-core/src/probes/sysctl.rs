//! Sysctl probes — kernel metrics via the macOS `sysctl(3)` MIB namespace.
//!
//! macOS has no /proc, so both hardware identity and fast-changing kernel
//! counters are queried by management-information-base (MIB) integer paths.
//! The MIB values below are the classic BSD numbers from Apple's
//! `sys/sysctl.h`; the lists are fixed at compile time. Other BSDs number
//! some of these differently, so the probes are compiled for macOS only —
//! an incorrect constant would silently hash the wrong metric.

use std::io;

use zeroize::Zeroize;

use crate::accumulator::{Accumulate, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

/// Cap on a single sysctl result.
pub const SYSCTL_RESULT_CAP: usize = 65536;

// Top-level categories (sys/sysctl.h).
const CTL_KERN: i32 = 1;
const CTL_VM: i32 = 2;
const CTL_HW: i32 = 6;

// kern.* items.
const KERN_OSTYPE: i32 = 1;
const KERN_OSRELEASE: i32 = 2;
const KERN_OSREV: i32 = 3;
const KERN_VERSION: i32 = 4;
const KERN_HOSTNAME: i32 = 10;
const KERN_HOSTID: i32 = 11;
const KERN_CLOCKRATE: i32 = 12;
const KERN_PROC: i32 = 14;
const KERN_PROC_ALL: i32 = 0;
const KERN_BOOTTIME: i32 = 21;

// vm.* items.
const VM_METER: i32 = 1;
const VM_LOADAVG: i32 = 2;

// hw.* items.
const HW_MACHINE: i32 = 1;
const HW_MODEL: i32 = 2;
const HW_NCPU: i32 = 3;
const HW_PHYSMEM: i32 = 5;
const HW_USERMEM: i32 = 6;
const HW_PAGESIZE: i32 = 7;
const HW_BUS_FREQ: i32 = 14;
const HW_CPU_FREQ: i32 = 15;
const HW_CACHELINE: i32 = 16;

/// Fast-changing kernel metrics, sampled on every dynamic pass.
pub const KERNEL_STAT_KEYS: &[&[i32]] = &[
    &[CTL_KERN, KERN_PROC, KERN_PROC_ALL],
    &[CTL_VM, VM_LOADAVG],
    &[CTL_VM, VM_METER],
];

/// Hardware and kernel identity, sampled once in the static pass.
pub const HARDWARE_KEYS: &[&[i32]] = &[
    &[CTL_HW, HW_MACHINE],
    &[CTL_HW, HW_MODEL],
    &[CTL_HW, HW_NCPU],
    &[CTL_HW, HW_PHYSMEM],
    &[CTL_HW, HW_USERMEM],
    &[CTL_HW, HW_PAGESIZE],
    &[CTL_HW, HW_BUS_FREQ],
    &[CTL_HW, HW_CPU_FREQ],
    &[CTL_HW, HW_CACHELINE],
    &[CTL_KERN, KERN_OSTYPE],
    &[CTL_KERN, KERN_OSRELEASE],
    &[CTL_KERN, KERN_OSREV],
    &[CTL_KERN, KERN_VERSION],
    &[CTL_KERN, KERN_HOSTNAME],
    &[CTL_KERN, KERN_HOSTID],
    &[CTL_KERN, KERN_CLOCKRATE],
    &[CTL_KERN, KERN_BOOTTIME],
];

/// Query one MIB path and append the key tuple, the capped result size, and
/// the result bytes.
///
/// A result larger than the local buffer is a partial success (ENOMEM): the
/// kernel fills what fits, and the capped prefix is appended. Any other
/// failure contributes nothing.
pub fn sample_sysctl(acc: &mut dyn EntropyAccumulator, mib: &[i32]) {
    let mut buf = vec![0u8; SYSCTL_RESULT_CAP];
    let mut size = buf.len();
    // SAFETY: mib names a readable sysctl path; buf/size form a valid
    // out-buffer pair; no new value is being set.
    let ret = unsafe {
        libc::sysctl(
            mib.as_ptr() as *mut i32,
            mib.len() as u32,
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut size,
            std::ptr::null_mut(),
            0,
        )
    };
    let partial = ret == -1
        && io::Error::last_os_error().raw_os_error() == Some(libc::ENOMEM);
    if ret == 0 || partial {
        (mib.len() as u32).accumulate(acc);
        for item in mib {
            item.accumulate(acc);
        }
        let size = size.min(buf.len());
        (size as u64).accumulate(acc);
        acc.write(&buf[..size]);
    }
    buf.zeroize();
}

/// Dynamic probe: process table and VM meters.
pub struct KernelStatsSysctlProbe;

static KERNEL_STATS_INFO: ProbeInfo = ProbeInfo {
    name: "sysctl_stats",
    description: "kern.proc.all and vm load/meter counters via sysctl",
    cadence: Cadence::Dynamic,
};

impl EnvironmentProbe for KernelStatsSysctlProbe {
    fn info(&self) -> &ProbeInfo {
        &KERNEL_STATS_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for mib in KERNEL_STAT_KEYS {
            sample_sysctl(acc, mib);
        }
    }
}

/// Static probe: hardware and kernel identity.
pub struct HardwareSysctlProbe;

static HARDWARE_INFO: ProbeInfo = ProbeInfo {
    name: "sysctl_hardware",
    description: "hw.* and kern.* identity sysctls: machine, model, memory, frequencies, boot time",
    cadence: Cadence::Static,
};

impl EnvironmentProbe for HardwareSysctlProbe {
    fn info(&self) -> &ProbeInfo {
        &HARDWARE_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for mib in HARDWARE_KEYS {
            sample_sysctl(acc, mib);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_keys_contribute_bytes() {
        let mut sink = Vec::new();
        HardwareSysctlProbe.sample(&mut sink);
        assert!(!sink.is_empty());
    }

    #[test]
    fn oversized_result_truncates_to_cap() {
        // kern.proc.all is far larger than the 64 KiB buffer on any live
        // system; the probe must cap the appended size without failing.
        let mut sink = Vec::new();
        sample_sysctl(&mut sink, &[CTL_KERN, KERN_PROC, KERN_PROC_ALL]);
        if !sink.is_empty() {
            // u32 mib len + 3 × i32 + u64 size prefix + payload
            let header = 4 + 3 * 4 + 8;
            assert!(sink.len() <= header + SYSCTL_RESULT_CAP);
        }
    }

    #[test]
    fn bogus_key_is_a_silent_miss() {
        let mut sink = Vec::new();
        sample_sysctl(&mut sink, &[i32::MAX, i32::MAX]);
        assert!(sink.is_empty());
    }
}
