//! ProcStatsProbe — fast-changing Linux kernel statistics from /proc.
//!
//! These pseudo-files aggregate disk, memory, scheduler, and interrupt
//! activity across the whole machine; their counters move constantly.

use crate::accumulator::EntropyAccumulator;
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

use super::helpers::sample_file;

/// Kernel statistics files consulted on every dynamic pass, in order.
pub const KERNEL_STAT_FILES: &[&str] = &[
    "/proc/diskstats",
    "/proc/vmstat",
    "/proc/schedstat",
    "/proc/zoneinfo",
    "/proc/meminfo",
    "/proc/softirqs",
    "/proc/stat",
    "/proc/self/schedstat",
    "/proc/self/status",
];

pub struct ProcStatsProbe;

static PROC_STATS_INFO: ProbeInfo = ProbeInfo {
    name: "proc_stats",
    description: "Fast-changing /proc statistics: disk, vm, scheduler, interrupts",
    cadence: Cadence::Dynamic,
};

impl EnvironmentProbe for ProcStatsProbe {
    fn info(&self) -> &ProbeInfo {
        &PROC_STATS_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for path in KERNEL_STAT_FILES {
            sample_file(acc, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proc_stats_contributes_bytes() {
        let mut sink = Vec::new();
        ProcStatsProbe.sample(&mut sink);
        // /proc/stat and /proc/self/status exist on any Linux.
        assert!(!sink.is_empty());
    }

    #[test]
    fn file_list_is_fixed() {
        assert_eq!(KERNEL_STAT_FILES.len(), 9);
        assert_eq!(KERNEL_STAT_FILES[0], "/proc/diskstats");
    }
}
