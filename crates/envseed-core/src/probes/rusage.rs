//! RusageProbe — process resource-usage counters via `getrusage(2)`.
//!
//! Page faults, block I/O, and context-switch counts advance with every bit
//! of work the process does, so consecutive snapshots rarely agree.

use crate::accumulator::{Accumulate, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};
use crate::records::RusageRecord;

pub struct RusageProbe;

static RUSAGE_INFO: ProbeInfo = ProbeInfo {
    name: "rusage",
    description: "getrusage(RUSAGE_SELF) counters: CPU time, faults, I/O, context switches",
    cadence: Cadence::Dynamic,
};

impl EnvironmentProbe for RusageProbe {
    fn info(&self) -> &ProbeInfo {
        &RUSAGE_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
        // SAFETY: RUSAGE_SELF with a valid out-pointer; the kernel fills the
        // struct on success.
        if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut ru) } == 0 {
            RusageRecord::from_rusage(&ru).accumulate(acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rusage_probe_contributes_one_record() {
        let mut sink = Vec::new();
        RusageProbe.sample(&mut sink);
        assert_eq!(sink.len(), RusageRecord::ENCODED_LEN);
    }
}
