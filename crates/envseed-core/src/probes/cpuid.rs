//! CpuidProbe — the full CPU identification table on x86/x86_64.
//!
//! Walks every standard leaf up to the maximum the CPU reports, iterating
//! sub-leaves for the leaves documented to carry them (4: cache topology,
//! 11: extended topology, 13: XSAVE state) until each leaf's stop
//! condition, then every extended leaf. Each query appends the leaf,
//! sub-leaf, and all four output registers.

#[cfg(target_arch = "x86")]
use core::arch::x86::{CpuidResult, __cpuid_count};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{CpuidResult, __cpuid_count};

use crate::accumulator::{Accumulate, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

pub struct CpuidProbe;

static CPUID_INFO: ProbeInfo = ProbeInfo {
    name: "cpuid",
    description: "Complete CPUID leaf/sub-leaf table: vendor, features, topology, caches",
    cadence: Cadence::Static,
};

/// Issue one CPUID query and append leaf, sub-leaf, and all four registers.
fn add_cpuid(acc: &mut dyn EntropyAccumulator, leaf: u32, subleaf: u32) -> CpuidResult {
    // SAFETY: CPUID is unprivileged and available on every x86_64 CPU; the
    // x86 build of this crate assumes the same (anything that can run the
    // host process can execute CPUID).
    let regs = unsafe { __cpuid_count(leaf, subleaf) };
    leaf.accumulate(acc);
    subleaf.accumulate(acc);
    regs.eax.accumulate(acc);
    regs.ebx.accumulate(acc);
    regs.ecx.accumulate(acc);
    regs.edx.accumulate(acc);
    regs
}

impl EnvironmentProbe for CpuidProbe {
    fn info(&self) -> &ProbeInfo {
        &CPUID_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        // Leaf 0 reports the maximum standard leaf in eax.
        let max = add_cpuid(acc, 0, 0).eax;
        for leaf in 1..=max {
            let mut subleaf = 0;
            loop {
                let regs = add_cpuid(acc, leaf, subleaf);
                // Only leaves 4, 11, and 13 carry sub-leaves.
                if leaf != 4 && leaf != 11 && leaf != 13 {
                    break;
                }
                // Leaves 4 and 13 end at an all-zero eax; leaf 11 ends when
                // the level type (ecx bits 8..16) reads zero.
                if (leaf == 4 || leaf == 13) && regs.eax == 0 {
                    break;
                }
                if leaf == 11 && (regs.ecx & 0xFF00) == 0 {
                    break;
                }
                subleaf += 1;
            }
        }

        // Extended range: leaf 0x8000_0000 reports the maximum extended
        // leaf in eax.
        let ext_max = add_cpuid(acc, 0x8000_0000, 0).eax;
        for leaf in 0x8000_0001..=ext_max {
            add_cpuid(acc, leaf, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpuid_probe_walks_the_same_leaves_every_time() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        CpuidProbe.sample(&mut a);
        CpuidProbe.sample(&mut b);
        // Byte-for-byte equality is not guaranteed (leaf 1/11 echo the APIC
        // id of whichever core runs the query), but the leaf walk is fixed.
        assert_eq!(a.len(), b.len());
        assert!(!a.is_empty());
    }

    #[test]
    fn each_query_appends_six_words() {
        let mut sink = Vec::new();
        add_cpuid(&mut sink, 0, 0);
        assert_eq!(sink.len(), 24);
        // The leaf and sub-leaf echo back first.
        assert_eq!(&sink[..8], &[0u8; 8]);
    }
}
