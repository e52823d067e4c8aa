//! Address-space probes — capture where the loader and allocator put things
//! (ASLR entropy).

use crate::accumulator::{Accumulate, Address, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

/// Static probe: addresses of items whose placement is fixed at load time.
///
/// The code segment, static data, and the accumulator object itself land at
/// addresses randomized once per process by the loader, so these values are
/// stable within a run but unpredictable across runs.
pub struct AddressProbe;

static ADDRESS_INFO: ProbeInfo = ProbeInfo {
    name: "load_addresses",
    description: "Addresses of a static item, a function, and the accumulator (ASLR)",
    cadence: Cadence::Static,
};

static ANCHOR: u8 = 0;

fn code_anchor() {}

impl EnvironmentProbe for AddressProbe {
    fn info(&self) -> &ProbeInfo {
        &ADDRESS_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        Address(&ANCHOR as *const u8 as usize).accumulate(acc);
        Address((code_anchor as fn()) as usize).accumulate(acc);
        Address(acc as *mut dyn EntropyAccumulator as *mut () as usize).accumulate(acc);
    }
}

/// Dynamic probe: a stack address and the address of a throwaway heap
/// allocation.
///
/// The allocation is one byte past a page (4097 bytes) so the allocator
/// takes the large-object path; where it lands varies with heap state.
pub struct AllocationProbe;

static ALLOCATION_INFO: ProbeInfo = ProbeInfo {
    name: "fresh_allocation",
    description: "Stack address and the address of a fresh 4097-byte heap allocation",
    cadence: Cadence::Dynamic,
};

impl EnvironmentProbe for AllocationProbe {
    fn info(&self) -> &ProbeInfo {
        &ALLOCATION_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        let stack_probe = 0u8;
        let block: Vec<u8> = Vec::with_capacity(4097);
        Address(&stack_probe as *const u8 as usize).accumulate(acc);
        Address(block.as_ptr() as usize).accumulate(acc);
        drop(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_probe_is_stable_within_a_process() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        AddressProbe.sample(&mut a);
        AddressProbe.sample(&mut b);
        // First two terms (static item, function) are load-time constants;
        // the third is the accumulator's own address and may differ.
        assert_eq!(a[..16], b[..16]);
        assert_eq!(a.len(), 24);
    }

    #[test]
    fn allocation_probe_contributes_two_addresses() {
        let mut sink = Vec::new();
        AllocationProbe.sample(&mut sink);
        assert_eq!(sink.len(), 16);
        assert!(sink.iter().any(|&b| b != 0));
    }
}
