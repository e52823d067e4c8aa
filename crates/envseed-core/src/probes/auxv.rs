//! AuxvProbe — the Linux auxiliary vector via `getauxval(3)`.
//!
//! The loader hands every process hardware capability bitmasks, sixteen
//! kernel-random bytes (AT_RANDOM), and platform/executable strings. The
//! bitmasks are hashed unconditionally (zero when absent); the pointers are
//! dereferenced only when non-null.

use std::ffi::CStr;

use crate::accumulator::{write_terminated, Accumulate, EntropyAccumulator};
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

pub struct AuxvProbe;

static AUXV_INFO: ProbeInfo = ProbeInfo {
    name: "auxv",
    description: "Loader auxiliary vector: hwcaps, AT_RANDOM bytes, platform and exec strings",
    cadence: Cadence::Static,
};

impl EnvironmentProbe for AuxvProbe {
    fn info(&self) -> &ProbeInfo {
        &AUXV_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        // SAFETY: getauxval is always safe to call; unknown types yield 0.
        let hwcap = unsafe { libc::getauxval(libc::AT_HWCAP) };
        (hwcap as u64).accumulate(acc);
        let hwcap2 = unsafe { libc::getauxval(libc::AT_HWCAP2) };
        (hwcap2 as u64).accumulate(acc);

        let random = unsafe { libc::getauxval(libc::AT_RANDOM) };
        if random != 0 {
            // SAFETY: AT_RANDOM, when present, points at 16 bytes the kernel
            // placed on the process stack.
            let bytes = unsafe { std::slice::from_raw_parts(random as *const u8, 16) };
            acc.write(bytes);
        }

        for key in [libc::AT_PLATFORM, libc::AT_EXECFN] {
            let val = unsafe { libc::getauxval(key) };
            if val != 0 {
                // SAFETY: both types, when present, point at NUL-terminated
                // strings that live for the life of the process.
                let s = unsafe { CStr::from_ptr(val as *const libc::c_char) };
                write_terminated(acc, s.to_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auxv_probe_is_deterministic() {
        let (mut a, mut b) = (Vec::new(), Vec::new());
        AuxvProbe.sample(&mut a);
        AuxvProbe.sample(&mut b);
        assert_eq!(a, b);
        // The two hwcap words are always appended.
        assert!(a.len() >= 16);
    }
}
