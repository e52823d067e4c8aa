//! The accumulator seam and the per-type serialization contract.
//!
//! Sampled values are mixed into a caller-owned [`EntropyAccumulator`] — an
//! append-only byte sink, usually a streaming hash. This crate never
//! finalizes or reads the digest; it only appends.
//!
//! Every semantic type that enters the accumulator does so through the
//! [`Accumulate`] trait, which fixes the byte layout explicitly (fixed-width
//! little-endian scalars, versioned records). Nothing is ever hashed via its
//! in-memory representation, so the contributed byte stream has a
//! reproducible *structure* on every platform — even though its *content*
//! is, by design, unpredictable.

use sha2::{Digest, Sha256, Sha512};

/// Append-only byte sink for sampled environment data.
///
/// The accumulator is exclusively borrowed for the duration of a sampling
/// pass and has no observable state beyond "append". Callers typically pass
/// a streaming hash and extract the digest afterwards.
pub trait EntropyAccumulator {
    /// Append raw bytes to the accumulator.
    fn write(&mut self, bytes: &[u8]);
}

impl EntropyAccumulator for Sha512 {
    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

impl EntropyAccumulator for Sha256 {
    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

/// Transparent sink. Used by tests to inspect exactly which bytes a probe
/// contributed.
impl EntropyAccumulator for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Explicit "write myself to the accumulator" capability.
///
/// Implemented once per semantic type. There is deliberately no
/// implementation for raw pointers or references: appending a `*const c_char`
/// would hash a pointer value instead of string content. Where a pointer
/// *value* is the entropy (ASLR samples), wrap it in [`Address`].
pub trait Accumulate {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator);
}

macro_rules! accumulate_le {
    ($($t:ty),*) => {
        $(impl Accumulate for $t {
            fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
                acc.write(&self.to_le_bytes());
            }
        })*
    };
}

accumulate_le!(u8, u16, u32, u64, u128, i8, i16, i32, i64);

impl Accumulate for bool {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        acc.write(&[*self as u8]);
    }
}

/// A memory address sampled for its value (ASLR entropy).
///
/// The only sanctioned way to feed a pointer into the accumulator. Encoded
/// as a little-endian `u64` regardless of pointer width.
#[derive(Debug, Clone, Copy)]
pub struct Address(pub usize);

impl Accumulate for Address {
    fn accumulate(&self, acc: &mut dyn EntropyAccumulator) {
        (self.0 as u64).accumulate(acc);
    }
}

/// Append a byte string followed by a NUL terminator.
///
/// The terminator keeps adjacent variable-length strings unambiguous in the
/// byte stream.
pub fn write_terminated(acc: &mut dyn EntropyAccumulator, bytes: &[u8]) {
    acc.write(bytes);
    acc.write(&[0]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_encode_little_endian() {
        let mut sink = Vec::new();
        0x0102u16.accumulate(&mut sink);
        0x0304_0506u32.accumulate(&mut sink);
        assert_eq!(sink, vec![0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn signed_scalars_encode_twos_complement() {
        let mut sink = Vec::new();
        (-1i32).accumulate(&mut sink);
        assert_eq!(sink, vec![0xFF; 4]);
    }

    #[test]
    fn bool_is_one_byte() {
        let mut sink = Vec::new();
        true.accumulate(&mut sink);
        false.accumulate(&mut sink);
        assert_eq!(sink, vec![1, 0]);
    }

    #[test]
    fn address_is_eight_bytes_on_every_platform() {
        let mut sink = Vec::new();
        Address(0x1122_3344).accumulate(&mut sink);
        assert_eq!(sink.len(), 8);
        assert_eq!(&sink[..4], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn terminated_string_framing() {
        let mut sink = Vec::new();
        write_terminated(&mut sink, b"eth0");
        write_terminated(&mut sink, b"");
        assert_eq!(sink, b"eth0\0\0");
    }

    #[test]
    fn sha512_and_vec_see_identical_streams() {
        fn feed(acc: &mut dyn EntropyAccumulator) {
            42u64.accumulate(acc);
            write_terminated(acc, b"probe");
        }

        let mut sink = Vec::new();
        feed(&mut sink);
        let mut hasher = Sha512::new();
        feed(&mut hasher);

        let direct: [u8; 64] = Sha512::digest(&sink).into();
        let streamed: [u8; 64] = hasher.finalize().into();
        assert_eq!(direct, streamed);
    }
}
