//! # envseed-core
//!
//! **Your machine's state is seed material.**
//!
//! `envseed-core` gathers environmental, hardware, and operating-system
//! state — clocks, resource counters, the CPUID table, network interfaces,
//! kernel statistics, well-known file metadata — and mixes it into a
//! caller-owned hash accumulator. The digest becomes supplementary seed
//! material for a CSPRNG: defense in depth beside the OS's own secure RNG,
//! never a replacement for it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use envseed_core::{DynamicEnvSampler, StaticEnvSampler};
//! use sha2::{Digest, Sha512};
//!
//! let mut hasher = Sha512::new();
//!
//! // Once near startup: everything constant for the process lifetime.
//! StaticEnvSampler::new().sample(&mut hasher);
//!
//! // On every reseed: everything expected to change between calls.
//! let dynamic = DynamicEnvSampler::new();
//! dynamic.sample(&mut hasher);
//!
//! // The caller owns finalization and mixes the digest into its RNG pool.
//! let digest = hasher.finalize();
//! # let _ = digest;
//! ```
//!
//! ## Architecture
//!
//! Probes → Samplers → Accumulator (caller's hash)
//!
//! Every probe implements [`EnvironmentProbe`] and is a best-effort reader
//! of one category of system state: a missing file, denied permission,
//! unsupported syscall, or truncated buffer contributes zero bytes and is
//! never reported. A sampling pass cannot fail; a pass in which every probe
//! misses still returns normally and the caller leans on its other entropy
//! sources.
//!
//! The probe set is fixed per build target ([`static_probes`] /
//! [`dynamic_probes`]), and everything enters the accumulator through the
//! explicit [`Accumulate`] serialization contract — no value is ever hashed
//! via its in-memory representation. No entropy *amount* is guaranteed, and
//! sampled data is hashed, never parsed or interpreted.

pub mod accumulator;
pub mod probe;
pub mod probes;
pub mod records;
pub mod sampler;

pub use accumulator::{Accumulate, Address, EntropyAccumulator};
pub use probe::{Cadence, EnvironmentProbe, ProbeInfo};
pub use probes::{dynamic_probes, static_probes};
pub use sampler::{DynamicEnvSampler, StaticEnvSampler};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
