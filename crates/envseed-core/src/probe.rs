//! Abstract environment probe trait.
//!
//! Every probe implements [`EnvironmentProbe`]: one narrow, best-effort
//! reader of a single category of system state, with a uniform
//! `sample(accumulator)` entry point. Which probes exist is decided once at
//! build time — the registry in [`crate::probes`] assembles a fixed,
//! platform-specific list instead of scattering conditionals through the
//! samplers.

use crate::accumulator::EntropyAccumulator;

/// How often a probe's output is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Constant for the lifetime of the process (sampled once at startup).
    Static,
    /// Varies between calls (sampled on every reseed).
    Dynamic,
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Metadata about an environment probe.
#[derive(Debug, Clone)]
pub struct ProbeInfo {
    /// Unique identifier (e.g. `"clocks"`).
    pub name: &'static str,
    /// One-line human-readable description of what is sampled.
    pub description: &'static str,
    /// Whether the probe's output is static or dynamic.
    pub cadence: Cadence,
}

/// Trait that every environment probe must implement.
///
/// Probes are pure best-effort: `sample` never fails, never panics on
/// missing OS facilities, and contributes zero bytes when the underlying
/// read is unavailable. No probe reports or logs its own misses.
pub trait EnvironmentProbe: Send + Sync {
    /// Probe metadata.
    fn info(&self) -> &ProbeInfo;

    /// Read this probe's category of system state and append it to the
    /// accumulator. Failures are swallowed and contribute nothing.
    fn sample(&self, acc: &mut dyn EntropyAccumulator);

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
