//! The two sampling passes: static (once at startup) and dynamic (every
//! reseed).
//!
//! Each sampler owns a fixed, platform-chosen list of probes and drives them
//! sequentially against the caller's accumulator. A probe that reads nothing
//! contributes nothing; the pass always completes. A pass in which every
//! probe misses still returns normally — the caller's other entropy sources
//! carry the seed.

use crate::accumulator::EntropyAccumulator;
use crate::probe::EnvironmentProbe;
use crate::probes;

/// One-shot sampler for state that is constant for the process lifetime:
/// build and toolchain identity, CPU feature table, hostname, network
/// interfaces, kernel identification, fixed path and file metadata, the
/// environment block, and process/user/group ids.
///
/// Call [`sample`](Self::sample) once near startup.
pub struct StaticEnvSampler {
    probes: Vec<Box<dyn EnvironmentProbe>>,
}

impl StaticEnvSampler {
    pub fn new() -> Self {
        Self {
            probes: probes::static_probes(),
        }
    }

    /// Run every static probe, in fixed order, against `acc`.
    pub fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for probe in &self.probes {
            probe.sample(acc);
        }
        log::trace!("static environment pass complete ({} probes)", self.probes.len());
    }

    /// Number of probes compiled into this build.
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Probe names, in sampling order.
    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }
}

impl Default for StaticEnvSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Repeatable sampler for state expected to change between calls: the
/// rate-limited performance-counter registry (Windows), every available
/// clock, resource-usage counters, fast-changing kernel statistics, and a
/// fresh-allocation address sample.
///
/// Call [`sample`](Self::sample) on every reseed.
pub struct DynamicEnvSampler {
    probes: Vec<Box<dyn EnvironmentProbe>>,
}

impl DynamicEnvSampler {
    pub fn new() -> Self {
        Self {
            probes: probes::dynamic_probes(),
        }
    }

    /// Run every dynamic probe, in fixed order, against `acc`.
    pub fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        for probe in &self.probes {
            probe.sample(acc);
        }
        log::trace!("dynamic environment pass complete ({} probes)", self.probes.len());
    }

    /// Number of probes compiled into this build.
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Probe names, in sampling order.
    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }
}

impl Default for DynamicEnvSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Cadence;

    #[test]
    fn static_sampler_has_probes() {
        let sampler = StaticEnvSampler::new();
        assert!(sampler.probe_count() >= 4);
    }

    #[test]
    fn dynamic_sampler_has_probes() {
        let sampler = DynamicEnvSampler::new();
        assert!(sampler.probe_count() >= 2);
    }

    #[test]
    fn probe_order_is_stable_across_constructions() {
        let a = StaticEnvSampler::new();
        let b = StaticEnvSampler::new();
        assert_eq!(a.probe_names(), b.probe_names());

        let c = DynamicEnvSampler::new();
        let d = DynamicEnvSampler::new();
        assert_eq!(c.probe_names(), d.probe_names());
    }

    #[test]
    fn cadence_matches_sampler() {
        for probe in crate::probes::static_probes() {
            assert_eq!(probe.info().cadence, Cadence::Static, "{}", probe.name());
        }
        for probe in crate::probes::dynamic_probes() {
            assert_eq!(probe.info().cadence, Cadence::Dynamic, "{}", probe.name());
        }
    }

    #[test]
    fn static_pass_writes_bytes() {
        let mut sink = Vec::new();
        StaticEnvSampler::new().sample(&mut sink);
        assert!(!sink.is_empty());
    }

    #[test]
    fn dynamic_pass_writes_bytes() {
        let mut sink = Vec::new();
        DynamicEnvSampler::new().sample(&mut sink);
        assert!(!sink.is_empty());
    }
}
