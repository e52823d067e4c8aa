//! All environment probe implementations and the build-time registry.
//!
//! The two functions at the bottom assemble the fixed probe sequences for
//! this build target. Platform-conditional probes are omitted outright on
//! targets that lack them — never replaced with placeholders — so the byte
//! stream's structure is deterministic per platform.

pub mod helpers;

pub mod clocks;
pub mod memory;
pub mod system;

#[cfg(unix)]
pub mod network;
#[cfg(unix)]
pub mod rusage;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod auxv;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod procfs;

#[cfg(target_os = "macos")]
pub mod sysctl;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod cpuid;

#[cfg(windows)]
pub mod perfmon;

use crate::probe::EnvironmentProbe;

/// The static-pass probe sequence for this build, in sampling order.
pub fn static_probes() -> Vec<Box<dyn EnvironmentProbe>> {
    let mut probes: Vec<Box<dyn EnvironmentProbe>> = Vec::new();

    probes.push(Box::new(system::BuildInfoProbe));
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    probes.push(Box::new(cpuid::CpuidProbe));
    #[cfg(any(target_os = "linux", target_os = "android"))]
    probes.push(Box::new(auxv::AuxvProbe));
    probes.push(Box::new(memory::AddressProbe));
    #[cfg(unix)]
    {
        probes.push(Box::new(network::HostnameProbe));
        probes.push(Box::new(network::InterfaceProbe));
        probes.push(Box::new(system::UnameProbe));
        probes.push(Box::new(system::PathMetadataProbe));
        probes.push(Box::new(system::ConfigFileProbe));
    }
    #[cfg(target_os = "macos")]
    probes.push(Box::new(sysctl::HardwareSysctlProbe));
    probes.push(Box::new(system::EnvironProbe));
    probes.push(Box::new(system::ProcessIdProbe));

    probes
}

/// The dynamic-pass probe sequence for this build, in sampling order.
pub fn dynamic_probes() -> Vec<Box<dyn EnvironmentProbe>> {
    let mut probes: Vec<Box<dyn EnvironmentProbe>> = Vec::new();

    #[cfg(windows)]
    probes.push(Box::new(perfmon::PerfCounterProbe));
    probes.push(Box::new(clocks::ClockProbe));
    #[cfg(unix)]
    probes.push(Box::new(rusage::RusageProbe));
    #[cfg(any(target_os = "linux", target_os = "android"))]
    probes.push(Box::new(procfs::ProcStatsProbe));
    #[cfg(target_os = "macos")]
    probes.push(Box::new(sysctl::KernelStatsSysctlProbe));
    probes.push(Box::new(memory::AllocationProbe));

    probes
}
