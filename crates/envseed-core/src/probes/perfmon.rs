//! PerfCounterProbe — the Windows performance-counter registry.
//!
//! Reading `HKEY_PERFORMANCE_DATA` serializes every performance counter on
//! the machine and can take seconds, so the probe runs at most once per ten
//! minutes process-wide. The buffer grows geometrically while the registry
//! reports `ERROR_MORE_DATA`, up to a hard 10 MB cap, and is zeroized after
//! use — counter data can describe other processes.

use winapi::shared::winerror::{ERROR_MORE_DATA, ERROR_SUCCESS};
use winapi::um::winreg::{RegCloseKey, RegQueryValueExA, HKEY_PERFORMANCE_DATA};
use zeroize::Zeroize;

use crate::accumulator::EntropyAccumulator;
use crate::probe::{Cadence, EnvironmentProbe, ProbeInfo};

use super::helpers::{unix_time_secs, SampleWindow};

/// Minimum interval between registry reads.
const PERFMON_INTERVAL_SECS: u64 = 600;

/// Initial buffer size for the counter blob.
const PERFMON_INITIAL_SIZE: usize = 250_000;

/// Hard cap on the counter blob.
const PERFMON_MAX_SIZE: usize = 10_000_000;

static PERFMON_WINDOW: SampleWindow = SampleWindow::new(PERFMON_INTERVAL_SECS);

pub struct PerfCounterProbe;

static PERFMON_INFO: ProbeInfo = ProbeInfo {
    name: "perfmon",
    description: "Entire performance-counter registry blob, rate-limited to one read per 10 min",
    cadence: Cadence::Dynamic,
};

impl EnvironmentProbe for PerfCounterProbe {
    fn info(&self) -> &ProbeInfo {
        &PERFMON_INFO
    }

    fn sample(&self, acc: &mut dyn EntropyAccumulator) {
        let now = unix_time_secs();
        if !PERFMON_WINDOW.ready(now) {
            return;
        }

        let mut data = vec![0u8; PERFMON_INITIAL_SIZE];
        let mut size;
        let mut ret;
        loop {
            size = data.len() as u32;
            // SAFETY: valid out-buffer/size pair; HKEY_PERFORMANCE_DATA is a
            // predefined key that needs no open.
            ret = unsafe {
                RegQueryValueExA(
                    HKEY_PERFORMANCE_DATA,
                    c"Global".as_ptr(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    data.as_mut_ptr(),
                    &mut size,
                )
            };
            if ret as u32 != ERROR_MORE_DATA || data.len() >= PERFMON_MAX_SIZE {
                break;
            }
            let grown = (data.len() * 3 / 2).min(PERFMON_MAX_SIZE);
            data.resize(grown, 0);
        }
        // SAFETY: closing the pseudo-key releases the registry's internal
        // performance-data handle.
        unsafe { RegCloseKey(HKEY_PERFORMANCE_DATA) };

        if ret as u32 == ERROR_SUCCESS {
            acc.write(&data[..size as usize]);
            PERFMON_WINDOW.record(now);
        }
        // A failed read is only a best-effort miss; the window stays open
        // for the next caller.
        data.zeroize();
    }
}
