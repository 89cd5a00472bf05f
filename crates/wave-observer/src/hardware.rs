//! Host hardware probing for `/api/config`.
//!
//! [`HardwareProbe`] is the seam tests replace; [`SysinfoProbe`] is the
//! production implementation backed by the `sysinfo` crate.

use std::sync::Mutex;

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use wave_types::{CpuFrequency, CpuInfo, HardwareSnapshot, MemoryInfo};

/// Source of host hardware figures.
pub trait HardwareProbe: Send + Sync {
    /// Take a fresh snapshot, or `None` if the host cannot be queried.
    fn snapshot(&self) -> Option<HardwareSnapshot>;
}

/// Probe that queries the host through `sysinfo`.
pub struct SysinfoProbe {
    system: Mutex<System>,
}

impl SysinfoProbe {
    /// Create a probe with CPU and memory refresh enabled.
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareProbe for SysinfoProbe {
    fn snapshot(&self) -> Option<HardwareSnapshot> {
        let mut system = self.system.lock().ok()?;
        system.refresh_cpu_all();
        system.refresh_memory();

        let cpus = system.cpus();
        let cpu = CpuInfo {
            cpu_count_physical: System::physical_core_count(),
            cpu_count_logical: cpus.len(),
            cpu_freq: CpuFrequency {
                current: cpus.first().map_or(0, sysinfo::Cpu::frequency),
            },
        };

        let total = system.total_memory();
        let available = system.available_memory();
        let memory = MemoryInfo {
            total,
            available,
            used: system.used_memory(),
            free: system.free_memory(),
            percent: percent(total.saturating_sub(available), total),
        };

        Some(HardwareSnapshot { cpu, memory })
    }
}

/// `part / whole` as a percentage rounded to one decimal.
#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
