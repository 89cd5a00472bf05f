//! Host hardware snapshot merged into `/api/config` responses.
//!
//! Recomputed on every request and never persisted.

use serde::{Deserialize, Serialize};

/// CPU and memory figures for the host running the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    /// Processor information.
    pub cpu: CpuInfo,
    /// Memory usage.
    pub memory: MemoryInfo,
}

/// Processor counts and frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// Physical core count, if the platform reports it.
    pub cpu_count_physical: Option<usize>,
    /// Logical processor count.
    pub cpu_count_logical: usize,
    /// Current frequency.
    pub cpu_freq: CpuFrequency,
}

/// Processor frequency in MHz.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuFrequency {
    /// Frequency of the first logical processor.
    pub current: u64,
}

/// Virtual memory figures in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total installed memory.
    pub total: u64,
    /// Memory available to new processes.
    pub available: u64,
    /// Memory in use.
    pub used: u64,
    /// Memory not in use at all.
    pub free: u64,
    /// Percentage of total memory in use.
    pub percent: f64,
}
