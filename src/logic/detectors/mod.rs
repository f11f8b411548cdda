//! Detector Units
//!
//! Each detector examines one aspect of the host and returns zero or
//! more findings. Detectors are independent: they share no mutable
//! state with each other and never abort the scan.

pub mod behavior;
pub mod input_tools;
pub mod memory;
pub mod process;
pub mod statistical;

use crate::logic::report::{DetectionKind, DetectionResult};

pub use behavior::BehaviorDetector;
pub use input_tools::InputToolDetector;
pub use memory::MemoryScanDetector;
pub use process::ProcessDetector;
pub use statistical::StatisticalDetector;

// ============================================================================
// DETECTOR TRAIT
// ============================================================================

/// A single detection unit registered with the scan engine.
///
/// `scan` runs on a blocking worker and may take real time; it must be
/// self-contained and return findings rather than propagate errors — a
/// detector that cannot see its subject reports nothing.
pub trait Detector: Send + Sync {
    /// Stable name used in logs and failure diagnostics
    fn name(&self) -> &'static str;

    /// The category this detector's findings fall under
    fn kind(&self) -> DetectionKind;

    /// Whether this detector is useless without elevation
    fn requires_admin(&self) -> bool {
        false
    }

    fn scan(&self) -> Vec<DetectionResult>;
}

// ============================================================================
// SHARED SNAPSHOT TYPE
// ============================================================================

/// Point-in-time view of one running process, decoupled from the live
/// system so detector cores stay pure and testable
#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub exe_path: Option<String>,
    pub memory_bytes: u64,
}

impl ProcessInfo {
    /// Collect a snapshot of all running processes
    pub fn snapshot(sys: &sysinfo::System) -> Vec<ProcessInfo> {
        sys.processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string(),
                exe_path: process.exe().map(|p| p.display().to_string()),
                memory_bytes: process.memory(),
            })
            .collect()
    }

    /// Our own scanner components are never scan subjects
    pub fn is_self(&self) -> bool {
        self.name.to_lowercase().contains("sentinel")
    }
}
