//! Memory Scan Detector
//!
//! Signature-scans the memory of qualifying processes. Expensive, so a
//! prefilter narrows the candidate set before any handle is opened:
//! known-benign names are skipped, and only processes with a working
//! set large enough to host an injected payload qualify.

use std::sync::Arc;

use log::debug;
use sysinfo::System;

use crate::constants;
use crate::logic::memory_scan::scan_process;
use crate::logic::report::{DetectionKind, DetectionResult, ThreatLevel};
use crate::logic::signatures::Whitelist;

use super::{Detector, ProcessInfo};

// ============================================================================
// CONSTANTS
// ============================================================================

/// System processes, browsers and launchers that would dominate scan
/// time while being the least likely hosts
const SKIP_NAMES: &[&str] = &[
    "system",
    "svchost",
    "csrss",
    "wininit",
    "services",
    "lsass",
    "explorer",
    "dwm",
    "conhost",
    "sihost",
    "utorrent",
    "bittorrent",
    "qbittorrent",
    "chrome",
    "firefox",
    "edge",
    "brave",
    "steam",
    "epicgameslauncher",
    "origin",
    "discord",
    "spotify",
    "teamspeak",
];

// ============================================================================
// TYPES
// ============================================================================

pub struct MemoryScanDetector {
    whitelist: Arc<Whitelist>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl MemoryScanDetector {
    pub fn new(whitelist: Arc<Whitelist>) -> Self {
        Self { whitelist }
    }

    /// Whether a process is worth opening at all
    pub fn qualifies(&self, proc: &ProcessInfo) -> bool {
        if proc.is_self() {
            return false;
        }
        let name = base_name(&proc.name);
        if SKIP_NAMES.iter().any(|s| name == *s) {
            return false;
        }
        if self.whitelist.is_trusted_process(&name) {
            return false;
        }
        if let Some(path) = &proc.exe_path {
            if self.whitelist.is_trusted_path(path) {
                return false;
            }
        }
        proc.memory_bytes > constants::MEMORY_SCAN_MIN_WORKING_SET
    }

    fn result_for_match(proc: &ProcessInfo, signature: &str, confidence: f64) -> DetectionResult {
        DetectionResult::new(
            DetectionKind::MemoryScanner,
            level_for_confidence(confidence),
            "Memory signature match",
            format!(
                "'{}' (pid {}) contains signature '{}'",
                proc.name, proc.pid, signature
            ),
        )
        .with_confidence(confidence)
        .with_metadata("signature", signature.to_string())
        .with_metadata("pid", proc.pid.to_string())
    }
}

impl Detector for MemoryScanDetector {
    fn name(&self) -> &'static str {
        "memory-scan"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::MemoryScanner
    }

    fn requires_admin(&self) -> bool {
        true
    }

    fn scan(&self) -> Vec<DetectionResult> {
        let mut sys = System::new();
        sys.refresh_processes();
        let candidates: Vec<ProcessInfo> = ProcessInfo::snapshot(&sys)
            .into_iter()
            .filter(|p| self.qualifies(p))
            .collect();
        debug!("[MemoryScan] {} candidate processes", candidates.len());

        let mut results = Vec::new();
        for proc in &candidates {
            if let Some((signature, confidence)) = scan_process(proc.pid) {
                results.push(Self::result_for_match(proc, &signature, confidence));
            }
        }
        results
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

/// Severity follows how specific the matched signature is
fn level_for_confidence(confidence: f64) -> ThreatLevel {
    if confidence >= 0.9 {
        ThreatLevel::Critical
    } else if confidence >= 0.75 {
        ThreatLevel::High
    } else if confidence >= 0.5 {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

fn base_name(name: &str) -> String {
    let lower = name.to_lowercase();
    lower.strip_suffix(".exe").unwrap_or(&lower).to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(name: &str, memory: u64) -> ProcessInfo {
        ProcessInfo {
            pid: 42,
            name: name.to_string(),
            exe_path: None,
            memory_bytes: memory,
        }
    }

    #[test]
    fn test_prefilter_skips_known_benign_names() {
        let d = MemoryScanDetector::new(Arc::new(Whitelist::new()));
        assert!(!d.qualifies(&proc("chrome.exe", 900 * 1024 * 1024)));
        assert!(!d.qualifies(&proc("Discord.exe", 400 * 1024 * 1024)));
    }

    #[test]
    fn test_prefilter_requires_large_working_set() {
        let d = MemoryScanDetector::new(Arc::new(Whitelist::new()));
        assert!(!d.qualifies(&proc("unknown_tool.exe", 10 * 1024 * 1024)));
        assert!(d.qualifies(&proc("unknown_tool.exe", 200 * 1024 * 1024)));
    }

    #[test]
    fn test_prefilter_skips_self_and_trusted_path() {
        let d = MemoryScanDetector::new(Arc::new(Whitelist::new()));
        assert!(!d.qualifies(&proc("sentinel-core.exe", 200 * 1024 * 1024)));

        let mut trusted = proc("unknown_tool.exe", 200 * 1024 * 1024);
        trusted.exe_path = Some("C:\\Windows\\System32\\unknown_tool.exe".to_string());
        assert!(!d.qualifies(&trusted));
    }

    #[test]
    fn test_level_tracks_signature_specificity() {
        assert_eq!(level_for_confidence(0.99), ThreatLevel::Critical);
        assert_eq!(level_for_confidence(0.75), ThreatLevel::High);
        assert_eq!(level_for_confidence(0.6), ThreatLevel::Medium);
        assert_eq!(level_for_confidence(0.3), ThreatLevel::Low);
    }

    #[test]
    fn test_match_result_shape() {
        let p = proc("target.exe", 200 * 1024 * 1024);
        let r = MemoryScanDetector::result_for_match(&p, "Cheat Engine", 0.99);
        assert_eq!(r.kind, DetectionKind::MemoryScanner);
        assert_eq!(r.level, ThreatLevel::Critical);
        assert_eq!(r.metadata.get("signature").unwrap(), "Cheat Engine");
    }
}
