//! Process Detector
//!
//! Matches running process names against the signature database, with
//! the whitelist consulted first. Debugger names are carried separately
//! from the database because their severity differs from generic
//! pattern hits.

use std::sync::Arc;

use log::debug;
use sysinfo::System;

use crate::logic::report::{DetectionKind, DetectionResult, ThreatLevel};
use crate::logic::signatures::{SignatureDatabase, Whitelist};

use super::{Detector, ProcessInfo};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Debuggers and reversing tools, flagged High rather than Critical:
/// presence alone is not proof of cheating
const DEBUGGER_NAMES: &[&str] = &[
    "x64dbg", "x32dbg", "ollydbg", "windbg", "ida", "ida64", "cheatengine",
];

// ============================================================================
// TYPES
// ============================================================================

pub struct ProcessDetector {
    signatures: Arc<SignatureDatabase>,
    whitelist: Arc<Whitelist>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl ProcessDetector {
    pub fn new(signatures: Arc<SignatureDatabase>, whitelist: Arc<Whitelist>) -> Self {
        Self {
            signatures,
            whitelist,
        }
    }

    /// Pure core over a process snapshot
    pub fn scan_snapshot(&self, processes: &[ProcessInfo]) -> Vec<DetectionResult> {
        let mut results = Vec::new();

        for proc in processes {
            if proc.is_self() {
                continue;
            }
            let name = normalize(&proc.name);

            // Trust always wins over threat status
            if self.whitelist.is_trusted_process(&name) {
                continue;
            }
            if let Some(path) = &proc.exe_path {
                if self.whitelist.is_trusted_path(path) {
                    debug!("[Process] '{}' trusted by path {}", name, path);
                    continue;
                }
            }

            if self.signatures.is_known_threat(&name) {
                results.push(
                    DetectionResult::new(
                        DetectionKind::Process,
                        ThreatLevel::Critical,
                        "Known cheat tool running",
                        format!("'{}' (pid {})", proc.name, proc.pid),
                    )
                    .with_metadata("process", proc.name.clone())
                    .with_metadata("pid", proc.pid.to_string()),
                );
                continue;
            }

            if DEBUGGER_NAMES.iter().any(|d| name == *d) {
                results.push(
                    DetectionResult::new(
                        DetectionKind::Process,
                        ThreatLevel::High,
                        "Debugger running",
                        format!("'{}' (pid {})", proc.name, proc.pid),
                    )
                    .with_confidence(0.85)
                    .with_metadata("process", proc.name.clone()),
                );
                continue;
            }

            if let Some(pattern) = self.signatures.matching_pattern(&name) {
                results.push(
                    DetectionResult::new(
                        DetectionKind::Process,
                        ThreatLevel::High,
                        "Suspicious process name",
                        format!("'{}' (pid {}) matches pattern '{}'", proc.name, proc.pid, pattern),
                    )
                    .with_confidence(0.7)
                    .with_metadata("pattern", pattern.to_string()),
                );
            }
        }

        results
    }
}

impl Detector for ProcessDetector {
    fn name(&self) -> &'static str {
        "process"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Process
    }

    fn scan(&self) -> Vec<DetectionResult> {
        let mut sys = System::new();
        sys.refresh_processes();
        self.scan_snapshot(&ProcessInfo::snapshot(&sys))
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

/// Lowercase, strip a trailing .exe
fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    lower.strip_suffix(".exe").unwrap_or(&lower).to_string()
}

// ============================================================================
// TESTS
// ============================================================================
