//! Input Tool Detector
//!
//! Auto-clicker and macro software by process name. Auto-clickers are
//! straightforwardly hostile; macro-capable vendor software (keyboard
//! drivers, RGB suites) is common on gaming machines and only worth a
//! low-severity note.

use std::sync::Arc;

use sysinfo::System;

use crate::logic::report::{DetectionKind, DetectionResult, ThreatLevel};
use crate::logic::signatures::Whitelist;

use super::{Detector, ProcessInfo};

// ============================================================================
// CONSTANTS
// ============================================================================

const AUTO_CLICKERS: &[&str] = &[
    "autoclicker",
    "op autoclicker",
    "gsautoclicker",
    "fastclicker",
    "mouserecorder",
    "tinytask",
    "pulover",
    "autohotkey",
    "ahk",
];

const MACRO_SOFTWARE: &[&str] = &[
    "razer synapse",
    "logitech gaming",
    "ghub",
    "corsair icue",
    "steelseries engine",
    "xmouse",
    "jitbit",
    "macro recorder",
];

// ============================================================================
// TYPES
// ============================================================================

pub struct InputToolDetector {
    whitelist: Arc<Whitelist>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl InputToolDetector {
    pub fn new(whitelist: Arc<Whitelist>) -> Self {
        Self { whitelist }
    }

    pub fn scan_snapshot(&self, processes: &[ProcessInfo]) -> Vec<DetectionResult> {
        let mut results = Vec::new();

        for proc in processes {
            if proc.is_self() {
                continue;
            }
            let name = proc.name.to_lowercase();
            if self.whitelist.is_trusted_process(&name) {
                continue;
            }

            if AUTO_CLICKERS.iter().any(|c| name.contains(c)) {
                results.push(
                    DetectionResult::new(
                        DetectionKind::InputManipulation,
                        ThreatLevel::High,
                        "Auto-clicker software running",
                        format!("'{}' (pid {})", proc.name, proc.pid),
                    )
                    .with_confidence(0.85)
                    .with_metadata("process", proc.name.clone()),
                );
            } else if MACRO_SOFTWARE.iter().any(|m| name.contains(m)) {
                results.push(
                    DetectionResult::new(
                        DetectionKind::InputManipulation,
                        ThreatLevel::Low,
                        "Macro-capable software running",
                        format!("'{}' (pid {})", proc.name, proc.pid),
                    )
                    .with_confidence(0.4)
                    .with_metadata("process", proc.name.clone()),
                );
            }
        }

        results
    }
}

impl Detector for InputToolDetector {
    fn name(&self) -> &'static str {
        "input-tools"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::InputManipulation
    }

    fn scan(&self) -> Vec<DetectionResult> {
        let mut sys = System::new();
        sys.refresh_processes();
        self.scan_snapshot(&ProcessInfo::snapshot(&sys))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, name: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            exe_path: None,
            memory_bytes: 0,
        }
    }

    #[test]
    fn test_autoclicker_is_high() {
        let d = InputToolDetector::new(Arc::new(Whitelist::new()));
        let results = d.scan_snapshot(&[proc(1, "GS Autoclicker.exe"), proc(2, "notepad.exe")]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ThreatLevel::High);
        assert!(!results[0].is_possible_false_positive());
    }

    #[test]
    fn test_macro_vendor_software_is_low_and_uncertain() {
        let d = InputToolDetector::new(Arc::new(Whitelist::new()));
        let results = d.scan_snapshot(&[proc(1, "Corsair iCUE.exe")]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, ThreatLevel::Low);
        assert!(results[0].is_possible_false_positive());
    }

    #[test]
    fn test_whitelisted_tool_is_skipped() {
        let mut wl = Whitelist::new();
        wl.add_process("autohotkey.exe");
        let d = InputToolDetector::new(Arc::new(wl));
        assert!(d.scan_snapshot(&[proc(1, "AutoHotkey.exe")]).is_empty());
    }
}
