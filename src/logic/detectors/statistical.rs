//! Statistical Detector
//!
//! Bridges the live system into the anomaly engine: each scan records
//! one observation per process and then runs the identity-shaped checks
//! (name entropy, z-score outliers, Bayesian classification). The
//! workload-shape checks live in the behavioral analyzer, which owns a
//! separate engine. The engine persists across scans, so profiles
//! accumulate history over the lifetime of the service.
//!
//! Thread and handle counts are not exposed per-process by the sampler
//! on every platform; missing metrics are recorded as zero, which keeps
//! their series degenerate and their checks silent.

use log::debug;
use parking_lot::Mutex;
use sysinfo::System;

use crate::logic::anomaly::{AnomalyEngine, Observation, SubjectId};
use crate::logic::report::{DetectionKind, DetectionResult};

use super::Detector;

// ============================================================================
// TYPES
// ============================================================================

pub struct StatisticalDetector {
    engine: Mutex<AnomalyEngine>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl StatisticalDetector {
    pub fn new() -> Self {
        Self {
            engine: Mutex::new(AnomalyEngine::new()),
        }
    }

    /// Record one observation for every running process
    fn sample(&self, sys: &System) {
        let now = chrono::Utc::now();
        let mut engine = self.engine.lock();
        for (pid, process) in sys.processes() {
            let subject = SubjectId {
                pid: pid.as_u32(),
                name: process.name().to_string(),
            };
            engine.record(
                subject,
                Observation {
                    timestamp: now,
                    cpu_time_ms: process.cpu_usage() as f64,
                    memory_bytes: process.memory(),
                    thread_count: 0,
                    handle_count: 0,
                },
            );
        }
        debug!("[Statistical] Tracking {} subjects", engine.subject_count());
    }
}

impl Default for StatisticalDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StatisticalDetector {
    fn name(&self) -> &'static str {
        "statistical"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Activity
    }

    fn scan(&self) -> Vec<DetectionResult> {
        let mut sys = System::new();
        sys.refresh_processes();
        self.sample(&sys);

        let engine = self.engine.lock();
        let mut results = Vec::new();
        for subject in engine.subjects() {
            results.extend(engine.check_entropy(subject));
            results.extend(engine.check_outliers(subject));
            results.extend(engine.check_bayesian(subject));
        }
        results
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use crate::logic::report::ThreatLevel;

    #[test]
    fn test_single_scan_has_too_little_history_to_flag() {
        let d = StatisticalDetector::new();
        // One sample per subject is below every check's minimum
        assert!(d.scan().is_empty());
    }

    #[test]
    fn test_accumulated_history_surfaces_anomalies() {
        let d = StatisticalDetector::new();
        let subject = SubjectId {
            pid: 9999,
            name: "xq7k2m9fz3w8d1c5".to_string(),
        };
        {
            let mut engine = d.engine.lock();
            for _ in 0..constants::ENTROPY_MIN_SAMPLES {
                engine.record(
                    subject.clone(),
                    Observation {
                        timestamp: chrono::Utc::now(),
                        cpu_time_ms: 1.0,
                        memory_bytes: 1024,
                        thread_count: 0,
                        handle_count: 0,
                    },
                );
            }
        }
        let results = d.engine.lock().analyze_subject(&subject);
        assert!(results
            .iter()
            .any(|r| r.description == "High-entropy process name"
                && r.level == ThreatLevel::Medium));
    }
}
