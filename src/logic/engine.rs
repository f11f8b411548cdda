//! Scan Orchestrator
//!
//! Runs every registered detector concurrently and merges their output
//! into one report, in registration order. A detector that panics or
//! overruns its time budget is reported as a partial failure and its
//! siblings complete normally.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::logic::config::ScanConfig;
use crate::logic::detectors::Detector;
use crate::logic::report::{DetectionResult, ScanReport};

// ============================================================================
// TYPES
// ============================================================================

pub struct ScanEngine {
    config: ScanConfig,
    detectors: Vec<Arc<dyn Detector>>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl ScanEngine {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            detectors: Vec::new(),
        }
    }

    /// Registration order = merge order in the report
    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Run all detectors concurrently; each on a blocking worker under
    /// its own timeout
    pub async fn execute_full_scan(&self) -> ScanReport {
        let mut report = ScanReport::new();
        let started = Instant::now();
        info!(
            "[Engine] Starting scan {} with {} detectors",
            report.scan_id,
            self.detectors.len()
        );

        let mut tasks: Vec<(&'static str, Option<JoinHandle<Vec<DetectionResult>>>)> =
            Vec::with_capacity(self.detectors.len());

        for detector in &self.detectors {
            let name = detector.name();
            if detector.requires_admin() && !self.config.has_admin {
                info!("[Engine] Skipping '{}': requires elevation", name);
                tasks.push((name, None));
                continue;
            }
            let detector = Arc::clone(detector);
            tasks.push((
                name,
                Some(tokio::task::spawn_blocking(move || detector.scan())),
            ));
        }

        for (name, task) in tasks {
            let Some(task) = task else { continue };
            match timeout(self.config.detector_timeout, task).await {
                Ok(Ok(results)) => {
                    info!("[Engine] '{}' produced {} findings", name, results.len());
                    report.merge(results);
                }
                Ok(Err(join_err)) => {
                    // Detector panicked; the scan continues without it
                    warn!("[Engine] Detector '{}' failed: {}", name, join_err);
                }
                Err(_) => {
                    warn!(
                        "[Engine] Detector '{}' exceeded its {}s budget, dropping its results",
                        name,
                        self.config.detector_timeout.as_secs()
                    );
                }
            }
        }

        report.seal();
        info!(
            "[Engine] Scan {} complete in {:?}: {} findings, overall level {}",
            report.scan_id,
            started.elapsed(),
            report.total_checks(),
            report.overall_level()
        );
        report
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::report::{DetectionKind, ThreatLevel};
    use std::time::Duration;

    struct FixedDetector {
        name: &'static str,
        level: ThreatLevel,
    }

    impl Detector for FixedDetector {
        fn name(&self) -> &'static str {
            self.name
        }
        fn kind(&self) -> DetectionKind {
            DetectionKind::Process
        }
        fn scan(&self) -> Vec<DetectionResult> {
            vec![DetectionResult::new(
                DetectionKind::Process,
                self.level,
                self.name,
                "",
            )]
        }
    }

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn name(&self) -> &'static str {
            "panicking"
        }
        fn kind(&self) -> DetectionKind {
            DetectionKind::Process
        }
        fn scan(&self) -> Vec<DetectionResult> {
            panic!("detector blew up");
        }
    }

    struct HangingDetector;

    impl Detector for HangingDetector {
        fn name(&self) -> &'static str {
            "hanging"
        }
        fn kind(&self) -> DetectionKind {
            DetectionKind::Process
        }
        fn scan(&self) -> Vec<DetectionResult> {
            std::thread::sleep(Duration::from_secs(5));
            vec![DetectionResult::new(
                DetectionKind::Process,
                ThreatLevel::Critical,
                "too late",
                "",
            )]
        }
    }

    struct AdminOnlyDetector;

    impl Detector for AdminOnlyDetector {
        fn name(&self) -> &'static str {
            "admin-only"
        }
        fn kind(&self) -> DetectionKind {
            DetectionKind::MemoryScanner
        }
        fn requires_admin(&self) -> bool {
            true
        }
        fn scan(&self) -> Vec<DetectionResult> {
            vec![DetectionResult::new(
                DetectionKind::MemoryScanner,
                ThreatLevel::High,
                "elevated finding",
                "",
            )]
        }
    }

    fn short_timeout_config() -> ScanConfig {
        let mut config = ScanConfig::default();
        config.detector_timeout = Duration::from_millis(200);
        config
    }

    #[tokio::test]
    async fn test_results_merge_in_registration_order() {
        let mut engine = ScanEngine::new(ScanConfig::default());
        engine.register(Arc::new(FixedDetector {
            name: "first",
            level: ThreatLevel::Low,
        }));
        engine.register(Arc::new(FixedDetector {
            name: "second",
            level: ThreatLevel::High,
        }));

        let report = engine.execute_full_scan().await;
        assert_eq!(report.total_checks(), 2);
        assert_eq!(report.detections[0].description, "first");
        assert_eq!(report.detections[1].description, "second");
        assert_eq!(report.overall_level(), ThreatLevel::High);
        assert!(report.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_panicking_detector_does_not_poison_siblings() {
        let mut engine = ScanEngine::new(ScanConfig::default());
        engine.register(Arc::new(FixedDetector {
            name: "healthy",
            level: ThreatLevel::Medium,
        }));
        engine.register(Arc::new(PanickingDetector));
        engine.register(Arc::new(FixedDetector {
            name: "also-healthy",
            level: ThreatLevel::Low,
        }));

        let report = engine.execute_full_scan().await;
        assert_eq!(report.total_checks(), 2);
        assert_eq!(report.detections[0].description, "healthy");
        assert_eq!(report.detections[1].description, "also-healthy");
    }

    #[tokio::test]
    async fn test_hanging_detector_is_timed_out() {
        let mut engine = ScanEngine::new(short_timeout_config());
        engine.register(Arc::new(HangingDetector));
        engine.register(Arc::new(FixedDetector {
            name: "prompt",
            level: ThreatLevel::Low,
        }));

        let report = engine.execute_full_scan().await;
        assert_eq!(report.total_checks(), 1);
        assert_eq!(report.detections[0].description, "prompt");
    }

    #[tokio::test]
    async fn test_admin_detectors_skipped_without_elevation() {
        let mut engine = ScanEngine::new(ScanConfig::default());
        engine.register(Arc::new(AdminOnlyDetector));
        let report = engine.execute_full_scan().await;
        assert_eq!(report.total_checks(), 0);

        let mut elevated = ScanEngine::new(ScanConfig::default().with_admin(true));
        elevated.register(Arc::new(AdminOnlyDetector));
        let report = elevated.execute_full_scan().await;
        assert_eq!(report.total_checks(), 1);
    }

    #[tokio::test]
    async fn test_empty_engine_produces_clean_report() {
        let engine = ScanEngine::new(ScanConfig::default());
        let report = engine.execute_full_scan().await;
        assert!(report.is_clean());
        assert_eq!(report.overall_level(), ThreatLevel::None);
    }
}
