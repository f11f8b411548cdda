//! Anomaly Engine
//!
//! Tracks a rolling behavior profile per subject and runs the statistical
//! checks against it. Mỗi subject có một cửa sổ quan sát riêng (FIFO).
//!
//! Every check gates on a minimum sample count; with too little history
//! it stays silent rather than guessing.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::report::{DetectionKind, DetectionResult, ThreatLevel};

use super::stats;

// ============================================================================
// TYPES
// ============================================================================

/// Identity of a tracked subject. Pid alone is not enough: pids recycle,
/// and the name feeds the entropy check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId {
    pub pid: u32,
    pub name: String,
}

/// One point-in-time resource sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub cpu_time_ms: f64,
    pub memory_bytes: u64,
    pub thread_count: u32,
    pub handle_count: u32,
}

#[derive(Debug, Clone, Default)]
struct BehaviorProfile {
    window: VecDeque<Observation>,
}

impl BehaviorProfile {
    fn push(&mut self, obs: Observation) {
        if self.window.len() >= constants::OBSERVATION_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(obs);
    }

    fn memory_series(&self) -> Vec<f64> {
        self.window.iter().map(|o| o.memory_bytes as f64).collect()
    }

    fn thread_series(&self) -> Vec<f64> {
        self.window.iter().map(|o| o.thread_count as f64).collect()
    }

    fn cpu_series(&self) -> Vec<f64> {
        self.window.iter().map(|o| o.cpu_time_ms).collect()
    }
}

#[derive(Debug, Default)]
pub struct AnomalyEngine {
    profiles: HashMap<SubjectId, BehaviorProfile>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl AnomalyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample for a subject, evicting the oldest past capacity
    pub fn record(&mut self, subject: SubjectId, obs: Observation) {
        self.profiles.entry(subject).or_default().push(obs);
    }

    pub fn subject_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &SubjectId> {
        self.profiles.keys()
    }

    /// Run every check against every tracked subject
    pub fn analyze_all(&self) -> Vec<DetectionResult> {
        let mut results = Vec::new();
        for subject in self.profiles.keys() {
            results.extend(self.analyze_subject(subject));
        }
        results
    }

    pub fn analyze_subject(&self, subject: &SubjectId) -> Vec<DetectionResult> {
        let mut results = Vec::new();
        results.extend(self.check_entropy(subject));
        results.extend(self.check_outliers(subject));
        results.extend(self.check_bayesian(subject));
        results.extend(self.check_correlation(subject));
        results.extend(self.check_cpu_consistency(subject));
        results
    }

    // ------------------------------------------------------------------
    // Individual checks
    // ------------------------------------------------------------------

    /// High-entropy process name = likely randomly generated
    pub fn check_entropy(&self, subject: &SubjectId) -> Option<DetectionResult> {
        let profile = self.profiles.get(subject)?;
        if profile.window.len() < constants::ENTROPY_MIN_SAMPLES {
            return None;
        }
        let entropy = stats::shannon_entropy(&subject.name);
        if entropy <= constants::ENTROPY_THRESHOLD {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::Process,
                ThreatLevel::Medium,
                "High-entropy process name",
                format!(
                    "'{}' (pid {}) has name entropy {:.2} bits/char, above {:.2}",
                    subject.name, subject.pid, entropy, constants::ENTROPY_THRESHOLD
                ),
            )
            .with_confidence(0.6)
            .with_metadata("entropy", format!("{:.4}", entropy)),
        )
    }

    /// Z-score of the latest sample against the subject's own history.
    /// A zero standard deviation means no variation to score against.
    pub fn check_outliers(&self, subject: &SubjectId) -> Vec<DetectionResult> {
        let Some(profile) = self.profiles.get(subject) else {
            return Vec::new();
        };
        if profile.window.len() < constants::ZSCORE_MIN_SAMPLES {
            return Vec::new();
        }
        let mut results = Vec::new();

        let memory = profile.memory_series();
        if let Some(z) = latest_z_score(&memory) {
            if z.abs() > constants::Z_SCORE_THRESHOLD {
                results.push(
                    DetectionResult::new(
                        DetectionKind::Activity,
                        ThreatLevel::High,
                        "Memory usage outlier",
                        format!(
                            "'{}' (pid {}) memory z-score {:.2} vs its own baseline",
                            subject.name, subject.pid, z
                        ),
                    )
                    .with_confidence(0.7)
                    .with_metadata("z_score", format!("{:.4}", z)),
                );
            }
        }

        let threads = profile.thread_series();
        if let Some(z) = latest_z_score(&threads) {
            if z.abs() > constants::Z_SCORE_THRESHOLD {
                results.push(
                    DetectionResult::new(
                        DetectionKind::Activity,
                        ThreatLevel::Medium,
                        "Thread count outlier",
                        format!(
                            "'{}' (pid {}) thread z-score {:.2} vs its own baseline",
                            subject.name, subject.pid, z
                        ),
                    )
                    .with_confidence(0.6)
                    .with_metadata("z_score", format!("{:.4}", z)),
                );
            }
        }

        results
    }

    /// One memory-then-threads Bayesian update against the latest
    /// observation's evidence. Channels without evidence leave the
    /// posterior at its prior; the window only gates sample sufficiency.
    pub fn check_bayesian(&self, subject: &SubjectId) -> Option<DetectionResult> {
        let profile = self.profiles.get(subject)?;
        if profile.window.len() < constants::BAYES_MIN_SAMPLES {
            return None;
        }
        let latest = profile.window.back()?;

        let mut p_malicious = constants::PRIOR_MALICIOUS;
        let mut p_benign = constants::PRIOR_BENIGN;
        if latest.memory_bytes > constants::HIGH_MEMORY_BYTES {
            (p_malicious, p_benign) = bayes_update(p_malicious, p_benign, 0.7, 0.2);
        }
        if latest.thread_count > constants::HIGH_THREAD_COUNT {
            (p_malicious, p_benign) = bayes_update(p_malicious, p_benign, 0.6, 0.3);
        }

        if p_malicious <= constants::POSTERIOR_THRESHOLD {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::Activity,
                ThreatLevel::High,
                "Bayesian behavior classification",
                format!(
                    "'{}' (pid {}) posterior malicious probability {:.3} over {} samples",
                    subject.name,
                    subject.pid,
                    p_malicious,
                    profile.window.len()
                ),
            )
            .with_confidence(p_malicious)
            .with_metadata("posterior", format!("{:.4}", p_malicious)),
        )
    }

    /// Strongly coupled resource metrics = scripted workload. Checked
    /// for cpu-memory and cpu-threads pairs.
    pub fn check_correlation(&self, subject: &SubjectId) -> Vec<DetectionResult> {
        let Some(profile) = self.profiles.get(subject) else {
            return Vec::new();
        };
        if profile.window.len() < constants::CORRELATION_MIN_SAMPLES {
            return Vec::new();
        }
        let cpu = profile.cpu_series();
        let pairs = [
            ("memory", profile.memory_series()),
            ("threads", profile.thread_series()),
        ];

        let mut results = Vec::new();
        for (metric, series) in &pairs {
            let r = stats::pearson(&cpu, series);
            if r.abs() <= constants::CORRELATION_THRESHOLD {
                continue;
            }
            results.push(
                DetectionResult::new(
                    DetectionKind::Activity,
                    ThreatLevel::Medium,
                    "Correlated resource usage",
                    format!(
                        "'{}' (pid {}) CPU/{} Pearson r = {:.3}",
                        subject.name, subject.pid, metric, r
                    ),
                )
                .with_confidence(0.55)
                .with_metadata("metric", metric.to_string())
                .with_metadata("pearson_r", format!("{:.4}", r)),
            );
        }
        results
    }

    /// Near-zero CPU-time variance over a full window = mechanical loop
    pub fn check_cpu_consistency(&self, subject: &SubjectId) -> Option<DetectionResult> {
        let profile = self.profiles.get(subject)?;
        if profile.window.len() < constants::CORRELATION_MIN_SAMPLES {
            return None;
        }
        let var = stats::variance(&profile.cpu_series());
        if var >= constants::CPU_VARIANCE_FLOOR {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::Activity,
                ThreatLevel::Medium,
                "Unnaturally consistent CPU usage",
                format!(
                    "'{}' (pid {}) CPU-time variance {:.5} over {} samples",
                    subject.name,
                    subject.pid,
                    var,
                    profile.window.len()
                ),
            )
            .with_confidence(0.5)
            .with_metadata("cpu_variance", format!("{:.6}", var)),
        )
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

/// Z-score of the last element against the whole series. None when the
/// series has no spread.
fn latest_z_score(series: &[f64]) -> Option<f64> {
    let last = *series.last()?;
    let sd = stats::std_dev(series);
    if sd == 0.0 {
        return None;
    }
    Some((last - stats::mean(series)) / sd)
}

/// One Bayes step over both hypothesis masses; returns the updated
/// (malicious, benign) pair
fn bayes_update(p_mal: f64, p_ben: f64, lik_malicious: f64, lik_benign: f64) -> (f64, f64) {
    let num = lik_malicious * p_mal;
    let den = num + lik_benign * p_ben;
    if den == 0.0 {
        return (p_mal, p_ben);
    }
    let posterior = num / den;
    (posterior, 1.0 - posterior)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(pid: u32, name: &str) -> SubjectId {
        SubjectId {
            pid,
            name: name.to_string(),
        }
    }

    fn obs(cpu: f64, mem: u64, threads: u32) -> Observation {
        Observation {
            timestamp: Utc::now(),
            cpu_time_ms: cpu,
            memory_bytes: mem,
            thread_count: threads,
            handle_count: 100,
        }
    }

    fn feed(engine: &mut AnomalyEngine, s: &SubjectId, samples: &[(f64, u64, u32)]) {
        for &(cpu, mem, threads) in samples {
            engine.record(s.clone(), obs(cpu, mem, threads));
        }
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "test");
        for i in 0..(constants::OBSERVATION_WINDOW + 10) {
            engine.record(s.clone(), obs(i as f64, 1024, 4));
        }
        let profile = engine.profiles.get(&s).unwrap();
        assert_eq!(profile.window.len(), constants::OBSERVATION_WINDOW);
        assert_eq!(profile.window.front().unwrap().cpu_time_ms, 10.0);
    }

    #[test]
    fn test_entropy_flags_random_name_only() {
        let mut engine = AnomalyEngine::new();
        let random = subject(1, "a83fc210b7e19d44");
        let normal = subject(2, "svchost");
        for _ in 0..constants::ENTROPY_MIN_SAMPLES {
            engine.record(random.clone(), obs(1.0, 1024, 4));
            engine.record(normal.clone(), obs(1.0, 1024, 4));
        }
        assert!(engine.check_entropy(&random).is_some());
        assert!(engine.check_entropy(&normal).is_none());
    }

    #[test]
    fn test_entropy_silent_below_min_samples() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "a83fc210b7e19d44");
        for _ in 0..(constants::ENTROPY_MIN_SAMPLES - 1) {
            engine.record(s.clone(), obs(1.0, 1024, 4));
        }
        assert!(engine.check_entropy(&s).is_none());
    }

    #[test]
    fn test_zscore_flags_memory_spike() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "steady");
        // Stable baseline with slight spread, then a massive spike
        for i in 0..(constants::ZSCORE_MIN_SAMPLES - 1) {
            engine.record(s.clone(), obs(1.0, 100_000_000 + i as u64 * 1000, 8));
        }
        engine.record(s.clone(), obs(1.0, 2_000_000_000, 8));

        let results = engine.check_outliers(&s);
        assert!(results
            .iter()
            .any(|r| r.description == "Memory usage outlier" && r.level == ThreatLevel::High));
    }

    #[test]
    fn test_zscore_silent_on_constant_series() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "flat");
        for _ in 0..constants::ZSCORE_MIN_SAMPLES {
            engine.record(s.clone(), obs(1.0, 100_000_000, 8));
        }
        // stddev == 0 must produce no flag and no division error
        assert!(engine.check_outliers(&s).is_empty());
    }

    #[test]
    fn test_bayesian_silent_on_sustained_high_memory_alone() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "browser");
        // A full window of >500MB samples is ordinary for browsers and
        // games; one memory update lands at 0.156, well under threshold
        for _ in 0..constants::BAYES_MIN_SAMPLES {
            engine.record(s.clone(), obs(1.0, 600 * 1024 * 1024, 8));
        }
        assert!(engine.check_bayesian(&s).is_none());
    }

    #[test]
    fn test_bayesian_evidence_comes_from_latest_sample_only() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "spiky");
        // Heavy history, unremarkable latest sample: nothing to update on
        for _ in 0..constants::BAYES_MIN_SAMPLES {
            engine.record(s.clone(), obs(1.0, 600 * 1024 * 1024, 80));
        }
        engine.record(s.clone(), obs(1.0, 100 * 1024 * 1024, 8));
        assert!(engine.check_bayesian(&s).is_none());
    }

    #[test]
    fn test_bayes_update_chain_matches_hand_computation() {
        let (p1, b1) = bayes_update(
            constants::PRIOR_MALICIOUS,
            constants::PRIOR_BENIGN,
            0.7,
            0.2,
        );
        assert!((p1 - 0.035 / 0.225).abs() < 1e-12);
        assert!((p1 + b1 - 1.0).abs() < 1e-12);

        // Both channels firing still tops out far below the threshold
        let (p2, _) = bayes_update(p1, b1, 0.6, 0.3);
        assert!((p2 - 0.26923).abs() < 1e-4);
        assert!(p2 < constants::POSTERIOR_THRESHOLD);
    }

    #[test]
    fn test_bayesian_silent_for_modest_usage() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "modest");
        for _ in 0..constants::BAYES_MIN_SAMPLES {
            engine.record(s.clone(), obs(1.0, 100 * 1024 * 1024, 8));
        }
        assert!(engine.check_bayesian(&s).is_none());
    }

    #[test]
    fn test_correlation_flags_coupled_series() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "coupled");
        for i in 0..constants::CORRELATION_MIN_SAMPLES {
            // Memory tracks CPU linearly
            engine.record(
                s.clone(),
                obs(i as f64 * 10.0, 1_000_000 + i as u64 * 50_000, 8),
            );
        }
        let results = engine.check_correlation(&s);
        assert_eq!(results.len(), 1); // threads are constant, only memory couples
        assert_eq!(results[0].kind, DetectionKind::Activity);
        assert_eq!(results[0].metadata.get("metric").unwrap(), "memory");
    }

    #[test]
    fn test_correlation_covers_thread_series_too() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "threaded");
        for i in 0..constants::CORRELATION_MIN_SAMPLES {
            engine.record(s.clone(), obs(i as f64 * 10.0, 1_000_000, 4 + i as u32));
        }
        let results = engine.check_correlation(&s);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.get("metric").unwrap(), "threads");
    }

    #[test]
    fn test_cpu_consistency_flags_flat_cpu() {
        let mut engine = AnomalyEngine::new();
        let s = subject(1, "mechanical");
        for i in 0..constants::CORRELATION_MIN_SAMPLES {
            // CPU perfectly flat; memory varies so correlation stays quiet
            engine.record(s.clone(), obs(5.0, 1_000_000 + (i % 7) as u64 * 123_456, 8));
        }
        assert!(engine.check_cpu_consistency(&s).is_some());
    }

    #[test]
    fn test_analyze_all_covers_every_subject() {
        let mut engine = AnomalyEngine::new();
        let a = subject(1, "a83fc210b7e19d44");
        let b = subject(2, "b7e19d44a83fc210");
        for _ in 0..constants::ENTROPY_MIN_SAMPLES {
            engine.record(a.clone(), obs(1.0, 1024, 4));
            engine.record(b.clone(), obs(1.0, 1024, 4));
        }
        assert_eq!(engine.subject_count(), 2);
        assert_eq!(engine.analyze_all().len(), 2);
    }
}
