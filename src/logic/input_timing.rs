//! Input Timing Analysis
//!
//! Rolling buffer of input events with heuristics for automated input:
//! robotic interval precision, sequential consistency, abnormal event
//! rate, and single-key repetition. Idle-state filtering (only record a
//! key once per press, not per poll) is the recorder's responsibility.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::report::{DetectionKind, DetectionResult, ThreatLevel};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InputEvent {
    pub timestamp: DateTime<Utc>,
    pub key_code: u32,
}

#[derive(Debug, Default)]
pub struct InputTimingAnalyzer {
    events: VecDeque<InputEvent>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl InputTimingAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, evicting the oldest past capacity
    pub fn record(&mut self, event: InputEvent) {
        if self.events.len() >= constants::INPUT_HISTORY_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Run all timing checks. Silent below the minimum event count.
    pub fn analyze(&self) -> Vec<DetectionResult> {
        if self.events.len() < constants::INPUT_MIN_EVENTS {
            return Vec::new();
        }
        let mut results = Vec::new();
        results.extend(self.check_robotic_precision());
        results.extend(self.check_sequential_consistency());
        results.extend(self.check_event_frequency());
        results.extend(self.check_key_repetition());
        results
    }

    // ------------------------------------------------------------------
    // Individual checks
    // ------------------------------------------------------------------

    /// Coefficient of variation of inter-event intervals. Human input
    /// is noisy; a CoV this low means machine-regular timing.
    fn check_robotic_precision(&self) -> Option<DetectionResult> {
        let intervals = self.intervals_ms();
        if intervals.is_empty() {
            return None;
        }
        let mean = super::anomaly::stats::mean(&intervals);
        if mean == 0.0 {
            return None;
        }
        let cov = super::anomaly::stats::std_dev(&intervals) / mean;
        if cov >= 1.0 - constants::ROBOT_PRECISION_THRESHOLD {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::InputManipulation,
                ThreatLevel::High,
                "Robotic input timing",
                format!(
                    "Interval coefficient of variation {:.4} over {} events",
                    cov,
                    self.events.len()
                ),
            )
            .with_confidence(0.85)
            .with_metadata("cov", format!("{:.6}", cov)),
        )
    }

    /// Mean absolute difference between consecutive intervals. Scripted
    /// senders repeat the same delay; humans drift far more than 5ms.
    fn check_sequential_consistency(&self) -> Option<DetectionResult> {
        let intervals = self.intervals_ms();
        if intervals.len() < constants::SEQUENTIAL_MIN_SAMPLES {
            return None;
        }
        let diffs: Vec<f64> = intervals
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .collect();
        let mean_diff = super::anomaly::stats::mean(&diffs);
        if mean_diff >= constants::SEQUENTIAL_DIFF_FLOOR_MS {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::InputManipulation,
                ThreatLevel::Critical,
                "Automated input pattern",
                format!(
                    "Mean sequential interval difference {:.2}ms over {} intervals",
                    mean_diff,
                    intervals.len()
                ),
            )
            .with_confidence(0.9)
            .with_metadata("mean_diff_ms", format!("{:.4}", mean_diff)),
        )
    }

    /// Event rate inside the trailing window. Typical human input runs
    /// 2-5 events/second.
    fn check_event_frequency(&self) -> Option<DetectionResult> {
        let now = Utc::now();
        let cutoff = now - Duration::seconds(constants::FREQUENCY_WINDOW_SECS);
        let recent: Vec<&InputEvent> =
            self.events.iter().filter(|e| e.timestamp >= cutoff).collect();
        if recent.len() < constants::FREQUENCY_MIN_EVENTS {
            return None;
        }
        let first = recent.first()?;
        // Rate over the actual span covered, not the nominal window: the
        // bounded buffer may hold far less than a full minute of events
        let span_secs =
            ((now - first.timestamp).num_milliseconds() as f64 / 1000.0).max(1.0);
        let rate = recent.len() as f64 / span_secs;
        if rate <= constants::MAX_EVENTS_PER_SECOND {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::InputManipulation,
                ThreatLevel::High,
                "Abnormal input frequency",
                format!("{:.1} events/second over the last {:.0}s", rate, span_secs),
            )
            .with_confidence(0.8)
            .with_metadata("events_per_second", format!("{:.2}", rate)),
        )
    }

    /// One key dominating the recent window = auto-clicker signature.
    /// Stale buffer contents neither dilute nor drive this check.
    fn check_key_repetition(&self) -> Option<DetectionResult> {
        let cutoff = Utc::now() - Duration::seconds(constants::FREQUENCY_WINDOW_SECS);
        let recent: Vec<&InputEvent> =
            self.events.iter().filter(|e| e.timestamp >= cutoff).collect();
        if recent.len() < constants::FREQUENCY_MIN_EVENTS {
            return None;
        }
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for e in &recent {
            *counts.entry(e.key_code).or_insert(0) += 1;
        }
        let (&key, &max) = counts.iter().max_by_key(|(_, &n)| n)?;
        let ratio = max as f64 / recent.len() as f64;
        if ratio <= constants::KEY_REPETITION_RATIO {
            return None;
        }
        Some(
            DetectionResult::new(
                DetectionKind::InputManipulation,
                ThreatLevel::High,
                "Repetitive single-key pattern",
                format!(
                    "Key {} accounts for {:.0}% of {} recent events",
                    key,
                    ratio * 100.0,
                    recent.len()
                ),
            )
            .with_confidence(0.8)
            .with_metadata("dominant_key", key.to_string())
            .with_metadata("ratio", format!("{:.3}", ratio)),
        )
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn intervals_ms(&self) -> Vec<f64> {
        self.events
            .iter()
            .zip(self.events.iter().skip(1))
            .map(|(a, b)| (b.timestamp - a.timestamp).num_milliseconds() as f64)
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
