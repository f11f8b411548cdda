//! Scan Report
//!
//! Created at scan start, appended to by the orchestrator while merging,
//! sealed when every detector has finished. All aggregates are pure
//! functions of the detection sequence and are recomputed on read so they
//! can never drift from the underlying data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{DetectionResult, ThreatLevel};

// ============================================================================
// SCAN REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Append-only; ordering = registration order, then detector order
    pub detections: Vec<DetectionResult>,
}

impl ScanReport {
    pub fn new() -> Self {
        Self {
            scan_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            completed_at: None,
            detections: Vec::new(),
        }
    }

    /// Merge one detector's output, preserving its internal ordering
    pub fn merge(&mut self, results: Vec<DetectionResult>) {
        self.detections.extend(results);
    }

    /// Set the completion timestamp. Idempotent.
    pub fn seal(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|done| done - self.started_at)
    }

    // ------------------------------------------------------------------
    // Derived aggregates (recomputed on every read, never cached)
    // ------------------------------------------------------------------

    /// Number of findings produced, not number of subjects examined
    pub fn total_checks(&self) -> usize {
        self.detections.len()
    }

    /// Maximum level across all findings; None when the report is empty
    pub fn overall_level(&self) -> ThreatLevel {
        self.detections
            .iter()
            .map(|d| d.level)
            .max()
            .unwrap_or(ThreatLevel::None)
    }

    /// Clean = no finding at Medium or above that is not a likely false positive
    pub fn is_clean(&self) -> bool {
        !self
            .detections
            .iter()
            .any(|d| d.level >= ThreatLevel::Medium && !d.is_possible_false_positive())
    }

    pub fn high_confidence_count(&self) -> usize {
        self.detections.iter().filter(|d| d.confidence >= 0.8).count()
    }

    pub fn possible_false_positive_count(&self) -> usize {
        self.detections
            .iter()
            .filter(|d| d.is_possible_false_positive())
            .count()
    }

    pub fn average_confidence(&self) -> f64 {
        if self.detections.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.detections.iter().map(|d| d.confidence).sum();
        sum / self.detections.len() as f64
    }

    /// Confident, actionable findings; level descending, then confidence descending
    pub fn high_confidence_threats(&self) -> Vec<&DetectionResult> {
        let mut threats: Vec<&DetectionResult> = self
            .detections
            .iter()
            .filter(|d| d.confidence >= 0.8 && d.level >= ThreatLevel::Medium)
            .collect();
        threats.sort_by(|a, b| {
            b.level.cmp(&a.level).then(
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        });
        threats
    }

    /// Uncertain findings, least certain first
    pub fn possible_false_positives(&self) -> Vec<&DetectionResult> {
        let mut uncertain: Vec<&DetectionResult> = self
            .detections
            .iter()
            .filter(|d| d.is_possible_false_positive())
            .collect();
        uncertain.sort_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        uncertain
    }

    /// JSON export for external report consumers
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for ScanReport {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
