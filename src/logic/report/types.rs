//! Result Types
//!
//! Core types cho detection results. KHÔNG chứa logic ngoài derived fields.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// THREAT LEVEL
// ============================================================================

/// Severity ordering reduced by maximum across a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThreatLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::None => "none",
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DETECTION KIND
// ============================================================================

/// Which category of system state produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionKind {
    Process,
    Module,
    Driver,
    Network,
    FileIntegrity,
    Virtualization,
    Registry,
    Activity,
    SteamAccounts,
    HardwareProfile,
    InputManipulation,
    ScreenshotBlocker,
    SystemManipulation,
    MemoryScanner,
    Sandbox,
}

impl std::fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Display tier derived from the raw confidence score.
///
/// Boundaries are half-open: exactly 0.8 maps to VeryHigh, not High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    VeryLow,  // < 0.2
    Low,      // < 0.4
    Medium,   // < 0.6
    High,     // < 0.8
    VeryHigh, // < 1.0
    Certain,  // = 1.0
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            ConfidenceLevel::Certain
        } else if score >= 0.8 {
            ConfidenceLevel::VeryHigh
        } else if score >= 0.6 {
            ConfidenceLevel::High
        } else if score >= 0.4 {
            ConfidenceLevel::Medium
        } else if score >= 0.2 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

// ============================================================================
// DETECTION RESULT
// ============================================================================

/// A single finding. Immutable once constructed; owned by the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub kind: DetectionKind,
    pub level: ThreatLevel,
    pub description: String,
    pub details: String,
    /// Probability this is a true positive (0.0 - 1.0)
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
    /// Free-form evidentiary fields, ordered by key
    pub metadata: BTreeMap<String, String>,
}

impl DetectionResult {
    pub fn new(
        kind: DetectionKind,
        level: ThreatLevel,
        description: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            level,
            description: description.into(),
            details: details.into(),
            confidence: 1.0,
            detected_at: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style confidence override, clamped to [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Builder-style metadata insert
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Uncertain + no worse than Medium = worth surfacing, but flagged
    pub fn is_possible_false_positive(&self) -> bool {
        self.confidence < 0.6 && self.level <= ThreatLevel::Medium
    }
}

// ============================================================================
// TESTS
// ============================================================================
