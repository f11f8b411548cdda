//! Detection Result Model
//!
//! The common currency of every detector: a typed, leveled,
//! confidence-scored finding, and the report that aggregates them.

pub mod summary;
pub mod types;

pub use summary::ScanReport;
pub use types::{ConfidenceLevel, DetectionKind, DetectionResult, ThreatLevel};
