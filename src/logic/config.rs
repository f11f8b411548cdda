//! Scan Configuration
//!
//! Runtime-tunable knobs for a scan run. Thresholds live in `constants`;
//! this struct carries the per-deployment values (file paths, timeout)
//! resolved once at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Signature database file (THREAT:/PATTERN: lines)
    pub signatures_path: String,
    /// Whitelist config file (process:/module:/path:/service:/pattern: lines)
    pub whitelist_path: String,
    /// Per-detector wall-clock budget
    pub detector_timeout: Duration,
    /// Skip detectors that declare they need elevation when we have none
    pub has_admin: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            signatures_path: constants::get_signatures_path(),
            whitelist_path: constants::get_whitelist_path(),
            detector_timeout: Duration::from_secs(constants::DETECTOR_TIMEOUT_SECS),
            has_admin: false,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, has_admin: bool) -> Self {
        self.has_admin = has_admin;
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_and_timeout() {
        let config = ScanConfig::default();
        assert!(!config.signatures_path.is_empty());
        assert!(!config.whitelist_path.is_empty());
        assert_eq!(
            config.detector_timeout,
            Duration::from_secs(constants::DETECTOR_TIMEOUT_SECS)
        );
        assert!(!config.has_admin);
    }

    #[test]
    fn test_admin_builder() {
        let config = ScanConfig::new().with_admin(true);
        assert!(config.has_admin);
    }
}
