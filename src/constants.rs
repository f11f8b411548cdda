//! Central Configuration Constants
//!
//! Single source of truth for all detection thresholds and scan limits.
//! To tune a detector, only edit this file.

/// App name
pub const APP_NAME: &str = "SentinelAC";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Statistical anomaly thresholds
// ============================================

/// Shannon entropy threshold for process names (bits/char)
///
/// Randomly generated loader names sit well above this; ordinary
/// product names ("explorer", "svchost") sit well below.
pub const ENTROPY_THRESHOLD: f64 = 3.5;

/// Z-score threshold for memory/thread outlier detection
pub const Z_SCORE_THRESHOLD: f64 = 2.5;

/// Pearson correlation threshold for coupled resource metrics
pub const CORRELATION_THRESHOLD: f64 = 0.85;

/// CPU-time variance below this with a full window = mechanical workload
pub const CPU_VARIANCE_FLOOR: f64 = 0.01;

/// Observation window capacity per tracked subject (FIFO)
pub const OBSERVATION_WINDOW: usize = 100;

/// Minimum samples before the entropy check runs
pub const ENTROPY_MIN_SAMPLES: usize = 10;

/// Minimum samples before z-score checks run
pub const ZSCORE_MIN_SAMPLES: usize = 20;

/// Minimum samples before Bayesian classification runs
pub const BAYES_MIN_SAMPLES: usize = 15;

/// Minimum samples before correlation / CPU-consistency checks run
pub const CORRELATION_MIN_SAMPLES: usize = 30;

// ============================================
// Bayesian classification parameters
// ============================================

/// Prior probability that an arbitrary process is malicious
pub const PRIOR_MALICIOUS: f64 = 0.05;

/// Prior probability that an arbitrary process is benign
pub const PRIOR_BENIGN: f64 = 0.95;

/// High-memory evidence boundary (bytes)
pub const HIGH_MEMORY_BYTES: u64 = 500 * 1024 * 1024;

/// High-thread evidence boundary
pub const HIGH_THREAD_COUNT: u32 = 50;

/// Posterior above this = flag the subject
pub const POSTERIOR_THRESHOLD: f64 = 0.7;

// ============================================
// Input timing analysis
// ============================================

/// Rolling input event buffer capacity (FIFO)
pub const INPUT_HISTORY_CAPACITY: usize = 1000;

/// Minimum events before any timing computation
pub const INPUT_MIN_EVENTS: usize = 50;

/// Robotic precision: CoV below (1 - this) = inhuman consistency
pub const ROBOT_PRECISION_THRESHOLD: f64 = 0.98;

/// Mean sequential interval difference below this (ms) = automated input
pub const SEQUENTIAL_DIFF_FLOOR_MS: f64 = 5.0;

/// Minimum intervals for the sequential-consistency check
pub const SEQUENTIAL_MIN_SAMPLES: usize = 30;

/// Frequency window length (seconds)
pub const FREQUENCY_WINDOW_SECS: i64 = 60;

/// Minimum events inside the frequency window before the rate check runs
pub const FREQUENCY_MIN_EVENTS: usize = 30;

/// Events per second above this = abnormal (typical human: 2-5/s)
pub const MAX_EVENTS_PER_SECOND: f64 = 20.0;

/// Dominant-key share above this = repetitive single-key pattern
pub const KEY_REPETITION_RATIO: f64 = 0.8;

/// Idle time boundary (ms) for treating key state as a fresh event
pub const INPUT_IDLE_WINDOW_MS: u32 = 100;

// ============================================
// Memory scanning limits
// ============================================

/// Max bytes read per memory region
pub const MAX_REGION_READ: usize = 512 * 1024;

/// Max regions walked per process
pub const MAX_REGIONS_PER_PROCESS: usize = 50;

/// Working-set size above which a process qualifies for a memory scan
pub const MEMORY_SCAN_MIN_WORKING_SET: u64 = 50 * 1024 * 1024;

// ============================================
// Orchestration
// ============================================

/// Per-detector wall-clock budget (seconds). A detector that exceeds it
/// is reported as a partial failure, not allowed to stall the scan.
pub const DETECTOR_TIMEOUT_SECS: u64 = 30;

// ============================================
// Helper functions to read paths from env with fallback
// ============================================

/// Get the signature database path from environment or use default
pub fn get_signatures_path() -> String {
    std::env::var("SENTINEL_SIGNATURES").unwrap_or_else(|_| "signatures.db".to_string())
}

/// Get the whitelist config path from environment or use default
pub fn get_whitelist_path() -> String {
    std::env::var("SENTINEL_WHITELIST").unwrap_or_else(|_| "whitelist.cfg".to_string())
}
