//! Behavioral Analyzer
//!
//! Workload-shape checks: resource-metric correlation and CPU
//! consistency over its own anomaly engine (deliberately not shared
//! with the statistical detector), plus the input-timing heuristics.
//! Input recording happens outside the scan cycle: the host feeds
//! events through a shared handle (on Windows, from the key-state
//! poller below), and each scan analyzes whatever the buffer holds.

use std::sync::Arc;

use parking_lot::Mutex;
use sysinfo::System;

use crate::logic::anomaly::{AnomalyEngine, Observation, SubjectId};
use crate::logic::input_timing::InputTimingAnalyzer;
use crate::logic::report::{DetectionKind, DetectionResult};

use super::Detector;

// ============================================================================
// TYPES
// ============================================================================

pub struct BehaviorDetector {
    engine: Mutex<AnomalyEngine>,
    analyzer: Arc<Mutex<InputTimingAnalyzer>>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl BehaviorDetector {
    pub fn new() -> Self {
        Self {
            engine: Mutex::new(AnomalyEngine::new()),
            analyzer: Arc::new(Mutex::new(InputTimingAnalyzer::new())),
        }
    }

    /// Shared handle for the input event recorder
    pub fn recorder(&self) -> Arc<Mutex<InputTimingAnalyzer>> {
        Arc::clone(&self.analyzer)
    }

    fn sample(&self, sys: &System) {
        let now = chrono::Utc::now();
        let mut engine = self.engine.lock();
        for (pid, process) in sys.processes() {
            engine.record(
                SubjectId {
                    pid: pid.as_u32(),
                    name: process.name().to_string(),
                },
                Observation {
                    timestamp: now,
                    cpu_time_ms: process.cpu_usage() as f64,
                    memory_bytes: process.memory(),
                    thread_count: 0,
                    handle_count: 0,
                },
            );
        }
    }
}

impl Default for BehaviorDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for BehaviorDetector {
    fn name(&self) -> &'static str {
        "behavior"
    }

    fn kind(&self) -> DetectionKind {
        DetectionKind::Activity
    }

    fn scan(&self) -> Vec<DetectionResult> {
        let mut sys = System::new();
        sys.refresh_processes();
        self.sample(&sys);

        let mut results = Vec::new();
        {
            let engine = self.engine.lock();
            for subject in engine.subjects() {
                results.extend(engine.check_correlation(subject));
                results.extend(engine.check_cpu_consistency(subject));
            }
        }
        results.extend(self.analyzer.lock().analyze());
        results
    }
}

// ============================================================================
// KEY-STATE POLLER (Windows)
// ============================================================================

/// Polls keyboard state and records one event per distinct press.
///
/// A key still down within the idle window is the same press, not a new
/// event; without this gate a held key would look like machine-rate input.
#[cfg(windows)]
pub mod poller {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use parking_lot::Mutex;
    use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    use crate::constants;
    use crate::logic::input_timing::{InputEvent, InputTimingAnalyzer};

    /// Virtual-key range worth polling (backspace through OEM keys)
    const VK_RANGE: std::ops::RangeInclusive<i32> = 0x08..=0xFE;

    pub struct KeyPoller {
        analyzer: Arc<Mutex<InputTimingAnalyzer>>,
        last_seen: HashMap<u32, DateTime<Utc>>,
    }

    impl KeyPoller {
        pub fn new(analyzer: Arc<Mutex<InputTimingAnalyzer>>) -> Self {
            Self {
                analyzer,
                last_seen: HashMap::new(),
            }
        }

        /// One poll pass; call from a timer loop
        pub fn poll(&mut self) {
            let now = Utc::now();
            let idle = Duration::milliseconds(constants::INPUT_IDLE_WINDOW_MS as i64);
            for vk in VK_RANGE {
                // SAFETY: GetAsyncKeyState has no preconditions
                let state = unsafe { GetAsyncKeyState(vk) };
                if (state as u16) & 0x8000 == 0 {
                    continue;
                }
                let key = vk as u32;
                if let Some(&seen) = self.last_seen.get(&key) {
                    if now - seen < idle {
                        self.last_seen.insert(key, now);
                        continue; // same press, still held
                    }
                }
                self.last_seen.insert(key, now);
                self.analyzer.lock().record(InputEvent {
                    timestamp: now,
                    key_code: key,
                });
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use crate::logic::input_timing::InputEvent;
    use chrono::{Duration, Utc};

    #[test]
    fn test_empty_buffer_and_fresh_engine_scan_clean() {
        let d = BehaviorDetector::new();
        // Live sampling gives one observation per subject, below every
        // check's minimum, and the input buffer is empty
        assert!(d.scan().is_empty());
    }

    #[test]
    fn test_recorder_feeds_the_scan() {
        let d = BehaviorDetector::new();
        let recorder = d.recorder();

        // Perfectly uniform 50ms cadence across varied keys
        let mut t = Utc::now() - Duration::seconds(10);
        for i in 0..120u32 {
            recorder.lock().record(InputEvent {
                timestamp: t,
                key_code: i % 8,
            });
            t += Duration::milliseconds(50);
        }

        let results = d.scan();
        assert!(results
            .iter()
            .any(|r| r.description == "Robotic input timing"));
    }

    #[test]
    fn test_workload_checks_run_over_own_engine() {
        let d = BehaviorDetector::new();
        let subject = SubjectId {
            pid: 7777,
            name: "looper".to_string(),
        };
        {
            let mut engine = d.engine.lock();
            for i in 0..constants::CORRELATION_MIN_SAMPLES {
                engine.record(
                    subject.clone(),
                    Observation {
                        timestamp: chrono::Utc::now(),
                        cpu_time_ms: 5.0,
                        memory_bytes: 1_000_000 + (i % 7) as u64 * 123_456,
                        thread_count: 0,
                        handle_count: 0,
                    },
                );
            }
        }
        let engine = d.engine.lock();
        let flagged = engine.check_cpu_consistency(&subject);
        assert!(flagged.is_some());
    }
}
