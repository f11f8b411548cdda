//! Logic Module - Detection Engines
//!
//! Chứa các engines xử lý: Signatures, Anomaly, Input Timing, Memory Scan,
//! Detectors và Scan Orchestrator.
//!
//! ## Architecture
//! - `report/` - Detection result model (kind, level, confidence, report)
//! - `signatures/` - Signature + whitelist matching (identity checks)
//! - `anomaly/` - Statistical anomaly engine (entropy, z-score, Bayes, Pearson)
//! - `input_timing` - Rolling input event buffer + automation heuristics
//! - `memory_scan/` - Byte-signature scanning of live process memory
//! - `detectors/` - Detector units registered with the engine
//! - `engine` - Concurrent scan orchestrator

pub mod config;
pub mod report;
pub mod signatures;
pub mod anomaly;
pub mod input_timing;
pub mod memory_scan;
pub mod detectors;
pub mod engine;
