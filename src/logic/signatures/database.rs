//! Signature Database
//!
//! Known threat names (exact match) and suspicious substrings, with a
//! plain-text persistence format:
//!
//! ```text
//! # comment
//! THREAT:cheatengine
//! PATTERN:injector
//! ```
//!
//! All matching is case-insensitive; names are normalized to lowercase
//! at insertion time.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use log::{info, warn};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Exact process names shipped as known threats
const DEFAULT_THREATS: &[&str] = &[
    "cheatengine",
    "cheatengine-x86_64",
    "cheatengine-i386",
    "x64dbg",
    "x32dbg",
    "ollydbg",
    "ida",
    "ida64",
    "processhacker",
    "extremeinjector",
    "winject",
    "reshade",
    "rivatuner",
    "msi afterburner",
    "artmoney",
    "gameguardian",
    "lucky patcher",
];

/// Substrings that mark a name as suspicious (not proof on their own)
const DEFAULT_PATTERNS: &[&str] = &[
    "cheat",
    "hack",
    "trainer",
    "injector",
    "inject",
    "bypass",
    "unlocker",
    "crack",
    "keygen",
    "aimbot",
    "wallhack",
    "esp",
    "triggerbot",
    "macro",
    "autoclicker",
    "mouserecorder",
    "debugger",
    "disassembler",
    "decompiler",
];

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct SignatureDatabase {
    threats: HashSet<String>,
    patterns: HashSet<String>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl SignatureDatabase {
    /// Database preloaded with the built-in signature set
    pub fn new() -> Self {
        Self {
            threats: DEFAULT_THREATS.iter().map(|s| s.to_string()).collect(),
            patterns: DEFAULT_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Empty database, for tests and custom loads
    pub fn empty() -> Self {
        Self {
            threats: HashSet::new(),
            patterns: HashSet::new(),
        }
    }

    /// Exact known-threat lookup (case-insensitive)
    pub fn is_known_threat(&self, name: &str) -> bool {
        self.threats.contains(&name.to_lowercase())
    }

    /// Substring pattern match (case-insensitive). Returns the first
    /// matching pattern so the caller can cite it in the finding.
    pub fn matching_pattern(&self, name: &str) -> Option<&str> {
        let lower = name.to_lowercase();
        self.patterns
            .iter()
            .find(|p| lower.contains(p.as_str()))
            .map(|p| p.as_str())
    }

    pub fn has_suspicious_pattern(&self, name: &str) -> bool {
        self.matching_pattern(name).is_some()
    }

    pub fn add_threat(&mut self, name: &str) {
        self.threats.insert(name.to_lowercase());
    }

    pub fn add_pattern(&mut self, pattern: &str) {
        self.patterns.insert(pattern.to_lowercase());
    }

    pub fn threat_count(&self) -> usize {
        self.threats.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Load from file, merging over the defaults. A missing file is not
    /// an error: the built-in set still applies.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let mut db = Self::new();
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                info!(
                    "[Signatures] No database at {}, using built-in set",
                    path.display()
                );
                return db;
            }
        };

        let mut loaded = 0usize;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix("THREAT:") {
                db.add_threat(name.trim());
                loaded += 1;
            } else if let Some(pattern) = line.strip_prefix("PATTERN:") {
                db.add_pattern(pattern.trim());
                loaded += 1;
            } else {
                warn!("[Signatures] Skipping malformed line: {}", line);
            }
        }

        info!(
            "[Signatures] Loaded {} entries from {} ({} threats, {} patterns total)",
            loaded,
            path.display(),
            db.threats.len(),
            db.patterns.len()
        );
        db
    }

    /// Write the full set back out, threats first then patterns,
    /// separated by a blank line. Round-trips with `load`.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut file = fs::File::create(path.as_ref())?;
        writeln!(file, "# SentinelAC signature database")?;

        let mut threats: Vec<_> = self.threats.iter().collect();
        threats.sort();
        for t in threats {
            writeln!(file, "THREAT:{}", t)?;
        }

        writeln!(file)?;

        let mut patterns: Vec<_> = self.patterns.iter().collect();
        patterns.sort();
        for p in patterns {
            writeln!(file, "PATTERN:{}", p)?;
        }
        Ok(())
    }
}

impl Default for SignatureDatabase {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
