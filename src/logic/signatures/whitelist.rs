//! Whitelist
//!
//! Trust lists consulted before any threat verdict. Covers processes
//! and modules (substring), install paths (prefix or regex), and
//! services (exact or substring).
//!
//! File format, one entry per line:
//!
//! ```text
//! process:devenv
//! module:vcruntime140
//! path:c:\tools\approved
//! service:easyanticheat
//! pattern:\\steamapps\\common\\
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{info, warn};
use regex::Regex;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Development tooling and Windows system processes, never flagged
const DEFAULT_PROCESSES: &[&str] = &[
    "devenv",
    "msbuild",
    "servicehub",
    "vbcscompiler",
    "testhost",
    "vstest.console",
    "dotnet",
    "conhost",
    "explorer",
    "svchost",
    "dwm",
    "csrss",
    "wininit",
    "services",
    "lsass",
    "winlogon",
    "fontdrvhost",
];

/// Install-location prefixes treated as trusted
const DEFAULT_PATHS: &[&str] = &[
    "c:\\windows\\system32",
    "c:\\windows\\syswow64",
    "c:\\program files\\microsoft visual studio",
    "c:\\program files\\dotnet",
    "c:\\program files\\windowsapps",
    "c:\\windows\\microsoft.net",
    "c:\\windows\\assembly",
];

/// Anti-cheat and networking services that look invasive but are expected
const DEFAULT_SERVICES: &[&str] = &[
    "easyanticheat",
    "easyanticheat_eos",
    "battleye",
    "vgc",
    "vgk",
    "faceit",
    "anticheatexpert",
    "vanguard",
    "riot vanguard",
    "punkbuster",
    "xigncode",
    "gameguard",
    "nprotect",
    "hackshield",
    "xtrap",
    "wellbia",
    "fdrespub",
    "fdphost",
    "wcncsvc",
    "bthserv",
];

/// Runtime and framework module names matched by substring
const DEFAULT_MODULES: &[&str] = &[
    "microsoft.visualstudio",
    "system.windows",
    "presentationframework",
    "presentationcore",
    "windowsbase",
    "system.xaml",
    "wpfgfx",
    "system.configuration.configurationmanager",
    "uiautomation",
    "icsharpcode.decompiler",
    "microsoft.extensions.dependencyinjection",
    "debuggerproxy",
    "directwriteforwarder",
    "d3dcompiler",
    "vcruntime140",
    "msvcp140",
    "ucrtbase",
];

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct Whitelist {
    processes: Vec<String>,
    modules: Vec<String>,
    paths: Vec<String>,
    services: HashSet<String>,
    /// Trusted-path regexes
    patterns: Vec<Regex>,
}

// ============================================================================
// CORE LOGIC
// ============================================================================

impl Whitelist {
    pub fn new() -> Self {
        Self {
            processes: DEFAULT_PROCESSES.iter().map(|s| s.to_string()).collect(),
            modules: DEFAULT_MODULES.iter().map(|s| s.to_string()).collect(),
            paths: DEFAULT_PATHS.iter().map(|s| s.to_string()).collect(),
            services: DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect(),
            patterns: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            processes: Vec::new(),
            modules: Vec::new(),
            paths: Vec::new(),
            services: HashSet::new(),
            patterns: Vec::new(),
        }
    }

    /// Trusted process: substring match, so variants like
    /// vstest.console.x86 are covered by their base entry
    pub fn is_trusted_process(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.processes.iter().any(|p| lower.contains(p))
    }

    /// Trusted module: substring match against known runtime modules
    pub fn is_trusted_module(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.modules.iter().any(|m| lower.contains(m))
    }

    /// Trusted path: case-insensitive prefix match or trusted-path regex
    pub fn is_trusted_path(&self, path: &str) -> bool {
        let lower = path.to_lowercase();
        self.paths.iter().any(|p| lower.starts_with(p)) || self.matches_pattern(&lower)
    }

    /// Trusted service: exact name or substring (launcher/helper variants)
    pub fn is_trusted_service(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.services.contains(&lower) || self.services.iter().any(|s| lower.contains(s))
    }

    fn matches_pattern(&self, lower_path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(lower_path))
    }

    pub fn add_process(&mut self, name: &str) {
        self.processes.push(name.to_lowercase());
    }

    pub fn add_module(&mut self, name: &str) {
        self.modules.push(name.to_lowercase());
    }

    pub fn add_path(&mut self, path: &str) {
        self.paths.push(path.to_lowercase());
    }

    pub fn add_service(&mut self, name: &str) {
        self.services.insert(name.to_lowercase());
    }

    /// Compile and add a trusted-path regex. Malformed patterns are
    /// skipped with a warning, never fatal.
    pub fn add_pattern(&mut self, pattern: &str) {
        match Regex::new(pattern) {
            Ok(re) => self.patterns.push(re),
            Err(e) => warn!("[Whitelist] Skipping invalid pattern '{}': {}", pattern, e),
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Load from file, merging over the defaults. Missing file = defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let mut wl = Self::new();
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                info!(
                    "[Whitelist] No config at {}, using built-in set",
                    path.display()
                );
                return wl;
            }
        };

        let mut loaded = 0usize;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((kind, value)) = line.split_once(':') else {
                warn!("[Whitelist] Skipping malformed line: {}", line);
                continue;
            };
            let value = value.trim();
            match kind {
                "process" => wl.add_process(value),
                "module" => wl.add_module(value),
                "path" => wl.add_path(value),
                "service" => wl.add_service(value),
                "pattern" => wl.add_pattern(value),
                _ => {
                    warn!("[Whitelist] Unknown entry kind '{}', skipping", kind);
                    continue;
                }
            }
            loaded += 1;
        }

        info!("[Whitelist] Loaded {} entries from {}", loaded, path.display());
        wl
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_process_trust() {
        let wl = Whitelist::new();
        assert!(wl.is_trusted_process("svchost"));
        assert!(wl.is_trusted_process("Devenv"));
        assert!(!wl.is_trusted_process("cheatengine"));
    }

    #[test]
    fn test_process_trust_covers_name_variants() {
        let wl = Whitelist::new();
        assert!(wl.is_trusted_process("vstest.console.x86"));
        assert!(wl.is_trusted_process("ServiceHub.Host.dotnet.x64"));
    }

    #[test]
    fn test_path_prefix_trust() {
        let wl = Whitelist::new();
        assert!(wl.is_trusted_path("C:\\Windows\\System32\\svchost.exe"));
        assert!(wl.is_trusted_path("c:\\program files\\dotnet\\dotnet.exe"));
        assert!(!wl.is_trusted_path("C:\\Users\\x\\Downloads\\tool.exe"));
    }

    #[test]
    fn test_module_substring_trust() {
        let wl = Whitelist::new();
        assert!(wl.is_trusted_module("VCRUNTIME140.dll"));
        assert!(wl.is_trusted_module("PresentationFramework.ni.dll"));
        assert!(!wl.is_trusted_module("hook_x64.dll"));
    }

    #[test]
    fn test_service_trust() {
        let wl = Whitelist::new();
        assert!(wl.is_trusted_service("EasyAntiCheat"));
        assert!(wl.is_trusted_service("vgk"));
        assert!(!wl.is_trusted_service("randomsvc"));
    }

    #[test]
    fn test_service_trust_covers_suffixed_variants() {
        let wl = Whitelist::new();
        assert!(wl.is_trusted_service("EasyAntiCheat_launcher"));
        assert!(wl.is_trusted_service("BattlEye Service"));
    }

    #[test]
    fn test_regex_pattern_applies_to_paths() {
        let mut wl = Whitelist::empty();
        wl.add_pattern(r"\\steamapps\\common\\");
        assert!(wl.is_trusted_path("D:\\Games\\steamapps\\common\\Game\\game.exe"));
        assert!(!wl.is_trusted_path("D:\\Downloads\\game.exe"));
        // Patterns never apply to bare process names
        assert!(!wl.is_trusted_process("steamapps"));
    }

    #[test]
    fn test_malformed_regex_is_skipped() {
        let mut wl = Whitelist::empty();
        wl.add_pattern("[unclosed");
        // Nothing trusted, nothing panicked
        assert!(!wl.is_trusted_path("c:\\anything"));
    }

    #[test]
    fn test_file_load_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whitelist.cfg");
        fs::write(
            &path,
            "# approvals\nprocess:mytool\npath:d:\\approved\nservice:customac\npattern:^e:\\\\builds\\\\\nbadline\n",
        )
        .unwrap();

        let wl = Whitelist::load(&path);
        assert!(wl.is_trusted_process("mytool"));
        assert!(wl.is_trusted_process("svchost")); // defaults retained
        assert!(wl.is_trusted_path("D:\\Approved\\sub\\x.exe"));
        assert!(wl.is_trusted_service("customac"));
        assert!(wl.is_trusted_path("E:\\builds\\nightly\\tool.exe"));
    }
}
