//! Memory Signatures
//!
//! Byte patterns for known cheat tooling: ASCII strings embedded in the
//! target's memory, and x86/x64 opcode sequences with 0x00 as wildcard.
//! String signatures carry higher confidence than opcode signatures,
//! which can collide with legitimate code.

use once_cell::sync::Lazy;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Wildcard byte in opcode patterns: matches any byte in the target
pub const WILDCARD: u8 = 0x00;

/// Confidence for ASCII string signatures
const STRING_CONFIDENCE: f64 = 0.99;

/// Confidence for opcode signatures
const OPCODE_CONFIDENCE: f64 = 0.75;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct MemorySignature {
    pub name: &'static str,
    pub pattern: Vec<u8>,
    pub confidence: f64,
}

/// Built-in signature set, strings first (higher confidence wins a tie
/// under first-match-wins ordering)
pub static SIGNATURES: Lazy<Vec<MemorySignature>> = Lazy::new(|| {
    let mut sigs: Vec<MemorySignature> = [
        "Cheat Engine",
        "CESERVER",
        "speedhack",
        "Dark Byte",
        "ArtMoney",
        "gamehack",
    ]
    .iter()
    .map(|s| MemorySignature {
        name: s,
        pattern: s.as_bytes().to_vec(),
        confidence: STRING_CONFIDENCE,
    })
    .collect();

    // fs:[0x30] TEB access followed by PEB walk, common CE stub prologue
    sigs.push(MemorySignature {
        name: "CE_Pattern1",
        pattern: vec![0x64, 0xA1, 0x30, 0x00, 0x00, 0x00, 0x8B, 0x40, 0x0C],
        confidence: OPCODE_CONFIDENCE,
    });
    // Indirect vtable call sequence used by CE speedhack hooks
    sigs.push(MemorySignature {
        name: "CE_Pattern2",
        pattern: vec![0x8B, 0x4D, 0xFC, 0x8B, 0x01, 0xFF, 0x50, 0x08],
        confidence: OPCODE_CONFIDENCE,
    });
    // push addr / call LoadLibrary / call eax injection shellcode
    sigs.push(MemorySignature {
        name: "Injection_LoadLibrary",
        pattern: vec![
            0x68, 0x00, 0x00, 0x00, 0x00, 0xE8, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xD0,
        ],
        confidence: OPCODE_CONFIDENCE,
    });
    // x64 scanner-loop prologue
    sigs.push(MemorySignature {
        name: "MemScan_Pattern1",
        pattern: vec![0x48, 0x83, 0xEC, 0x28, 0x48, 0x8B, 0x05],
        confidence: OPCODE_CONFIDENCE,
    });

    sigs
});

// ============================================================================
// CORE LOGIC
// ============================================================================

/// Pattern match at a fixed offset. 0x00 in the pattern matches anything.
pub fn matches_at(data: &[u8], offset: usize, pattern: &[u8]) -> bool {
    if offset + pattern.len() > data.len() {
        return false;
    }
    pattern
        .iter()
        .zip(&data[offset..offset + pattern.len()])
        .all(|(&p, &d)| p == WILDCARD || p == d)
}

/// Scan a buffer against the built-in signature set. First match wins;
/// returns the signature name and its confidence.
pub fn find_signature(data: &[u8]) -> Option<(&'static str, f64)> {
    for sig in SIGNATURES.iter() {
        if sig.pattern.is_empty() || sig.pattern.len() > data.len() {
            continue;
        }
        for offset in 0..=(data.len() - sig.pattern.len()) {
            if matches_at(data, offset, &sig.pattern) {
                return Some((sig.name, sig.confidence));
            }
        }
    }
    None
}

// ============================================================================
// TESTS
// ============================================================================
