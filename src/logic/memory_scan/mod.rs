//! Live Process Memory Scanning
//!
//! Byte-signature matching with wildcard support (`patterns`) and the
//! Windows region walker that feeds it (`region`). Off Windows the
//! walker compiles to a stub that scans nothing.

pub mod patterns;
pub mod region;

pub use patterns::{find_signature, matches_at, MemorySignature, WILDCARD};
pub use region::scan_process;
