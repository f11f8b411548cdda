//! Signature + Whitelist Matching
//!
//! Identity-based checks: known-threat names, suspicious substrings, and
//! the trust lists that override them. Trust is always consulted before
//! threat status — a trusted subject never reaches the threat check.

pub mod database;
pub mod whitelist;

pub use database::SignatureDatabase;
pub use whitelist::Whitelist;
