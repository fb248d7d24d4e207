//! Integrity Module - Record Signing
//!
//! - `signer.rs` - pluggable `Signer` collaborator + SHA-256 implementation
//! - `stamper.rs` - attaches timestamp and signature to normalized records

pub mod signer;
pub mod stamper;

pub use signer::{Sha256Signer, Signer};
pub use stamper::Stamper;
