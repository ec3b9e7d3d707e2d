//! # Elliptic Curve Cryptography (ECC) Utilities
//!
//! Key material, signature algorithms and the [`Signer`] abstraction used by
//! Linked Data Proof suites. This crate provides common utilities for the
//! Credibil project and is not intended to be used directly.

mod core;
mod keypair;
mod sign;

pub use self::core::*;
pub use self::keypair::*;
pub use self::sign::*;
