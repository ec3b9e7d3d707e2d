//! # Linked Data Proofs
//!
//! Create and verify Linked Data Proofs: signatures over a JSON document and
//! the proof's own metadata, checked against a verification method resolved
//! through a caller-supplied [`DocumentLoader`].
//!
//! A suite ([`LinkedDataSignature`]) runs the proof protocol for one
//! signature suite ([`SuiteType`]). Proof purposes ([`ProofPurpose`]) decide
//! what a proof may authorize, and [`ProofSet`] manages documents carrying
//! several proofs.
//!
//! ```rust,ignore
//! let keypair = Keypair::generate(Curve::Ed25519);
//! let suite = LinkedDataSignature::builder(SuiteType::Ed25519Signature2020)
//!     .signer(keypair)
//!     .verification_method("did:example:alice#key-1")
//!     .build()?;
//!
//! let purpose = ControllerProofPurpose::assertion();
//! let proof = suite.create_proof(&document, &purpose).await?;
//! let verification = suite.verify_proof(&proof, &document, &purpose, &loader).await;
//! ```

pub mod canonicalize;
pub mod config;
pub mod context;
mod error;
pub mod loader;
pub mod method;
pub mod proof;
pub mod proof_set;
pub mod purpose;
pub mod suite;
pub mod suites;

pub use credibil_ecc::{Algorithm, Curve, Keypair, PublicKey, Signer};

pub use crate::canonicalize::{CanonicalizeOptions, Canonicalizer, Jcs};
pub use crate::config::SuiteConfig;
pub use crate::context::Context;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::loader::DocumentLoader;
pub use crate::method::VerificationMethod;
pub use crate::proof::Proof;
pub use crate::proof_set::{ProofResult, ProofSet, ProofSetResult};
pub use crate::purpose::{
    AuthenticationProofPurpose, ControllerProofPurpose, ProofPurpose, PurposeResult,
    TimestampWindow,
};
pub use crate::suite::{LinkedDataSignature, NoSigner, SuiteBuilder, Verification};
pub use crate::suites::{SignatureEncoding, SuiteType, SuiteTable};
