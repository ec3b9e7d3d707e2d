//! # Linked Data Signature
//!
//! The proof protocol shared by every suite variant. Creation assembles the
//! proof metadata in a fixed order (template, type, date, identity, extension
//! hook, purpose), computes the verify data and signs it. Verification
//! recomputes the verify data from the existing proof, resolves the
//! verification method, checks the signature and finally the purpose.
//!
//! Verify data is the digest of the canonicalized proof options followed by
//! the digest of the canonicalized document, always in that order.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use credibil_ecc::Signer;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonicalize::{CanonicalizeOptions, Canonicalizer, Jcs};
use crate::config::{SuiteConfig, format_date, parse_date};
use crate::context::{self, Context};
use crate::error::{Error, Result};
use crate::loader::DocumentLoader;
use crate::method::{self, VerificationMethod};
use crate::proof::Proof;
use crate::purpose::{ProofPurpose, PurposeResult};
use crate::suites::SuiteType;

/// Hook run on a proof under construction, after identity stamping and
/// before purpose enrichment.
pub type Extension = Arc<dyn Fn(&mut Proof) -> Result<()> + Send + Sync>;

/// Typestate for a suite without a signer. Such a suite can only verify.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSigner;

/// The outcome of verifying a proof.
#[derive(Debug)]
pub enum Verification {
    /// Signature and purpose checked out.
    Verified {
        /// The purpose validator's result.
        purpose_result: PurposeResult,
    },

    /// Verification failed.
    Failed {
        /// Why verification failed.
        error: Error,
    },
}

impl Verification {
    /// Whether the proof verified.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// The failure, if verification failed.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Verified { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }

    /// The purpose result, if verification succeeded.
    #[must_use]
    pub const fn purpose_result(&self) -> Option<&PurposeResult> {
        match self {
            Self::Verified { purpose_result } => Some(purpose_result),
            Self::Failed { .. } => None,
        }
    }
}

impl From<Result<PurposeResult>> for Verification {
    fn from(result: Result<PurposeResult>) -> Self {
        match result {
            Ok(purpose_result) => Self::Verified { purpose_result },
            Err(error) => Self::Failed { error },
        }
    }
}

/// A configured signature suite.
///
/// `S` is the signer (or [`NoSigner`] for verification only), `C` the
/// canonicalizer and `D` the digest.
pub struct LinkedDataSignature<S = NoSigner, C = Jcs, D = Sha256> {
    suite: SuiteType,
    config: SuiteConfig,
    signer: S,
    canonicalizer: C,
    extension: Option<Extension>,
    digest: PhantomData<fn() -> D>,
}

impl LinkedDataSignature {
    /// A verification-only suite with default configuration.
    #[must_use]
    pub fn new(suite: SuiteType) -> Self {
        Self {
            suite,
            config: SuiteConfig::default(),
            signer: NoSigner,
            canonicalizer: Jcs,
            extension: None,
            digest: PhantomData,
        }
    }

    /// Start building a suite.
    #[must_use]
    pub fn builder(suite: SuiteType) -> SuiteBuilder {
        SuiteBuilder {
            suite,
            config: SuiteConfig::default(),
            signer: NoSigner,
            canonicalizer: Jcs,
            extension: None,
            digest: PhantomData,
        }
    }
}

impl<S, C, D> fmt::Debug for LinkedDataSignature<S, C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedDataSignature")
            .field("suite", &self.suite)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, C, D> LinkedDataSignature<S, C, D>
where
    S: Send + Sync,
    C: Canonicalizer,
    D: Digest,
{
    /// The suite variant.
    #[must_use]
    pub const fn suite(&self) -> SuiteType {
        self.suite
    }

    /// The suite configuration.
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Compute the verify data for a document and proof:
    /// `digest(canonical(proof options)) || digest(canonical(document))`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Canonicalization`] when the document is not an object
    /// or either input cannot be canonicalized.
    pub async fn create_verify_data(&self, document: &Value, proof: &Proof) -> Result<Vec<u8>> {
        if !document.is_object() {
            return Err(Error::Canonicalization("document must be a JSON object".into()));
        }

        let options = CanonicalizeOptions {
            native: self.config.use_native_canonize,
        };
        let proof_options = proof.options().to_value()?;
        let c14n_proof = self.canonicalizer.canonicalize(&proof_options, &options).await?;
        let c14n_document = self.canonicalizer.canonicalize(document, &options).await?;

        let mut verify_data = D::digest(&c14n_proof).to_vec();
        verify_data.extend_from_slice(&D::digest(&c14n_document));
        Ok(verify_data)
    }

    /// Resolve the verification method named by the proof and check that the
    /// suite can use its key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the proof names no method or the
    /// method cannot be found, [`Error::Revoked`] when it is revoked, and
    /// [`Error::KeyMismatch`] when its key type is not accepted.
    pub async fn get_verification_method(
        &self, proof: &Proof, loader: &impl DocumentLoader,
    ) -> Result<VerificationMethod> {
        let Some(id) = proof.verification_method_id() else {
            return Err(Error::NotFound("proof has no verification method".into()));
        };
        tracing::debug!(id, "get_verification_method");

        let contexts = [self.config.context.url(), self.suite.key_context()];
        let method = method::resolve(loader, id, &contexts).await?;
        self.suite.check_method(&method)?;
        Ok(method)
    }

    /// Check the proof's signature over the verify data.
    ///
    /// # Errors
    ///
    /// See [`SuiteType::verify_signature`].
    pub fn verify_signature(
        &self, verify_data: &[u8], proof: &Proof, method: &VerificationMethod,
    ) -> Result<bool> {
        self.suite.verify_signature(verify_data, proof, method)
    }

    /// Verify a proof over a document (the document without its `proof`).
    ///
    /// Never fails: every error is captured in [`Verification::Failed`].
    pub async fn verify_proof(
        &self, proof: &Proof, document: &Value, purpose: &impl ProofPurpose,
        loader: &impl DocumentLoader,
    ) -> Verification {
        tracing::debug!(proof_type = %proof.type_, "verify_proof");

        let verification: Verification =
            self.try_verify_proof(proof, document, purpose, loader).await.into();
        if let Some(error) = verification.error() {
            tracing::debug!(kind = %error.kind(), "proof failed verification: {error}");
        }
        verification
    }

    async fn try_verify_proof(
        &self, proof: &Proof, document: &Value, purpose: &impl ProofPurpose,
        loader: &impl DocumentLoader,
    ) -> Result<PurposeResult> {
        let verify_data = self.create_verify_data(document, proof).await?;
        let method = self.get_verification_method(proof, loader).await?;

        if !self.verify_signature(&verify_data, proof, &method)? {
            return Err(Error::SignatureInvalid);
        }

        let result = purpose.validate(proof, &method, loader).await;
        if !result.valid {
            let reason = result.error.unwrap_or_else(|| "proof purpose not valid".into());
            return Err(Error::PurposeInvalid(reason));
        }
        Ok(result)
    }
}

impl<S, C, D> LinkedDataSignature<S, C, D>
where
    S: Signer,
    C: Canonicalizer,
    D: Digest,
{
    /// Sign the verify data, attaching the signature to the proof.
    ///
    /// # Errors
    ///
    /// See [`SuiteType::sign`].
    pub async fn sign(&self, verify_data: &[u8], proof: &mut Proof) -> Result<()> {
        self.suite.sign(verify_data, proof, &self.signer).await
    }

    /// Create a signed proof for the document.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; no partially built proof is
    /// returned.
    pub async fn create_proof(&self, document: &Value, purpose: &impl ProofPurpose) -> Result<Proof> {
        tracing::debug!(suite = %self.suite, "create_proof");

        // base proof, from the template when one was supplied
        let mut proof = match &self.config.proof {
            Some(template) => {
                let mut compacted = context::compact(template)?;
                compacted.insert("type".into(), Value::from(self.suite.label()));
                Proof::from_value(Value::Object(compacted))?
            }
            None => Proof::default(),
        };
        proof.context = Some(Value::from(self.config.context.url()));
        proof.jws = None;
        proof.signature_value = None;
        proof.proof_value = None;

        proof.type_ = self.suite.label().to_string();

        let created = match (self.config.date()?, &proof.created) {
            (Some(date), _) => date,
            (None, Some(created)) => parse_date(created)?,
            (None, None) => Utc::now(),
        };
        proof.created = Some(format_date(&created));

        if let Some(verification_method) = &self.config.verification_method {
            proof.verification_method = Some(Value::from(verification_method.as_str()));
        }
        if let Some(creator) = &self.config.creator {
            proof.creator = Some(Value::from(creator.as_str()));
        }

        if let Some(extension) = &self.extension {
            extension(&mut proof)?;
        }

        purpose.update(&mut proof, document)?;

        let verify_data = self.create_verify_data(document, &proof).await?;
        self.sign(&verify_data, &mut proof).await?;

        Ok(proof)
    }
}

/// Builder for [`LinkedDataSignature`].
pub struct SuiteBuilder<S = NoSigner, C = Jcs, D = Sha256> {
    suite: SuiteType,
    config: SuiteConfig,
    signer: S,
    canonicalizer: C,
    extension: Option<Extension>,
    digest: PhantomData<fn() -> D>,
}

impl<S, C, D> SuiteBuilder<S, C, D> {
    /// Signer used to create proofs.
    #[must_use]
    pub fn signer<K: Signer>(self, signer: K) -> SuiteBuilder<K, C, D> {
        SuiteBuilder {
            suite: self.suite,
            config: self.config,
            signer,
            canonicalizer: self.canonicalizer,
            extension: self.extension,
            digest: self.digest,
        }
    }

    /// Canonicalizer used for the document and proof options.
    #[must_use]
    pub fn canonicalizer<K: Canonicalizer>(self, canonicalizer: K) -> SuiteBuilder<S, K, D> {
        SuiteBuilder {
            suite: self.suite,
            config: self.config,
            signer: self.signer,
            canonicalizer,
            extension: self.extension,
            digest: self.digest,
        }
    }

    /// Digest applied to canonicalized inputs.
    #[must_use]
    pub fn digest<K: Digest>(self) -> SuiteBuilder<S, C, K> {
        SuiteBuilder {
            suite: self.suite,
            config: self.config,
            signer: self.signer,
            canonicalizer: self.canonicalizer,
            extension: self.extension,
            digest: PhantomData,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Verification method to stamp on created proofs.
    #[must_use]
    pub fn verification_method(mut self, verification_method: impl Into<String>) -> Self {
        self.config.verification_method = Some(verification_method.into());
        self
    }

    /// Legacy `creator` to stamp on created proofs.
    #[must_use]
    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.config.creator = Some(creator.into());
        self
    }

    /// Partial proof used as the starting point for created proofs.
    #[must_use]
    pub fn proof(mut self, template: Value) -> Self {
        self.config.proof = Some(template);
        self
    }

    /// Creation date (RFC 3339), validated by [`SuiteBuilder::build`].
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.config.date = Some(date.into());
        self
    }

    /// Creation date.
    #[must_use]
    pub fn date_time(mut self, date: DateTime<Utc>) -> Self {
        self.config.date = Some(format_date(&date));
        self
    }

    /// Use the canonicalizer's native engine.
    #[must_use]
    pub fn use_native_canonize(mut self, native: bool) -> Self {
        self.config.use_native_canonize = native;
        self
    }

    /// Security context version for created proofs.
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.config.context = context;
        self
    }

    /// Hook adding suite-specific fields to proofs under construction.
    #[must_use]
    pub fn extension(
        mut self, extension: impl Fn(&mut Proof) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.extension = Some(Arc::new(extension));
        self
    }

    /// Validate the configuration and build the suite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the configuration is invalid.
    pub fn build(self) -> Result<LinkedDataSignature<S, C, D>> {
        self.config.validate()?;

        Ok(LinkedDataSignature {
            suite: self.suite,
            config: self.config,
            signer: self.signer,
            canonicalizer: self.canonicalizer,
            extension: self.extension,
            digest: self.digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn bad_date_fails_build() {
        let err = LinkedDataSignature::builder(SuiteType::Ed25519Signature2020)
            .date("not a date")
            .build()
            .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn verify_data_order() {
        let suite = LinkedDataSignature::new(SuiteType::Ed25519Signature2020);
        let document = json!({"name": "Alice"});
        let proof = Proof {
            type_: "Ed25519Signature2020".into(),
            created: Some("2020-01-01T00:00:00Z".into()),
            ..Proof::default()
        };

        let verify_data = suite.create_verify_data(&document, &proof).await.expect("should create");
        assert_eq!(verify_data.len(), 64);

        let options = CanonicalizeOptions::default();
        let c14n_proof =
            Jcs.canonicalize(&proof.to_value().expect("value"), &options).await.expect("c14n");
        let c14n_doc = Jcs.canonicalize(&document, &options).await.expect("c14n");
        assert_eq!(&verify_data[..32], Sha256::digest(&c14n_proof).as_slice());
        assert_eq!(&verify_data[32..], Sha256::digest(&c14n_doc).as_slice());
    }

    #[tokio::test]
    async fn document_must_be_object() {
        let suite = LinkedDataSignature::new(SuiteType::Ed25519Signature2020);
        let err = suite
            .create_verify_data(&json!("just a string"), &Proof::default())
            .await
            .expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Canonicalization);
    }
}
