//! # Proof Sets
//!
//! A document may carry several independent proofs under `proof`. Adding a
//! proof signs the document with all existing proofs removed; verifying
//! checks every proof whose purpose and suite the verifier accepts.
//!
//! A proof whose security context is already declared by the document is
//! stored without its own `@context` and given it back before verification.

use credibil_ecc::Signer;
use serde_json::{Map, Value};
use sha2::Digest;

use crate::canonicalize::Canonicalizer;
use crate::context::{self, SECURITY_CONTEXT_V1_URL, SECURITY_CONTEXT_V2_URL};
use crate::error::{Error, Result};
use crate::loader::DocumentLoader;
use crate::proof::Proof;
use crate::purpose::ProofPurpose;
use crate::suite::{LinkedDataSignature, Verification};
use crate::suites::SuiteTable;

/// Adds and verifies the proofs of a document.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProofSet;

/// Result of verifying a single proof in a set.
#[derive(Debug)]
pub struct ProofResult {
    /// The proof as verified (with any restored `@context`).
    pub proof: Proof,

    /// The proof's verification outcome.
    pub verification: Verification,
}

/// Result of verifying a proof set.
#[derive(Debug, Default)]
pub struct ProofSetResult {
    /// True when at least one proof was checked and every checked proof
    /// verified.
    pub verified: bool,

    /// Per-proof results.
    pub results: Vec<ProofResult>,

    /// Why the set could not be verified at all.
    pub error: Option<Error>,
}

impl ProofSet {
    /// Sign the document and add the new proof to its proof set.
    ///
    /// Returns the signed document; the input is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Canonicalization`] when the document is not an object,
    /// or any error raised while creating the proof.
    pub async fn add<S, C, D>(
        document: &Value, suite: &LinkedDataSignature<S, C, D>, purpose: &impl ProofPurpose,
    ) -> Result<Value>
    where
        S: Signer,
        C: Canonicalizer,
        D: Digest,
    {
        tracing::debug!(suite = %suite.suite(), "ProofSet::add");

        let Value::Object(document) = document else {
            return Err(Error::Canonicalization("document must be a JSON object".into()));
        };
        let mut unsigned = document.clone();
        let existing = unsigned.remove("proof");

        let mut proof = suite.create_proof(&Value::Object(unsigned), purpose).await?;
        if let Some(url) = document.get("@context").and_then(security_context)
            && proof.context.as_ref().and_then(Value::as_str) == Some(url)
        {
            proof.context = None;
        }
        let proof = proof.to_value()?;

        let proofs = match existing {
            None => proof,
            Some(Value::Array(mut proofs)) => {
                proofs.push(proof);
                Value::Array(proofs)
            }
            Some(other) => Value::Array(vec![other, proof]),
        };

        let mut signed = document.clone();
        signed.insert("proof".into(), proofs);
        Ok(Value::Object(signed))
    }

    /// Verify the proofs of a document.
    ///
    /// Only proofs claiming the purpose and produced by a suite in `suites`
    /// are checked. Never fails: errors are reported in the result.
    pub async fn verify(
        document: &Value, suites: &SuiteTable, purpose: &impl ProofPurpose,
        loader: &impl DocumentLoader,
    ) -> ProofSetResult {
        tracing::debug!("ProofSet::verify");

        match Self::try_verify(document, suites, purpose, loader).await {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(kind = %error.kind(), "proof set failed verification: {error}");
                ProofSetResult {
                    error: Some(error),
                    ..ProofSetResult::default()
                }
            }
        }
    }

    async fn try_verify(
        document: &Value, suites: &SuiteTable, purpose: &impl ProofPurpose,
        loader: &impl DocumentLoader,
    ) -> Result<ProofSetResult> {
        let Value::Object(document) = document else {
            return Err(Error::Canonicalization("document must be a JSON object".into()));
        };
        let (unsigned, proofs) = split(document)?;
        let restored = document.get("@context").and_then(security_context);

        let mut results = vec![];
        for value in proofs {
            // filter on the raw proof so foreign proofs are skipped unparsed
            let summary = summarize(&value);
            if !purpose.matches(&summary) {
                continue;
            }
            let Some(suite) = suites.get(&summary.type_) else {
                continue;
            };

            let mut proof = match Proof::from_value(value) {
                Ok(proof) => proof,
                Err(error) => {
                    results.push(ProofResult {
                        proof: summary,
                        verification: Verification::Failed { error },
                    });
                    continue;
                }
            };
            if proof.context.is_none() {
                proof.context = restored.map(Value::from);
            }

            let verification =
                LinkedDataSignature::new(suite).verify_proof(&proof, &unsigned, purpose, loader).await;
            results.push(ProofResult { proof, verification });
        }

        if results.is_empty() {
            return Err(Error::NotFound("no proofs matched the purpose and suites".into()));
        }

        Ok(ProofSetResult {
            verified: results.iter().all(|r| r.verification.is_verified()),
            results,
            error: None,
        })
    }
}

// Separate the document from its proofs.
fn split(document: &Map<String, Value>) -> Result<(Value, Vec<Value>)> {
    let mut unsigned = document.clone();
    let proofs = match unsigned.remove("proof") {
        None => return Err(Error::NotFound("document has no proof".into())),
        Some(Value::Array(proofs)) => proofs,
        Some(proof) => vec![proof],
    };
    Ok((Value::Object(unsigned), proofs))
}

// The `type` and `proofPurpose` of a proof that may not parse as a `Proof`.
fn summarize(proof: &Value) -> Proof {
    let text = |name: &str| proof.get(name).and_then(Value::as_str).map(ToString::to_string);
    Proof {
        type_: text("type").unwrap_or_default(),
        proof_purpose: text("proofPurpose"),
        ..Proof::default()
    }
}

// The security context a document declares, newest version first.
fn security_context(document_context: &Value) -> Option<&'static str> {
    [SECURITY_CONTEXT_V2_URL, SECURITY_CONTEXT_V1_URL]
        .into_iter()
        .find(|url| context::includes(document_context, url))
}
