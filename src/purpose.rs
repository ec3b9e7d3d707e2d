//! # Proof Purposes
//!
//! A proof purpose states what a proof is allowed to authorize. At creation
//! the purpose enriches the proof (`proofPurpose`, plus fields like
//! `challenge` and `domain`); at verification it judges, independently of
//! the signature, whether the proof is acceptable for the claimed purpose.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::parse_date;
use crate::error::Result;
use crate::loader::DocumentLoader;
use crate::method::VerificationMethod;
use crate::proof::Proof;

/// Outcome of a purpose validation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PurposeResult {
    /// Whether the proof is valid for the purpose.
    pub valid: bool,

    /// Controller document the verification method was checked against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<Value>,

    /// Why the proof is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PurposeResult {
    /// A successful validation.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            valid: true,
            controller: None,
            error: None,
        }
    }

    /// A failed validation.
    #[must_use]
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            controller: None,
            error: Some(error.into()),
        }
    }
}

/// Proof purpose validator.
pub trait ProofPurpose: Send + Sync {
    /// The purpose term, e.g. `assertionMethod`.
    fn term(&self) -> &str;

    /// Enrich a proof under construction.
    ///
    /// # Errors
    ///
    /// Returns an error when the proof cannot be enriched.
    fn update(&self, proof: &mut Proof, _document: &Value) -> Result<()> {
        proof.proof_purpose = Some(self.term().to_string());
        Ok(())
    }

    /// Whether a proof claims this purpose.
    fn matches(&self, proof: &Proof) -> bool {
        proof.proof_purpose.as_deref() == Some(self.term())
    }

    /// Judge whether the proof is valid for this purpose given its resolved
    /// verification method.
    fn validate<L: DocumentLoader>(
        &self, proof: &Proof, method: &VerificationMethod, loader: &L,
    ) -> impl Future<Output = PurposeResult> + Send;
}

/// Acceptance window for a proof's `created` timestamp.
#[derive(Clone, Debug, Default)]
pub struct TimestampWindow {
    /// Reference time (defaults to now).
    pub date: Option<DateTime<Utc>>,

    /// Maximum distance between `created` and the reference time. No limit
    /// when unset.
    pub max_delta: Option<Duration>,
}

impl TimestampWindow {
    /// Check the proof's creation time.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure when `created` is missing,
    /// malformed or outside the window.
    pub fn check(&self, proof: &Proof) -> Result<(), String> {
        let Some(max_delta) = self.max_delta else {
            return Ok(());
        };
        let Some(created) = &proof.created else {
            return Err("proof has no `created` timestamp".into());
        };
        let created = parse_date(created).map_err(|e| e.to_string())?;
        let date = self.date.unwrap_or_else(Utc::now);

        if (date - created).abs() > max_delta {
            return Err("proof `created` is outside the acceptable window".into());
        }
        Ok(())
    }
}

/// A purpose requiring the verification method to be listed, under the
/// purpose term, in its controller's document.
#[derive(Clone, Debug)]
pub struct ControllerProofPurpose {
    term: String,
    controller: Option<Value>,
    window: TimestampWindow,
}

impl ControllerProofPurpose {
    /// Create a controller purpose for the given term.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            controller: None,
            window: TimestampWindow::default(),
        }
    }

    /// The `assertionMethod` purpose.
    #[must_use]
    pub fn assertion() -> Self {
        Self::new("assertionMethod")
    }

    /// Check against this controller document instead of loading the
    /// method's controller.
    #[must_use]
    pub fn controller(mut self, controller: Value) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Reference time for the timestamp window.
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.window.date = Some(date);
        self
    }

    /// Maximum accepted distance between `created` and the reference time.
    #[must_use]
    pub const fn max_timestamp_delta(mut self, delta: Duration) -> Self {
        self.window.max_delta = Some(delta);
        self
    }

    async fn controller_document<L: DocumentLoader>(
        &self, method: &VerificationMethod, loader: &L,
    ) -> Result<Value, String> {
        if let Some(controller) = &self.controller {
            return Ok(controller.clone());
        }
        let Some(id) = method.controller_id() else {
            return Err(format!("verification method {} has no controller", method.id));
        };
        let url = id.split('#').next().unwrap_or(id);
        match loader.load(url).await {
            Ok(Some(document)) => Ok(document),
            Ok(None) => Err(format!("controller {id} not found")),
            Err(e) => Err(format!("issue loading controller {id}: {e}")),
        }
    }
}

impl ProofPurpose for ControllerProofPurpose {
    fn term(&self) -> &str {
        &self.term
    }

    async fn validate<L: DocumentLoader>(
        &self, proof: &Proof, method: &VerificationMethod, loader: &L,
    ) -> PurposeResult {
        if let Err(e) = self.window.check(proof) {
            return PurposeResult::invalid(e);
        }

        let controller = match self.controller_document(method, loader).await {
            Ok(controller) => controller,
            Err(e) => return PurposeResult::invalid(e),
        };

        let base = controller.get("id").and_then(Value::as_str);
        let listed = match controller.get(&self.term) {
            Some(Value::Array(entries)) => entries.iter().any(|e| lists(e, &method.id, base)),
            Some(entry) => lists(entry, &method.id, base),
            None => false,
        };

        if !listed {
            return PurposeResult {
                controller: Some(controller),
                ..PurposeResult::invalid(format!(
                    "verification method {} is not authorized for `{}`",
                    method.id, self.term
                ))
            };
        }

        PurposeResult {
            controller: Some(controller),
            ..PurposeResult::valid()
        }
    }
}

// Whether a purpose entry (an identifier or an embedded method) names `id`.
fn lists(entry: &Value, id: &str, base: Option<&str>) -> bool {
    let entry_id = match entry {
        Value::String(s) => s.as_str(),
        Value::Object(map) => match map.get("id").and_then(Value::as_str) {
            Some(s) => s,
            None => return false,
        },
        _ => return false,
    };

    match (entry_id.strip_prefix('#'), base) {
        (Some(fragment), Some(base)) => format!("{base}#{fragment}") == id,
        _ => entry_id == id,
    }
}

/// The `authentication` purpose: binds the proof to a verifier-supplied
/// challenge (and optionally a domain).
#[derive(Clone, Debug)]
pub struct AuthenticationProofPurpose {
    challenge: String,
    domain: Option<String>,
    inner: ControllerProofPurpose,
}

impl AuthenticationProofPurpose {
    /// Create an authentication purpose for the given challenge.
    #[must_use]
    pub fn new(challenge: impl Into<String>) -> Self {
        Self {
            challenge: challenge.into(),
            domain: None,
            inner: ControllerProofPurpose::new("authentication"),
        }
    }

    /// Restrict the proof to a domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Check against this controller document instead of loading the
    /// method's controller.
    #[must_use]
    pub fn controller(mut self, controller: Value) -> Self {
        self.inner = self.inner.controller(controller);
        self
    }

    /// Maximum accepted distance between `created` and now.
    #[must_use]
    pub fn max_timestamp_delta(mut self, delta: Duration) -> Self {
        self.inner = self.inner.max_timestamp_delta(delta);
        self
    }
}

impl ProofPurpose for AuthenticationProofPurpose {
    fn term(&self) -> &str {
        self.inner.term()
    }

    fn update(&self, proof: &mut Proof, document: &Value) -> Result<()> {
        self.inner.update(proof, document)?;
        proof.challenge = Some(self.challenge.clone());
        if let Some(domain) = &self.domain {
            proof.domain = Some(domain.clone());
        }
        Ok(())
    }

    async fn validate<L: DocumentLoader>(
        &self, proof: &Proof, method: &VerificationMethod, loader: &L,
    ) -> PurposeResult {
        if proof.challenge.as_deref() != Some(self.challenge.as_str()) {
            return PurposeResult::invalid("the challenge does not match");
        }
        if let Some(domain) = &self.domain
            && proof.domain.as_deref() != Some(domain.as_str())
        {
            return PurposeResult::invalid("the domain does not match");
        }
        self.inner.validate(proof, method, loader).await
    }
}
