//! # Proofs
//!
//! A Linked Data Proof is attached to a document under its `proof` property.
//! The proof carries the suite `type`, creation time, the identifier of the
//! verification method able to check it, purpose-specific fields and,
//! finally, the signature itself in one of the signature-bearing fields
//! (`jws`, `signatureValue` or `proofValue`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Names of the proof properties that carry a signature.
pub const SIGNATURE_FIELDS: [&str; 3] = ["jws", "signatureValue", "proofValue"];

/// A Linked Data Proof.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Vocabulary context the proof is expressed in.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// The suite that produced the proof.
    #[serde(rename = "type")]
    pub type_: String,

    /// When the proof was created (ISO-8601, UTC, whole seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Identifier of the verification method used to check the proof. May be
    /// a bare identifier or an object carrying an `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Value>,

    /// Legacy identifier of the verification method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Value>,

    /// The purpose the proof was created for (e.g. `assertionMethod`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,

    /// Challenge supplied by a verifier, used by authentication proofs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Domain the proof is restricted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Detached JWS signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,

    /// Legacy encoded signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_value: Option<String>,

    /// Multibase-encoded signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,

    /// Any other suite- or purpose-specific properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proof {
    /// The proof options view: a copy of the proof with every
    /// signature-bearing field removed. This is what gets canonicalized
    /// alongside the document.
    #[must_use]
    pub fn options(&self) -> Self {
        let mut options = Self {
            jws: None,
            signature_value: None,
            proof_value: None,
            ..self.clone()
        };
        for field in SIGNATURE_FIELDS {
            options.extra.remove(field);
        }
        options
    }

    /// Identifier of the verification method, preferring
    /// `verificationMethod` and falling back to the legacy `creator`.
    #[must_use]
    pub fn verification_method_id(&self) -> Option<&str> {
        let value = self.verification_method.as_ref().or(self.creator.as_ref())?;
        match value {
            Value::String(id) => Some(id),
            Value::Object(map) => map.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Serialize the proof to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Canonicalization`] if the proof cannot be serialized.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Canonicalization(e.to_string()))
    }

    /// Deserialize a proof from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the value is not a proof object.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Configuration(format!("invalid proof: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn options_strip_signatures() {
        let proof = Proof::from_value(json!({
            "type": "Ed25519Signature2020",
            "created": "2020-01-01T00:00:00Z",
            "verificationMethod": "did:example:1#key-1",
            "proofPurpose": "assertionMethod",
            "proofValue": "z3FXQ",
            "jws": "abc..def",
            "signatureValue": "xyz",
            "nonce": "42"
        }))
        .expect("should parse");

        let options = proof.options().to_value().expect("should serialize");
        assert_eq!(
            options,
            json!({
                "type": "Ed25519Signature2020",
                "created": "2020-01-01T00:00:00Z",
                "verificationMethod": "did:example:1#key-1",
                "proofPurpose": "assertionMethod",
                "nonce": "42"
            })
        );
    }

    #[test]
    fn identity_fallback() {
        let proof = Proof {
            creator: Some(json!("did:example:1#key-1")),
            ..Proof::default()
        };
        assert_eq!(proof.verification_method_id(), Some("did:example:1#key-1"));

        let proof = Proof {
            verification_method: Some(json!({"id": "did:example:2#key-1"})),
            creator: Some(json!("did:example:1#key-1")),
            ..Proof::default()
        };
        assert_eq!(proof.verification_method_id(), Some("did:example:2#key-1"));

        assert_eq!(Proof::default().verification_method_id(), None);
    }
}
