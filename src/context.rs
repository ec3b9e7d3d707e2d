//! # Vocabulary Contexts
//!
//! Proofs and verification methods are expressed against the security
//! vocabulary. Two versions of the security context are supported for
//! backward compatibility, plus the key contexts of individual suites.
//!
//! Proof templates supplied by callers may use expanded IRIs or `sec:`/`dc:`
//! compact IRIs for proof terms; [`compact`] rewrites them to the plain terms
//! of the native context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Security vocabulary, version 1.
pub const SECURITY_CONTEXT_V1_URL: &str = "https://w3id.org/security/v1";

/// Security vocabulary, version 2.
pub const SECURITY_CONTEXT_V2_URL: &str = "https://w3id.org/security/v2";

/// Ed25519 2018 suite key vocabulary.
pub const ED25519_2018_CONTEXT_URL: &str = "https://w3id.org/security/suites/ed25519-2018/v1";

/// Ed25519 2020 suite key vocabulary.
pub const ED25519_2020_CONTEXT_URL: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// secp256k1 2019 suite key vocabulary.
pub const SECP256K1_2019_CONTEXT_URL: &str = "https://w3id.org/security/suites/secp256k1-2019/v1";

const SECURITY_VOCAB: &str = "https://w3id.org/security#";
const DC_TERMS: &str = "http://purl.org/dc/terms/";

// Proof properties whose values are themselves vocabulary terms.
const TERM_VALUED: [&str; 2] = ["type", "proofPurpose"];

/// Security context version a proof is scoped to.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Context {
    /// `https://w3id.org/security/v1`
    #[serde(rename = "https://w3id.org/security/v1")]
    V1,

    /// `https://w3id.org/security/v2`
    #[default]
    #[serde(rename = "https://w3id.org/security/v2")]
    V2,
}

impl Context {
    /// The context URL.
    #[must_use]
    pub const fn url(self) -> &'static str {
        match self {
            Self::V1 => SECURITY_CONTEXT_V1_URL,
            Self::V2 => SECURITY_CONTEXT_V2_URL,
        }
    }
}

/// Whether a document `@context` value includes the given context URL.
#[must_use]
pub fn includes(context: &Value, url: &str) -> bool {
    match context {
        Value::String(s) => s == url,
        Value::Array(items) => items.iter().any(|c| c.as_str() == Some(url)),
        _ => false,
    }
}

/// Compact a proof template into the plain terms of the native context.
///
/// The template's own `@context` is dropped; the caller scopes the result.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when the template is not a JSON object.
pub fn compact(template: &Value) -> Result<Map<String, Value>> {
    let Value::Object(template) = template else {
        return Err(Error::Configuration("proof template must be an object".into()));
    };

    let mut compacted = Map::new();
    for (key, value) in template {
        if key == "@context" {
            continue;
        }
        let term = compact_term(key);
        let value = compact_value(value, TERM_VALUED.contains(&term.as_str()));
        compacted.insert(term, value);
    }
    Ok(compacted)
}

fn compact_term(term: &str) -> String {
    let term = match term {
        "@type" => "type",
        "@id" => "id",
        _ => term,
    };

    term.strip_prefix(SECURITY_VOCAB)
        .or_else(|| term.strip_prefix("sec:"))
        .or_else(|| term.strip_prefix(DC_TERMS))
        .or_else(|| term.strip_prefix("dc:"))
        .unwrap_or(term)
        .to_string()
}

fn compact_value(value: &Value, is_term: bool) -> Value {
    match value {
        // single-element arrays compact to the element
        Value::Array(items) if items.len() == 1 => compact_value(&items[0], is_term),
        Value::Object(map) => {
            if let Some(v) = map.get("@value") {
                return v.clone();
            }
            if map.len() == 1
                && let Some(id) = map.get("@id")
            {
                return id.clone();
            }
            value.clone()
        }
        Value::String(s) if is_term => Value::String(compact_term(s)),
        _ => value.clone(),
    }
}
