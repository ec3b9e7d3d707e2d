//! # Verification Methods
//!
//! A verification method is the node, usually found in a controller (DID)
//! document, describing the public key able to check a proof.
//!
//! Resolution loads the document the identifier points into (the identifier
//! with its fragment removed) and frames it so that exactly the node whose
//! `id` matches the identifier is returned, fully embedded. Revoked methods
//! are rejected before any signature work is attempted.

use anyhow::anyhow;
use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_ecc::{ED25519_CODEC, PublicKey, SECP256K1_CODEC};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::loader::DocumentLoader;

/// A resolved verification method.
///
/// Only `id` is required; unknown properties are kept in `extra` so that
/// evolving key vocabularies remain usable.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Contexts the method was framed with.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// The method identifier.
    pub id: String,

    /// Key type(s), e.g. `Ed25519VerificationKey2020`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<Value>,

    /// The entity controlling the key. `owner` is the legacy term.
    #[serde(alias = "owner", skip_serializing_if = "Option::is_none")]
    pub controller: Option<Value>,

    /// Raw public key, base58-btc encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,

    /// Public key, multibase encoded with a multicodec prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    /// Public key as a JWK.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Value>,

    /// Revocation marker (usually a timestamp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked: Option<Value>,

    /// Any other properties.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerificationMethod {
    /// The key types declared by the method.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        match &self.type_ {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
            _ => vec![],
        }
    }

    /// Identifier of the method's controller.
    #[must_use]
    pub fn controller_id(&self) -> Option<&str> {
        match self.controller.as_ref()? {
            Value::String(id) => Some(id),
            Value::Object(map) => map.get("id").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Whether the method carries a revocation marker.
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        self.revoked.is_some()
    }

    /// Decode the method's public key from whichever encoding it carries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyMismatch`] when no supported key encoding is
    /// present or the key cannot be decoded.
    pub fn public_key(&self) -> Result<PublicKey> {
        let key = if let Some(multibase) = &self.public_key_multibase {
            decode_multikey(multibase)
        } else if let Some(base58) = &self.public_key_base58 {
            multibase::decode(format!("z{base58}"))
                .map_err(|e| anyhow!("invalid base58 key: {e}"))
                .and_then(|(_, bytes)| PublicKey::from_slice(&bytes))
        } else if let Some(jwk) = &self.public_key_jwk {
            decode_jwk(jwk)
        } else {
            Err(anyhow!("no public key material"))
        };

        key.map_err(|e| Error::KeyMismatch(format!("{}: {e}", self.id)))
    }
}

fn decode_multikey(multibase: &str) -> anyhow::Result<PublicKey> {
    let (_, bytes) = multibase::decode(multibase).map_err(|e| anyhow!("invalid multibase: {e}"))?;
    let key = match bytes.len() {
        34 => bytes.strip_prefix(ED25519_CODEC.as_slice()),
        35 => bytes.strip_prefix(SECP256K1_CODEC.as_slice()),
        _ => None,
    };
    PublicKey::from_slice(key.unwrap_or(bytes.as_slice()))
}

fn decode_jwk(jwk: &Value) -> anyhow::Result<PublicKey> {
    let field = |name: &str| -> anyhow::Result<Vec<u8>> {
        let value =
            jwk.get(name).and_then(Value::as_str).ok_or_else(|| anyhow!("JWK missing `{name}`"))?;
        Base64UrlUnpadded::decode_vec(value).map_err(|e| anyhow!("invalid JWK `{name}`: {e}"))
    };

    match jwk.get("kty").and_then(Value::as_str) {
        Some("OKP") => PublicKey::from_slice(&field("x")?),
        Some("EC") => PublicKey::try_from((field("x")?.as_slice(), field("y")?.as_slice())),
        _ => Err(anyhow!("unsupported JWK key type")),
    }
}

/// Resolve a verification method by identifier.
///
/// `contexts` are the vocabularies the method is expressed in (the security
/// context plus any suite key context); they are recorded on the returned
/// method.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the identifier does not resolve to an
/// embedded node, [`Error::Revoked`] when the node is revoked, and
/// [`Error::Collaborator`] when the loader fails.
pub async fn resolve(
    loader: &impl DocumentLoader, id: &str, contexts: &[&str],
) -> Result<VerificationMethod> {
    let url = id.split('#').next().unwrap_or(id);
    let Some(document) = loader.load(url).await? else {
        return Err(Error::NotFound(format!("verification method {id}")));
    };
    let Some(node) = frame(&document, id) else {
        return Err(Error::NotFound(format!("verification method {id}")));
    };

    let mut method: VerificationMethod = serde_json::from_value(node)
        .map_err(|e| Error::NotFound(format!("verification method {id} is malformed: {e}")))?;
    method.context = Some(Value::Array(contexts.iter().map(|c| Value::from(*c)).collect()));

    if method.is_revoked() {
        return Err(Error::Revoked(id.to_string()));
    }
    Ok(method)
}

/// Find the node with the given identifier, fully embedded, anywhere in the
/// document. Relative (`#fragment`) identifiers are resolved against the
/// document's own `id`.
fn frame(document: &Value, id: &str) -> Option<Value> {
    let base = document.get("id").and_then(Value::as_str);
    find_node(document, id, base)
}

fn find_node(value: &Value, id: &str, base: Option<&str>) -> Option<Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = node_id(map, base)
                && found == id
                && map.keys().any(|k| k != "id" && k != "@id")
            {
                let mut node = map.clone();
                node.remove("@id");
                node.insert("id".to_string(), Value::String(found));
                return Some(Value::Object(node));
            }
            map.values().find_map(|v| find_node(v, id, base))
        }
        Value::Array(items) => items.iter().find_map(|v| find_node(v, id, base)),
        _ => None,
    }
}

fn node_id(map: &Map<String, Value>, base: Option<&str>) -> Option<String> {
    let id = map.get("id").or_else(|| map.get("@id")).and_then(Value::as_str)?;
    match (id.strip_prefix('#'), base) {
        (Some(fragment), Some(base)) => Some(format!("{base}#{fragment}")),
        _ => Some(id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn frames_embedded_node() {
        let document = json!({
            "id": "did:example:alice",
            "assertionMethod": ["did:example:alice#key-1"],
            "verificationMethod": [{
                "id": "#key-1",
                "type": "Ed25519VerificationKey2020",
                "controller": "did:example:alice",
                "publicKeyMultibase": "z6Mk"
            }]
        });

        let node = frame(&document, "did:example:alice#key-1").expect("should find node");
        assert_eq!(node["id"], "did:example:alice#key-1");
        assert_eq!(node["type"], "Ed25519VerificationKey2020");

        assert!(frame(&document, "did:example:alice#key-2").is_none());
    }

    #[test]
    fn skips_references() {
        let document = json!({
            "id": "did:example:bob",
            "authentication": [{"id": "did:example:bob#key-1"}]
        });
        assert!(frame(&document, "did:example:bob#key-1").is_none());
    }

    #[test]
    fn tolerant_of_extra_properties() {
        let method: VerificationMethod = serde_json::from_value(json!({
            "id": "did:example:1#key",
            "type": ["Ed25519VerificationKey2018", "Other"],
            "owner": "did:example:1",
            "somethingNew": {"a": 1}
        }))
        .expect("should parse");

        assert_eq!(method.types(), vec!["Ed25519VerificationKey2018", "Other"]);
        assert_eq!(method.controller_id(), Some("did:example:1"));
        assert!(method.extra.contains_key("somethingNew"));
        assert!(!method.is_revoked());
        assert_eq!(method.public_key().expect_err("no key").kind(), crate::ErrorKind::KeyMismatch);
    }

    #[test]
    fn decodes_jwk() {
        let method: VerificationMethod = serde_json::from_value(json!({
            "id": "did:example:1#key",
            "publicKeyJwk": {
                "kty": "OKP",
                "crv": "Ed25519",
                "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
            }
        }))
        .expect("should parse");

        let key = method.public_key().expect("should decode");
        assert_eq!(key.to_vec().len(), 32);
    }
}
