//! # JSON Web Signature (JWS)
//!
//! JWS ([RFC7515]) represents content secured with digital signatures using
//! JSON-based data structures. Cryptographic algorithms and identifiers for use
//! with this specification are described in the JWA ([RFC7518]) specification.
//!
//! Tokens produced here use the detached compact form (`header..signature`)
//! with the unencoded payload option ([RFC7797]): the signing input is the
//! base64url-encoded protected header, a `.`, and the raw payload bytes.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518
//! [RFC7797]: https://www.rfc-editor.org/rfc/rfc7797

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_ecc::{Algorithm, PublicKey, Signer};
use serde::{Deserialize, Serialize};

/// Sign the payload, returning a detached JWS in compact form.
///
/// # Errors
///
/// Returns an error if the header cannot be serialized or the signer fails.
pub async fn sign(payload: &[u8], signer: &impl Signer) -> Result<DetachedJws> {
    tracing::debug!("jws::sign");

    let protected = Protected::new(signer.algorithm());
    let header = Base64UrlUnpadded::encode_string(&serde_json::to_vec(&protected)?);
    let signature = signer.try_sign(&signing_input(&header, payload)).await?;

    Ok(DetachedJws {
        header,
        protected,
        signature,
    })
}

/// The JWS signing input for an unencoded payload.
fn signing_input(header: &str, payload: &[u8]) -> Vec<u8> {
    [header.as_bytes(), b".".as_slice(), payload].concat()
}

/// A compact JWS with a detached, unencoded payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetachedJws {
    // encoded header, kept verbatim as it forms part of the signing input
    header: String,
    protected: Protected,
    signature: Vec<u8>,
}

impl DetachedJws {
    /// The decoded protected header.
    #[must_use]
    pub const fn protected(&self) -> &Protected {
        &self.protected
    }

    /// The raw signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Check the header describes an unencoded payload: `b64` is `false` and
    /// `crit` is exactly `["b64"]` ([RFC7797] section 6).
    ///
    /// [RFC7797]: https://www.rfc-editor.org/rfc/rfc7797
    ///
    /// # Errors
    ///
    /// Returns an error describing the offending header parameter.
    pub fn check_header(&self) -> Result<()> {
        if self.protected.b64 {
            bail!("JWS header must set `b64` to false");
        }
        if self.protected.crit != ["b64"] {
            bail!("JWS header `crit` must be exactly [\"b64\"]");
        }
        Ok(())
    }

    /// Verify the signature over the detached payload.
    ///
    /// Returns `Ok(false)` when the signature does not match.
    ///
    /// # Errors
    ///
    /// Returns an error when the header does not describe an unencoded
    /// payload or when the public key is unusable for the header's algorithm.
    pub fn verify(&self, payload: &[u8], public_key: &PublicKey) -> Result<bool> {
        self.check_header()?;
        let msg = signing_input(&self.header, payload);
        self.protected.alg.verify(&msg, &self.signature, public_key)
    }
}

impl Display for DetachedJws {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let signature = Base64UrlUnpadded::encode_string(&self.signature);
        write!(f, "{}..{signature}", self.header)
    }
}

impl FromStr for DetachedJws {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s.split('.').collect::<Vec<&str>>();
        if parts.len() != 3 || !parts[1].is_empty() {
            bail!("invalid detached JWS format");
        }

        let decoded = Base64UrlUnpadded::decode_vec(parts[0])
            .map_err(|e| anyhow!("issue decoding header: {e}"))?;
        let protected = serde_json::from_slice(&decoded)
            .map_err(|e| anyhow!("issue deserializing header: {e}"))?;
        let signature = Base64UrlUnpadded::decode_vec(parts[2])
            .map_err(|e| anyhow!("issue decoding signature: {e}"))?;

        Ok(Self {
            header: parts[0].to_string(),
            protected,
            signature,
        })
    }
}

/// JWS protected header for detached, unencoded payloads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Protected {
    /// Digital signature algorithm identifier as per IANA "JSON Web Signature
    /// and Encryption Algorithms" registry.
    pub alg: Algorithm,

    /// Whether the payload is base64url-encoded. Always `false` for Linked
    /// Data proofs.
    #[serde(default = "default_b64")]
    pub b64: bool,

    /// Header parameters that must be understood by the verifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crit: Vec<String>,
}

const fn default_b64() -> bool {
    true
}

impl Protected {
    /// Create a header for the algorithm with an unencoded payload.
    #[must_use]
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg,
            b64: false,
            crit: vec!["b64".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use credibil_ecc::{Curve, Keypair};

    use super::*;

    #[tokio::test]
    async fn detached_round_trip() {
        let keypair = Keypair::generate(Curve::Ed25519);
        let public_key = keypair.public_key().expect("should get public key");

        let jws = sign(b"verify data", &keypair).await.expect("should sign");
        let compact = jws.to_string();
        assert!(compact.contains(".."));

        let parsed: DetachedJws = compact.parse().expect("should parse");
        assert_eq!(parsed.protected().alg, Algorithm::EdDSA);
        assert!(parsed.verify(b"verify data", &public_key).expect("should verify"));
        assert!(!parsed.verify(b"other data", &public_key).expect("should verify"));
    }

    #[tokio::test]
    async fn es256k_header() {
        let keypair = Keypair::generate(Curve::Es256K);
        let public_key = keypair.public_key().expect("should get public key");

        let jws = sign(b"verify data", &keypair).await.expect("should sign");
        let header = jws.to_string().split('.').next().map(ToString::to_string).unwrap();
        let decoded = Base64UrlUnpadded::decode_vec(&header).expect("should decode");
        let json: serde_json::Value = serde_json::from_slice(&decoded).expect("should parse");

        assert_eq!(json, serde_json::json!({"alg": "ES256K", "b64": false, "crit": ["b64"]}));
        assert!(jws.verify(b"verify data", &public_key).expect("should verify"));
    }

    #[test]
    fn attached_rejected() {
        assert!("a.b.c".parse::<DetachedJws>().is_err());
        assert!("a..".parse::<DetachedJws>().is_err());
    }

    #[tokio::test]
    async fn encoded_payload_rejected() {
        let keypair = Keypair::generate(Curve::Ed25519);
        let public_key = keypair.public_key().expect("should get public key");

        let protected = Protected {
            alg: Algorithm::EdDSA,
            b64: true,
            crit: vec![],
        };
        let header =
            Base64UrlUnpadded::encode_string(&serde_json::to_vec(&protected).expect("serialize"));
        let sig = keypair.try_sign(&signing_input(&header, b"data")).await.expect("should sign");
        let jws = DetachedJws {
            header,
            protected,
            signature: sig,
        };

        jws.verify(b"data", &public_key).expect_err("should reject encoded payload");
    }

    #[tokio::test]
    async fn crit_must_list_b64() {
        let keypair = Keypair::generate(Curve::Ed25519);
        let public_key = keypair.public_key().expect("should get public key");

        for crit in [vec![], vec!["b64".to_string(), "exp".to_string()]] {
            let protected = Protected {
                alg: Algorithm::EdDSA,
                b64: false,
                crit,
            };
            let header = Base64UrlUnpadded::encode_string(
                &serde_json::to_vec(&protected).expect("serialize"),
            );
            let sig =
                keypair.try_sign(&signing_input(&header, b"data")).await.expect("should sign");
            let jws = DetachedJws {
                header,
                protected,
                signature: sig,
            };

            jws.check_header().expect_err("should reject header");
            jws.verify(b"data", &public_key).expect_err("should reject header");
        }
    }
}
