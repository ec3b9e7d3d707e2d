//! # Signature Suites
//!
//! Each suite variant binds the generic proof protocol to a signature
//! algorithm, the key types it accepts, its key vocabulary and the way the
//! signature is encoded on the proof. Variants never change how proofs are
//! assembled or verified; they supply only the leaf sign and verify
//! operations.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use credibil_ecc::{Algorithm, Signer};
use credibil_jose::DetachedJws;
use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::context::{ED25519_2018_CONTEXT_URL, ED25519_2020_CONTEXT_URL, SECP256K1_2019_CONTEXT_URL};
use crate::error::{Error, Result};
use crate::method::VerificationMethod;
use crate::proof::Proof;

/// Supported suite variants.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum SuiteType {
    /// Ed25519 signatures encoded as a detached JWS.
    Ed25519Signature2018,

    /// secp256k1 ECDSA signatures encoded as a detached JWS.
    EcdsaSecp256k1Signature2019,

    /// Ed25519 signatures encoded as a multibase `proofValue`.
    Ed25519Signature2020,
}

/// How a suite encodes its signature on the proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureEncoding {
    /// A compact JWS with a detached, unencoded payload in `jws`.
    DetachedJws,

    /// The raw signature, base58-btc multibase encoded, in `proofValue`.
    ProofValue,
}

impl SuiteType {
    /// The proof `type` label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ed25519Signature2018 => "Ed25519Signature2018",
            Self::EcdsaSecp256k1Signature2019 => "EcdsaSecp256k1Signature2019",
            Self::Ed25519Signature2020 => "Ed25519Signature2020",
        }
    }

    /// The signature algorithm.
    #[must_use]
    pub const fn algorithm(self) -> Algorithm {
        match self {
            Self::Ed25519Signature2018 | Self::Ed25519Signature2020 => Algorithm::EdDSA,
            Self::EcdsaSecp256k1Signature2019 => Algorithm::Es256K,
        }
    }

    /// Verification method types the suite accepts.
    #[must_use]
    pub const fn key_types(self) -> &'static [&'static str] {
        match self {
            Self::Ed25519Signature2018 => &["Ed25519VerificationKey2018"],
            Self::EcdsaSecp256k1Signature2019 => &["EcdsaSecp256k1VerificationKey2019"],
            Self::Ed25519Signature2020 => &["Ed25519VerificationKey2020"],
        }
    }

    /// The suite's key vocabulary.
    #[must_use]
    pub const fn key_context(self) -> &'static str {
        match self {
            Self::Ed25519Signature2018 => ED25519_2018_CONTEXT_URL,
            Self::EcdsaSecp256k1Signature2019 => SECP256K1_2019_CONTEXT_URL,
            Self::Ed25519Signature2020 => ED25519_2020_CONTEXT_URL,
        }
    }

    /// The signature encoding.
    #[must_use]
    pub const fn encoding(self) -> SignatureEncoding {
        match self {
            Self::Ed25519Signature2018 | Self::EcdsaSecp256k1Signature2019 => {
                SignatureEncoding::DetachedJws
            }
            Self::Ed25519Signature2020 => SignatureEncoding::ProofValue,
        }
    }

    /// Reject verification methods whose key type the suite cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyMismatch`] when none of the method's types are
    /// accepted.
    pub fn check_method(self, method: &VerificationMethod) -> Result<()> {
        let types = method.types();
        if self.key_types().iter().any(|t| types.contains(t)) {
            return Ok(());
        }
        Err(Error::KeyMismatch(format!(
            "{} requires one of {:?}, found {types:?}",
            self.label(),
            self.key_types()
        )))
    }

    /// Sign the verify data, writing the signature to the proof.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the signer uses a different
    /// algorithm, or [`Error::Collaborator`] when signing fails.
    pub async fn sign(self, verify_data: &[u8], proof: &mut Proof, signer: &impl Signer) -> Result<()> {
        if signer.algorithm() != self.algorithm() {
            return Err(Error::Configuration(format!(
                "{} requires a {} signer, found {}",
                self.label(),
                self.algorithm(),
                signer.algorithm()
            )));
        }

        match self.encoding() {
            SignatureEncoding::DetachedJws => {
                let jws = credibil_jose::jws::sign(verify_data, signer).await?;
                proof.jws = Some(jws.to_string());
            }
            SignatureEncoding::ProofValue => {
                let signature = signer.try_sign(verify_data).await?;
                proof.proof_value = Some(multibase::encode(Base::Base58Btc, signature));
            }
        }
        Ok(())
    }

    /// Verify the proof's signature over the verify data.
    ///
    /// Returns `Ok(false)` when the signature does not verify.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureInvalid`] when the proof carries no (or an
    /// unreadable) signature for the suite's encoding or its JWS header is
    /// malformed, [`Error::UnsupportedOperation`] when the JWS names another
    /// algorithm, and [`Error::KeyMismatch`] when the method's key is
    /// unusable.
    pub fn verify_signature(
        self, verify_data: &[u8], proof: &Proof, method: &VerificationMethod,
    ) -> Result<bool> {
        let public_key = method.public_key()?;

        match self.encoding() {
            SignatureEncoding::DetachedJws => {
                let Some(jws) = &proof.jws else {
                    return Err(Error::SignatureInvalid);
                };
                let jws: DetachedJws = jws.parse().map_err(|_| Error::SignatureInvalid)?;
                jws.check_header().map_err(|_| Error::SignatureInvalid)?;
                if jws.protected().alg != self.algorithm() {
                    return Err(Error::UnsupportedOperation(format!(
                        "{} cannot verify {} signatures",
                        self.label(),
                        jws.protected().alg
                    )));
                }
                jws.verify(verify_data, &public_key).map_err(|e| Error::KeyMismatch(e.to_string()))
            }
            SignatureEncoding::ProofValue => {
                let Some(proof_value) = &proof.proof_value else {
                    return Err(Error::SignatureInvalid);
                };
                let (base, signature) =
                    multibase::decode(proof_value).map_err(|_| Error::SignatureInvalid)?;
                if base != Base::Base58Btc {
                    return Err(Error::SignatureInvalid);
                }
                self.algorithm()
                    .verify(verify_data, &signature, &public_key)
                    .map_err(|e| Error::KeyMismatch(e.to_string()))
            }
        }
    }
}

impl Display for SuiteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SuiteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Ed25519Signature2018" => Ok(Self::Ed25519Signature2018),
            "EcdsaSecp256k1Signature2019" => Ok(Self::EcdsaSecp256k1Signature2019),
            "Ed25519Signature2020" => Ok(Self::Ed25519Signature2020),
            _ => Err(Error::UnsupportedOperation(format!("unknown suite `{s}`"))),
        }
    }
}

/// Caller-built table of the suites accepted when verifying proof sets,
/// keyed by proof `type`.
#[derive(Clone, Debug, Default)]
pub struct SuiteTable {
    suites: HashMap<String, SuiteType>,
}

impl SuiteTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept proofs produced by the suite.
    #[must_use]
    pub fn register(mut self, suite: SuiteType) -> Self {
        self.suites.insert(suite.label().to_string(), suite);
        self
    }

    /// The suite registered for a proof `type`.
    #[must_use]
    pub fn get(&self, proof_type: &str) -> Option<SuiteType> {
        self.suites.get(proof_type).copied()
    }
}

impl FromIterator<SuiteType> for SuiteTable {
    fn from_iter<I: IntoIterator<Item = SuiteType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::register)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_type_check() {
        let method: VerificationMethod = serde_json::from_value(json!({
            "id": "did:example:1#key",
            "type": "Ed25519VerificationKey2018"
        }))
        .expect("should parse");

        assert!(SuiteType::Ed25519Signature2018.check_method(&method).is_ok());
        let err = SuiteType::Ed25519Signature2020.check_method(&method).expect_err("mismatch");
        assert_eq!(err.kind(), crate::ErrorKind::KeyMismatch);
    }

    #[test]
    fn table() {
        let table: SuiteTable =
            [SuiteType::Ed25519Signature2020, SuiteType::EcdsaSecp256k1Signature2019]
                .into_iter()
                .collect();

        assert_eq!(table.get("Ed25519Signature2020"), Some(SuiteType::Ed25519Signature2020));
        assert_eq!(table.get("Ed25519Signature2018"), None);
        assert_eq!(
            "EcdsaSecp256k1Signature2019".parse::<SuiteType>().expect("should parse"),
            SuiteType::EcdsaSecp256k1Signature2019
        );
    }
}
