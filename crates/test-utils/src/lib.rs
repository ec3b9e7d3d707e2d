//! # Test Utilities
//!
//! An in-memory [`DocumentLoader`] and controller (DID) document fixtures
//! for exercising proof creation and verification.

use std::sync::Arc;

use anyhow::Result;
use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_ecc::{Curve, ED25519_CODEC, Keypair, PublicKey};
use credibil_ldp::{DocumentLoader, SuiteType};
use dashmap::DashMap;
use multibase::Base;
use serde_json::{Value, json};

const DID_CONTEXT_URL: &str = "https://www.w3.org/ns/did/v1";

/// Document loader serving documents from memory.
#[derive(Clone, Debug, Default)]
pub struct Loader {
    documents: Arc<DashMap<String, Value>>,
}

impl Loader {
    /// An empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `url`, replacing any existing document.
    pub fn insert(&self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }

    /// Serve the controller document of `controller` at its DID.
    pub fn add_controller(&self, controller: &Controller) {
        self.insert(controller.did.clone(), controller.document());
    }
}

impl DocumentLoader for Loader {
    async fn load(&self, url: &str) -> Result<Option<Value>> {
        Ok(self.documents.get(url).map(|entry| entry.value().clone()))
    }
}

/// A DID controller holding one key pair, described in the key vocabulary of
/// a suite.
#[derive(Clone, Debug)]
pub struct Controller {
    /// The controller's DID.
    pub did: String,

    /// The controller's signing key pair.
    pub keypair: Keypair,

    /// The suite the key is described for.
    pub suite: SuiteType,

    public_key: PublicKey,
}

impl Controller {
    /// Generate a controller with a fresh key pair suited to `suite`.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key cannot be derived.
    pub fn new(did: impl Into<String>, suite: SuiteType) -> Result<Self> {
        let curve = match suite {
            SuiteType::Ed25519Signature2018 | SuiteType::Ed25519Signature2020 => Curve::Ed25519,
            SuiteType::EcdsaSecp256k1Signature2019 => Curve::Es256K,
        };
        let keypair = Keypair::generate(curve);
        let public_key = keypair.public_key()?;

        Ok(Self {
            did: did.into(),
            keypair,
            suite,
            public_key,
        })
    }

    /// Identifier of the controller's verification method.
    #[must_use]
    pub fn key_id(&self) -> String {
        format!("{}#key-1", self.did)
    }

    /// The verification method node, with the public key in the suite's
    /// preferred encoding.
    #[must_use]
    pub fn method(&self) -> Value {
        let mut method = json!({
            "id": self.key_id(),
            "type": self.suite.key_types()[0],
            "controller": self.did,
        });

        match self.suite {
            SuiteType::Ed25519Signature2018 => {
                let encoded = multibase::encode(Base::Base58Btc, self.public_key.to_vec());
                method["publicKeyBase58"] = json!(encoded.strip_prefix('z'));
            }
            SuiteType::Ed25519Signature2020 => {
                let bytes = [ED25519_CODEC.as_slice(), self.public_key.x().as_slice()].concat();
                method["publicKeyMultibase"] = json!(multibase::encode(Base::Base58Btc, bytes));
            }
            SuiteType::EcdsaSecp256k1Signature2019 => {
                let y = self.public_key.y().map(|y| Base64UrlUnpadded::encode_string(y));
                method["publicKeyJwk"] = json!({
                    "kty": "EC",
                    "crv": "secp256k1",
                    "x": Base64UrlUnpadded::encode_string(self.public_key.x()),
                    "y": y,
                });
            }
        }
        method
    }

    /// The controller document, listing the method (by relative id) for
    /// `assertionMethod` and (by absolute id) for `authentication`.
    #[must_use]
    pub fn document(&self) -> Value {
        self.document_with(self.method())
    }

    /// The controller document with its verification method revoked.
    #[must_use]
    pub fn revoked_document(&self) -> Value {
        let mut method = self.method();
        method["revoked"] = json!("2020-01-01T00:00:00Z");
        self.document_with(method)
    }

    /// The controller document without any purpose relationships.
    #[must_use]
    pub fn unauthorized_document(&self) -> Value {
        json!({
            "@context": [DID_CONTEXT_URL, self.suite.key_context()],
            "id": self.did,
            "verificationMethod": [self.method()],
        })
    }

    fn document_with(&self, mut method: Value) -> Value {
        method["id"] = json!("#key-1");
        json!({
            "@context": [DID_CONTEXT_URL, self.suite.key_context()],
            "id": self.did,
            "verificationMethod": [method],
            "assertionMethod": ["#key-1"],
            "authentication": [self.key_id()],
        })
    }
}

/// A sample credential-like document.
#[must_use]
pub fn document() -> Value {
    json!({
        "@context": [
            "https://www.w3.org/2018/credentials/v1",
            "https://w3id.org/security/v2"
        ],
        "id": "urn:uuid:7d1c2f3e-5b7a-4a0e-9a51-0c6f3f8b8d11",
        "type": ["VerifiableCredential"],
        "issuer": "did:example:issuer",
        "credentialSubject": {
            "id": "did:example:subject",
            "name": "Alice",
            "degree": {"type": "BachelorDegree", "name": "Bachelor of Science"}
        }
    })
}
