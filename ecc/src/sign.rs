//! # Signing

use std::fmt::Display;
use std::future::Future;

use anyhow::{Result, anyhow};
use ecdsa::signature::{Signer as _, Verifier as _};
use serde::{Deserialize, Serialize};

use crate::core::{PublicKey, SecretKey};

/// The signing algorithm used by the signer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum Algorithm {
    /// Algorithm for the secp256k1 curve
    #[serde(rename = "ES256K")]
    Es256K,

    /// Algorithm for the Ed25519 curve
    #[default]
    #[serde(rename = "EdDSA")]
    EdDSA,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Es256K => write!(f, "ES256K"),
            Self::EdDSA => write!(f, "EdDSA"),
        }
    }
}

impl Algorithm {
    /// Sign a message with the provided secret key.
    ///
    /// # Errors
    /// Will return an error if the secret key is not valid for the algorithm.
    pub fn try_sign(&self, msg: &[u8], secret_key: &SecretKey) -> Result<Vec<u8>> {
        match self {
            Self::Es256K => {
                let signing_key = ecdsa::SigningKey::<k256::Secp256k1>::try_from(secret_key)?;
                let signature: ecdsa::Signature<k256::Secp256k1> = signing_key
                    .try_sign(msg)
                    .map_err(|e| anyhow!("issue signing message: {e}"))?;
                Ok(signature.to_bytes().to_vec())
            }
            Self::EdDSA => {
                let signing_key = ed25519_dalek::SigningKey::from(secret_key);
                Ok(signing_key.sign(msg).to_bytes().to_vec())
            }
        }
    }

    /// Verify the signature of a signed message.
    ///
    /// Returns `Ok(false)` when the signature does not verify (including a
    /// signature of the wrong shape for the algorithm).
    ///
    /// # Errors
    /// Will return an error if the verifying key is not correct for the type
    /// of algorithm.
    pub fn verify(&self, msg: &[u8], sig: &[u8], public_key: &PublicKey) -> Result<bool> {
        match self {
            Self::Es256K => {
                let verifying_key = ecdsa::VerifyingKey::<k256::Secp256k1>::try_from(*public_key)?;
                let Ok(signature) = ecdsa::Signature::<k256::Secp256k1>::from_slice(sig) else {
                    return Ok(false);
                };
                let normalized = signature.normalize_s().unwrap_or(signature);
                Ok(verifying_key.verify(msg, &normalized).is_ok())
            }
            Self::EdDSA => {
                if public_key.y().is_some() {
                    return Err(anyhow!("EdDSA requires an Edwards public key"));
                }
                let verifying_key = ed25519_dalek::VerifyingKey::try_from(*public_key)?;
                let Ok(signature) = ed25519_dalek::Signature::from_slice(sig) else {
                    return Ok(false);
                };
                Ok(verifying_key.verify(msg, &signature).is_ok())
            }
        }
    }
}

/// Signer is used by implementers to provide signing functionality for
/// Linked Data Proof creation.
pub trait Signer: Send + Sync {
    /// `TrySign` signs the message, returning the raw signature bytes.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// The verifying key (public key) from the signing keypair.
    ///
    /// The possibility of key rotation mean this key should only be referenced
    /// at the point of verifying a signature.
    fn verifying_key(&self) -> impl Future<Output = Result<PublicKey>> + Send;

    /// Signature algorithm used by the signer.
    fn algorithm(&self) -> Algorithm;
}

impl<T: Signer> Signer for &T {
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send {
        (**self).try_sign(msg)
    }

    fn verifying_key(&self) -> impl Future<Output = Result<PublicKey>> + Send {
        (**self).verifying_key()
    }

    fn algorithm(&self) -> Algorithm {
        (**self).algorithm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Curve;
    use crate::keypair::Keypair;

    #[tokio::test]
    async fn eddsa() {
        let keypair = Keypair::generate(Curve::Ed25519);
        let sig = keypair.try_sign(b"hello").await.expect("should sign");
        let public_key = keypair.verifying_key().await.expect("should get key");

        let valid = Algorithm::EdDSA.verify(b"hello", &sig, &public_key).expect("should verify");
        assert!(valid);

        let valid = Algorithm::EdDSA.verify(b"hellp", &sig, &public_key).expect("should verify");
        assert!(!valid);
    }

    #[tokio::test]
    async fn es256k() {
        let keypair = Keypair::generate(Curve::Es256K);
        let sig = keypair.try_sign(b"hello").await.expect("should sign");
        let public_key = keypair.verifying_key().await.expect("should get key");

        let valid = Algorithm::Es256K.verify(b"hello", &sig, &public_key).expect("should verify");
        assert!(valid);

        let valid = Algorithm::Es256K.verify(b"hello", &sig[..10], &public_key).expect("should run");
        assert!(!valid);
    }

    #[tokio::test]
    async fn wrong_key_type() {
        let keypair = Keypair::generate(Curve::Es256K);
        let sig = keypair.try_sign(b"hello").await.expect("should sign");
        let public_key = keypair.verifying_key().await.expect("should get key");

        Algorithm::EdDSA.verify(b"hello", &sig, &public_key).expect_err("should reject key");
    }
}
