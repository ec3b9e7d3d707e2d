//! Key pairs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::{Curve, PublicKey, SecretKey};
use crate::sign::{Algorithm, Signer};

/// A signing key pair held in memory.
#[derive(Clone, Debug, Deserialize, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct Keypair {
    #[zeroize(skip)]
    curve: Curve,
    secret_key: SecretKey,
}

impl Keypair {
    /// Generate a new key pair on the given curve.
    #[must_use]
    pub fn generate(curve: Curve) -> Self {
        let secret_key = curve.generate();
        Self { curve, secret_key }
    }

    /// Build a key pair from existing secret key material.
    #[must_use]
    pub const fn from_secret(curve: Curve, secret_key: SecretKey) -> Self {
        Self { curve, secret_key }
    }

    /// The curve the key pair belongs to.
    #[must_use]
    pub const fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Derive the public key.
    ///
    /// # Errors
    /// Returns an error if the secret key is not valid for the curve.
    pub fn public_key(&self) -> Result<PublicKey> {
        match self.curve {
            Curve::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::from(&self.secret_key);
                Ok(signing_key.verifying_key().into())
            }
            Curve::Es256K => {
                let secret_key = k256::SecretKey::from_slice(self.secret_key.as_bytes())
                    .map_err(|e| anyhow::anyhow!("issue parsing secret key: {e}"))?;
                Ok(secret_key.public_key().into())
            }
        }
    }
}

impl Signer for Keypair {
    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        self.algorithm().try_sign(msg, &self.secret_key)
    }

    async fn verifying_key(&self) -> Result<PublicKey> {
        self.public_key()
    }

    fn algorithm(&self) -> Algorithm {
        match self.curve {
            Curve::Ed25519 => Algorithm::EdDSA,
            Curve::Es256K => Algorithm::Es256K,
        }
    }
}
