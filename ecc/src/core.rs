//! # Primitive Cryptography Types

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use base64ct::{Base64UrlUnpadded, Encoding};
pub use ed25519_dalek::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Prefix bytes (tag) to indicate a full public key.
pub const TAG_PUBKEY_FULL: u8 = 0x04;

/// Prefix bytes to indicate Ed25519 multibase encoding.
pub const ED25519_CODEC: [u8; 2] = [0xed, 0x01];

/// Prefix bytes to indicate secp256k1 multibase encoding.
pub const SECP256K1_CODEC: [u8; 2] = [0xe7, 0x01];

/// Cryptographic curve type.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub enum Curve {
    /// Ed25519 signature (DSA) key pairs.
    #[default]
    Ed25519,

    /// secp256k1 curve.
    #[serde(rename = "ES256K", alias = "secp256k1")]
    Es256K,
}

impl Curve {
    /// Generate a new secret key for the curve.
    #[must_use]
    pub fn generate(&self) -> SecretKey {
        match self {
            Self::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
                SecretKey(signing_key.to_bytes())
            }
            Self::Es256K => {
                let secret_key = k256::SecretKey::random(&mut OsRng);
                SecretKey(secret_key.to_bytes().into())
            }
        }
    }
}

impl Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "Ed25519"),
            Self::Es256K => write!(f, "ES256K"),
        }
    }
}

/// A secret key used to sign a payload.
///
/// Wiped from memory when dropped.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop, Deserialize, Serialize)]
pub struct SecretKey([u8; SECRET_KEY_LENGTH]);

impl SecretKey {
    /// Return the secret key as a byte slice.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.0
    }

    /// Return the secret key as a byte array.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.0
    }
}

impl From<[u8; SECRET_KEY_LENGTH]> for SecretKey {
    fn from(val: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self(val)
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = anyhow::Error;

    fn try_from(val: &[u8]) -> Result<Self> {
        let bytes: [u8; SECRET_KEY_LENGTH] =
            val.try_into().map_err(|_| anyhow!("invalid secret key length"))?;
        Ok(Self(bytes))
    }
}

impl FromStr for SecretKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = Base64UrlUnpadded::decode_vec(s)?;
        Self::try_from(decoded.as_slice())
    }
}

impl TryFrom<&SecretKey> for ecdsa::SigningKey<k256::Secp256k1> {
    type Error = anyhow::Error;

    fn try_from(key: &SecretKey) -> Result<Self, Self::Error> {
        Self::from_slice(&key.0).map_err(|e| anyhow!("issue parsing secret key: {e}"))
    }
}

impl From<&SecretKey> for ed25519_dalek::SigningKey {
    fn from(key: &SecretKey) -> Self {
        Self::from_bytes(&key.0)
    }
}

/// The public key of a signing key pair.
///
/// Edwards keys carry only `x`; secp256k1 keys carry both coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    x: [u8; 32],
    y: Option<[u8; 32]>,
}

impl PublicKey {
    /// Return the public key as bytes: the raw 32-byte key for Edwards keys
    /// or the uncompressed SEC1 encoding for secp256k1 keys.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let Some(y) = &self.y else {
            return self.x.to_vec();
        };

        let mut key = [0; 65];
        key[0] = TAG_PUBKEY_FULL;
        key[1..33].copy_from_slice(&self.x);
        key[33..65].copy_from_slice(y);
        key.to_vec()
    }

    /// The `x` coordinate (or the whole key for Edwards keys).
    #[must_use]
    pub const fn x(&self) -> &[u8; 32] {
        &self.x
    }

    /// The `y` coordinate, when present.
    #[must_use]
    pub const fn y(&self) -> Option<&[u8; 32]> {
        self.y.as_ref()
    }

    /// Parse a public key from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns an error when the slice is not a raw Edwards key or a valid
    /// SEC1-encoded secp256k1 key.
    pub fn from_slice(val: &[u8]) -> Result<Self> {
        Self::try_from(val)
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(val: [u8; 32]) -> Self {
        Self { x: val, y: None }
    }
}

impl From<ed25519_dalek::VerifyingKey> for PublicKey {
    fn from(val: ed25519_dalek::VerifyingKey) -> Self {
        Self {
            x: val.to_bytes(),
            y: None,
        }
    }
}

impl From<k256::PublicKey> for PublicKey {
    fn from(val: k256::PublicKey) -> Self {
        let point = val.to_encoded_point(false);
        let mut x = [0; 32];
        let mut y = [0; 32];
        x.copy_from_slice(&point.as_bytes()[1..33]);
        y.copy_from_slice(&point.as_bytes()[33..65]);
        Self { x, y: Some(y) }
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = anyhow::Error;

    fn try_from(val: &[u8]) -> Result<Self> {
        match val.len() {
            32 => {
                let mut x = [0; 32];
                x.copy_from_slice(val);
                Ok(Self { x, y: None })
            }
            // compressed or uncompressed SEC1
            33 | 65 => {
                let key = k256::PublicKey::from_sec1_bytes(val)
                    .map_err(|e| anyhow!("invalid secp256k1 public key: {e}"))?;
                Ok(key.into())
            }
            _ => Err(anyhow!("invalid public key length")),
        }
    }
}

impl TryFrom<(&[u8], &[u8])> for PublicKey {
    type Error = anyhow::Error;

    fn try_from(val: (&[u8], &[u8])) -> Result<Self> {
        if val.0.len() != 32 || val.1.len() != 32 {
            return Err(anyhow!("invalid public key length"));
        }

        let mut x = [0; 32];
        let mut y = [0; 32];
        x.copy_from_slice(val.0);
        y.copy_from_slice(val.1);
        Ok(Self { x, y: Some(y) })
    }
}

impl TryFrom<PublicKey> for ecdsa::VerifyingKey<k256::Secp256k1> {
    type Error = anyhow::Error;

    fn try_from(val: PublicKey) -> Result<Self> {
        if val.y.is_none() {
            return Err(anyhow!("'y' is invalid"));
        }
        Self::from_sec1_bytes(&val.to_vec())
            .map_err(|e| anyhow!("unable to build verifying key: {e}"))
    }
}

impl TryFrom<PublicKey> for ed25519_dalek::VerifyingKey {
    type Error = anyhow::Error;

    fn try_from(val: PublicKey) -> Result<Self> {
        Self::from_bytes(&val.x).map_err(|e| anyhow!("unable to build verifying key: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secp256k1_compressed_and_uncompressed() {
        let secret = k256::SecretKey::random(&mut OsRng);
        let public = secret.public_key();

        let compressed = public.to_encoded_point(true);
        let uncompressed = public.to_encoded_point(false);

        let from_compressed =
            PublicKey::from_slice(compressed.as_bytes()).expect("should parse compressed");
        let from_uncompressed =
            PublicKey::from_slice(uncompressed.as_bytes()).expect("should parse uncompressed");

        assert_eq!(from_compressed, from_uncompressed);
        assert_eq!(from_compressed.to_vec(), uncompressed.as_bytes().to_vec());
    }

    #[test]
    fn bad_length() {
        assert!(PublicKey::from_slice(&[0u8; 31]).is_err());
        assert!(SecretKey::try_from([0u8; 16].as_slice()).is_err());
    }
}
