//! secp256k1 public keys and their prefixed string form.
//!
//! The all-zero 33-byte encoding is the null key ("no key"). It is never
//! handed to curve decoding: every parse path maps it to [`PublicKey::null`]
//! and every encode path writes it back out unchanged.

use crate::config::DEFAULT_ADDRESS_PREFIX;
use crate::crypto::hash::{ripemd160_checksum, sha256_of};
use crate::crypto::signature::Signature;
use crate::crypto::traits::Verifier;
use crate::error::{AuthError, AuthResult};
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compressed SEC1 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 33;
/// Uncompressed SEC1 public key length in bytes.
pub const PUBLIC_KEY_UNCOMPRESSED_LENGTH: usize = 65;

const NULL_KEY_BYTES: [u8; PUBLIC_KEY_LENGTH] = [0u8; PUBLIC_KEY_LENGTH];

/// A secp256k1 public key, or the null key.
///
/// Equality compares curve points; the compression flag only affects how the
/// key is serialized.
///
/// # Example
///
/// ```rust
/// use steem_auth::crypto::{PrivateKey, PublicKey};
///
/// let public_key = PrivateKey::generate().public_key();
/// let encoded = public_key.to_string();
/// assert!(encoded.starts_with("STM"));
/// assert_eq!(encoded.parse::<PublicKey>().unwrap(), public_key);
/// ```
#[derive(Clone)]
pub struct PublicKey {
    point: Option<k256::PublicKey>,
    compressed: bool,
}

impl PublicKey {
    /// Returns the null key.
    pub fn null() -> Self {
        Self {
            point: None,
            compressed: true,
        }
    }

    /// Returns true for the null key.
    pub fn is_null(&self) -> bool {
        self.point.is_none()
    }

    /// Returns true if this key serializes in 33-byte compressed form.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub(crate) fn from_k256(point: k256::PublicKey, compressed: bool) -> Self {
        Self {
            point: Some(point),
            compressed,
        }
    }

    pub(crate) fn as_k256(&self) -> Option<&k256::PublicKey> {
        self.point.as_ref()
    }

    pub(crate) fn verifying_key(&self) -> Option<VerifyingKey> {
        self.point.as_ref().map(VerifyingKey::from)
    }

    /// Creates a public key from a 33-byte compressed or 65-byte uncompressed
    /// SEC1 encoding. The 33 zero bytes decode to the null key.
    pub fn from_bytes(bytes: &[u8]) -> AuthResult<Self> {
        if bytes == NULL_KEY_BYTES {
            return Ok(Self::null());
        }
        if bytes.len() != PUBLIC_KEY_LENGTH && bytes.len() != PUBLIC_KEY_UNCOMPRESSED_LENGTH {
            return Err(AuthError::InvalidPublicKey(format!(
                "expected {} or {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                PUBLIC_KEY_UNCOMPRESSED_LENGTH,
                bytes.len()
            )));
        }
        let point = k256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| AuthError::InvalidPublicKey("not a point on secp256k1".into()))?;
        Ok(Self::from_k256(point, bytes.len() == PUBLIC_KEY_LENGTH))
    }

    /// Serializes the key in its own compression form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(self.compressed)
    }

    /// Serializes the key as 33 compressed bytes.
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        self.encode(true)
    }

    /// Serializes the key as 65 uncompressed bytes. The null key stays the
    /// 33-byte sentinel.
    pub fn to_uncompressed_bytes(&self) -> Vec<u8> {
        self.encode(false)
    }

    fn encode(&self, compressed: bool) -> Vec<u8> {
        match &self.point {
            Some(point) => point.to_encoded_point(compressed).as_bytes().to_vec(),
            None => NULL_KEY_BYTES.to_vec(),
        }
    }

    /// Returns the same key flagged for uncompressed serialization.
    pub fn to_uncompressed(&self) -> Self {
        Self {
            point: self.point.clone(),
            compressed: false,
        }
    }

    /// Returns the same key flagged for compressed serialization.
    pub fn to_compressed(&self) -> Self {
        Self {
            point: self.point.clone(),
            compressed: true,
        }
    }

    /// Creates a public key from hex. Empty input is the null key.
    pub fn from_hex(hex_str: &str) -> AuthResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if hex_str.is_empty() {
            return Ok(Self::null());
        }
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the serialized key as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Encodes the key as `prefix ‖ base58(key ‖ ripemd160(key)[..4])`.
    pub fn to_string_with_prefix(&self, prefix: &str) -> String {
        let mut data = self.to_bytes();
        let checksum = ripemd160_checksum(&data);
        data.extend_from_slice(&checksum);
        format!("{}{}", prefix, bs58::encode(data).into_string())
    }

    /// Parses a prefixed public key string such as `STM6eqN...`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::PrefixMismatch`] if the string does not start with `prefix`
    /// - [`AuthError::InvalidFormat`] if the remainder is not base58
    /// - [`AuthError::ChecksumMismatch`] if the RIPEMD-160 checksum differs
    pub fn from_string_with_prefix(encoded: &str, prefix: &str) -> AuthResult<Self> {
        let found = encoded.get(..prefix.len()).unwrap_or(encoded);
        if found != prefix {
            return Err(AuthError::PrefixMismatch {
                expected: prefix.to_string(),
                found: found.to_string(),
            });
        }
        let decoded = bs58::decode(&encoded[prefix.len()..])
            .into_vec()
            .map_err(|e| AuthError::InvalidFormat(format!("public key is not base58: {e}")))?;
        if decoded.len() <= 4 {
            return Err(AuthError::InvalidFormat(
                "public key string is too short".into(),
            ));
        }
        let (key, checksum) = decoded.split_at(decoded.len() - 4);
        if ripemd160_checksum(key) != checksum {
            return Err(AuthError::ChecksumMismatch(
                "public key checksum did not match".into(),
            ));
        }
        Self::from_bytes(key)
    }

    /// Derives a child key: `Q + SHA-256(Q ‖ offset)·G`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidPoint`] for the null key
    /// - [`AuthError::OutOfBounds`] if the tweak is not below the curve order
    /// - [`AuthError::InvalidDerivedKey`] if the sum is the point at infinity
    pub fn child(&self, offset: &[u8; 32]) -> AuthResult<Self> {
        let point = self.point.as_ref().ok_or_else(|| {
            AuthError::InvalidPoint("cannot derive a child of the null key".into())
        })?;
        let tweak = child_offset(self, offset)?;
        let derived = point.to_projective() + ProjectivePoint::GENERATOR * tweak;
        let derived = k256::PublicKey::from_affine(derived.to_affine())
            .map_err(|_| AuthError::InvalidDerivedKey)?;
        Ok(Self::from_k256(derived, true))
    }

    /// Verifies a signature over an already-hashed digest.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        signature.verify_digest(digest, self)
    }

    /// Hashes `message` with SHA-256 and verifies the signature over it.
    pub fn verify_buffer(&self, message: &[u8], signature: &Signature) -> bool {
        signature.verify_buffer(message, self)
    }
}

/// Computes the child-derivation tweak `SHA-256(serialized parent ‖ offset)`
/// as a scalar.
pub(crate) fn child_offset(parent: &PublicKey, offset: &[u8; 32]) -> AuthResult<Scalar> {
    let hash = sha256_of([parent.to_bytes().as_slice(), offset.as_slice()]);
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(hash))).ok_or_else(|| {
        AuthError::OutOfBounds("Child offset went out of bounds, try again".into())
    })
}

impl Verifier for PublicKey {
    fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        PublicKey::verify_digest(self, digest, signature)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for PublicKey {}

impl FromStr for PublicKey {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Self::from_string_with_prefix(s, DEFAULT_ADDRESS_PREFIX)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_prefix(DEFAULT_ADDRESS_PREFIX))
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
