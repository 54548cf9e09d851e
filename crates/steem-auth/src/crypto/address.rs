//! Addresses derived from public keys.
//!
//! Two families exist. The direct form is the prefixed public key string
//! itself. The derived form hashes the key down to 20 bytes and carries a
//! RIPEMD-160 checksum, like public key strings do.

use crate::config::{DEFAULT_ADDRESS_PREFIX, PTS_ADDRESS_VERSION};
use crate::crypto::hash::{ripemd160, ripemd160_checksum, sha256, sha256d_checksum, sha512};
use crate::crypto::public_key::PublicKey;
use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address length in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// A 20-byte address hash.
///
/// # Example
///
/// ```rust
/// use steem_auth::crypto::{Address, PrivateKey};
///
/// let public_key = PrivateKey::from_seed("alice").unwrap().public_key();
/// let address = Address::from_public(&public_key, true, 56);
/// assert_eq!(address.to_string(), "STMKm2Zus41ULEZPbKKzBwmAAHn2EVhWefuS");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Creates an address from exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> AuthResult<Self> {
        let bytes: [u8; ADDRESS_LENGTH] = bytes
            .try_into()
            .map_err(|_| AuthError::invalid_length(ADDRESS_LENGTH, bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Returns the address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the direct address of a key: its prefixed public key string
    /// in the requested compression form.
    pub fn from_public_key_string(public_key: &PublicKey, compressed: bool, prefix: &str) -> String {
        let key = if compressed {
            public_key.to_compressed()
        } else {
            public_key.to_uncompressed()
        };
        key.to_string_with_prefix(prefix)
    }

    /// Derives the address of a key.
    ///
    /// `rep = ripemd160(sha256(pub))`, then
    /// `ripemd160(version ‖ rep ‖ sha256d(version ‖ rep)[..4])`.
    pub fn from_public(public_key: &PublicKey, compressed: bool, version: u8) -> Self {
        Self(ripemd160(&versioned_payload(public_key, compressed, version)))
    }

    /// Derives the legacy blockchain address: `ripemd160(sha512(pub))` over
    /// the key in its own compression form.
    pub fn blockchain_address(public_key: &PublicKey) -> Self {
        Self(ripemd160(&sha512(&public_key.to_bytes())))
    }

    /// Returns the PTS-style address string of a key in its own compression
    /// form. It carries no prefix.
    pub fn pts_address(public_key: &PublicKey) -> String {
        bs58::encode(versioned_payload(
            public_key,
            public_key.is_compressed(),
            PTS_ADDRESS_VERSION,
        ))
        .into_string()
    }

    /// Encodes as `prefix ‖ base58(addr ‖ ripemd160(addr)[..4])`.
    pub fn to_string_with_prefix(&self, prefix: &str) -> String {
        let mut data = self.0.to_vec();
        data.extend_from_slice(&ripemd160_checksum(&self.0));
        format!("{}{}", prefix, bs58::encode(data).into_string())
    }

    /// Parses a prefixed address string.
    pub fn from_string_with_prefix(encoded: &str, prefix: &str) -> AuthResult<Self> {
        Self::from_bytes(&Self::decode_with_prefix(encoded, prefix)?)
    }

    /// Strips `prefix`, decodes base58 and verifies the trailing RIPEMD-160
    /// checksum, returning the payload of any length.
    pub fn decode_with_prefix(encoded: &str, prefix: &str) -> AuthResult<Vec<u8>> {
        let Some(body) = encoded.strip_prefix(prefix) else {
            return Err(AuthError::PrefixMismatch {
                expected: prefix.to_string(),
                found: encoded.chars().take(prefix.chars().count()).collect(),
            });
        };
        let mut decoded = bs58::decode(body)
            .into_vec()
            .map_err(|e| AuthError::InvalidFormat(format!("address is not base58: {e}")))?;
        if decoded.len() <= 4 {
            return Err(AuthError::InvalidFormat("address string is too short".into()));
        }
        let checksum = decoded.split_off(decoded.len() - 4);
        if ripemd160_checksum(&decoded) != checksum.as_slice() {
            return Err(AuthError::ChecksumMismatch(
                "address checksum did not match".into(),
            ));
        }
        Ok(decoded)
    }
}

/// `version ‖ ripemd160(sha256(pub)) ‖ sha256d(version ‖ rep)[..4]`
fn versioned_payload(public_key: &PublicKey, compressed: bool, version: u8) -> Vec<u8> {
    let serialized = if compressed {
        public_key.to_compressed_bytes()
    } else {
        public_key.to_uncompressed_bytes()
    };
    let mut payload = Vec::with_capacity(1 + ADDRESS_LENGTH + 4);
    payload.push(version);
    payload.extend_from_slice(&ripemd160(&sha256(&serialized)));
    let checksum = sha256d_checksum(&payload);
    payload.extend_from_slice(&checksum);
    payload
}

impl FromStr for Address {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Self::from_string_with_prefix(s, DEFAULT_ADDRESS_PREFIX)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_prefix(DEFAULT_ADDRESS_PREFIX))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
