//! Recoverable, canonical secp256k1 ECDSA signatures.
//!
//! Signing uses deterministic RFC 6979 nonces (HMAC-SHA-256 over key and
//! digest), so the same key and digest always give the same signature. Every
//! produced signature is low-S; when the raw result is high-S, `s` is replaced
//! by `n - s` and the y-parity bit of the recovery id is flipped so that the
//! signer's key stays recoverable.
//!
//! Wire form is 65 bytes: `header ‖ r[32] ‖ s[32]`, where
//! `header = 31 + recovery_id` (compact signature over a compressed key).

use crate::crypto::hash::sha256;
use crate::crypto::private_key::PrivateKey;
use crate::crypto::public_key::PublicKey;
use crate::error::{AuthError, AuthResult};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

/// Header base for compact signatures made with compressed public keys.
const COMPACT_HEADER_BASE: u8 = 27 + 4;

/// A secp256k1 ECDSA signature with its recovery id.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    inner: K256Signature,
    recovery_id: RecoveryId,
}

impl Signature {
    /// Signs an already-hashed 32-byte digest.
    pub fn sign_digest(digest: &[u8; 32], private_key: &PrivateKey) -> AuthResult<Self> {
        let (signature, recovery_id) = private_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| AuthError::InvalidSignature(format!("signing failed: {e}")))?;
        Ok(Self::canonical(signature, recovery_id))
    }

    /// Hashes `message` with SHA-256 and signs the digest.
    pub fn sign_buffer(message: &[u8], private_key: &PrivateKey) -> AuthResult<Self> {
        Self::sign_digest(&sha256(message), private_key)
    }

    fn canonical(signature: K256Signature, recovery_id: RecoveryId) -> Self {
        match signature.normalize_s() {
            Some(normalized) => Self {
                inner: normalized,
                recovery_id: RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            },
            None => Self {
                inner: signature,
                recovery_id,
            },
        }
    }

    /// Verifies this signature over a digest. Returns false for a mismatch,
    /// a high-S signature, or the null key.
    pub fn verify_digest(&self, digest: &[u8; 32], public_key: &PublicKey) -> bool {
        let Some(verifying_key) = public_key.verifying_key() else {
            return false;
        };
        verifying_key.verify_prehash(digest, &self.inner).is_ok()
    }

    /// Hashes `message` with SHA-256 and verifies this signature over it.
    pub fn verify_buffer(&self, message: &[u8], public_key: &PublicKey) -> bool {
        self.verify_digest(&sha256(message), public_key)
    }

    /// Recovers the signer's compressed public key from the digest.
    pub fn recover_public_key(&self, digest: &[u8; 32]) -> AuthResult<PublicKey> {
        let verifying_key = VerifyingKey::recover_from_prehash(digest, &self.inner, self.recovery_id)
            .map_err(|_| AuthError::InvalidSignature("public key recovery failed".into()))?;
        Ok(PublicKey::from_k256(
            k256::PublicKey::from(&verifying_key),
            true,
        ))
    }

    /// Recovers the signer's public key from the raw (unhashed) message.
    pub fn recover_public_key_from_buffer(&self, message: &[u8]) -> AuthResult<PublicKey> {
        self.recover_public_key(&sha256(message))
    }

    /// Returns true if `s <= n/2`.
    pub fn is_canonical(&self) -> bool {
        self.inner.normalize_s().is_none()
    }

    /// Returns true if the signature also meets the stricter fc rule: neither
    /// `r` nor `s` has its high bit set or a redundant leading zero byte.
    ///
    /// Signing only guarantees low-S, which about half of signatures exceed
    /// under this rule. Nodes that still enforce it need the caller to re-sign
    /// over a different payload.
    pub fn is_fc_canonical(&self) -> bool {
        fn minimal_positive(bytes: &[u8; 32]) -> bool {
            bytes[0] & 0x80 == 0 && !(bytes[0] == 0 && bytes[1] & 0x80 == 0)
        }
        minimal_positive(&self.r()) && minimal_positive(&self.s())
    }

    /// Returns the recovery id (0..=3).
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id.to_byte()
    }

    /// Returns `r` as 32 big-endian bytes.
    pub fn r(&self) -> [u8; 32] {
        self.inner.r().to_bytes().into()
    }

    /// Returns `s` as 32 big-endian bytes.
    pub fn s(&self) -> [u8; 32] {
        self.inner.s().to_bytes().into()
    }

    /// Parses the 65-byte wire form.
    ///
    /// The header byte may be a bare recovery id (0..=3) or a compact header
    /// (27..=34).
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidLength`] unless exactly 65 bytes are given
    /// - [`AuthError::InvalidSignature`] for an unknown header or `r`/`s`
    ///   outside `[1, n)`
    pub fn from_bytes(bytes: &[u8]) -> AuthResult<Self> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(AuthError::invalid_length(SIGNATURE_LENGTH, bytes.len()));
        }
        let recovery_byte = match bytes[0] {
            header @ 0..=3 => header,
            header @ 27..=34 => (header - 27) & 3,
            header => {
                return Err(AuthError::InvalidSignature(format!(
                    "unsupported recovery header {header}"
                )))
            }
        };
        let recovery_id = RecoveryId::from_byte(recovery_byte)
            .ok_or_else(|| AuthError::InvalidSignature("invalid recovery id".into()))?;
        let inner = K256Signature::from_slice(&bytes[1..])
            .map_err(|_| AuthError::InvalidSignature("r and s must be in [1, n)".into()))?;
        Ok(Self { inner, recovery_id })
    }

    /// Returns the 65-byte wire form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[0] = COMPACT_HEADER_BASE + self.recovery_id.to_byte();
        bytes[1..].copy_from_slice(self.inner.to_bytes().as_slice());
        bytes
    }

    /// Parses the 130-character hex form (an optional `0x` is accepted).
    pub fn from_hex(hex_str: &str) -> AuthResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the 130-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}
