//! secp256k1 private keys.
//!
//! A private key is a scalar `1 <= d < n`. It can be generated, derived from a
//! seed or brain key, and moved between processes only as WIF or hex.

use crate::brain_key;
use crate::config::WIF_VERSION;
use crate::crypto::hash::{sha256, sha256d_checksum};
use crate::crypto::public_key::{child_offset, PublicKey};
use crate::crypto::signature::Signature;
use crate::crypto::traits::Signer;
use crate::error::{AuthError, AuthResult};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::subtle::ConstantTimeEq;
use k256::{NonZeroScalar, SecretKey};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Private key length in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Decoded WIF length: version byte, scalar and checksum.
const WIF_DECODED_LENGTH: usize = 1 + PRIVATE_KEY_LENGTH + 4;

/// A secp256k1 private key.
///
/// The scalar is zeroized when dropped and never printed by `Debug`.
///
/// # Example
///
/// ```rust
/// use steem_auth::crypto::PrivateKey;
///
/// let key = PrivateKey::from_seed("correct horse battery staple").unwrap();
/// let wif = key.to_wif();
/// assert_eq!(PrivateKey::from_wif(&wif).unwrap(), key);
/// ```
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
}

impl PrivateKey {
    /// Generates a new random private key.
    pub fn generate() -> Self {
        Self {
            inner: SecretKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Creates a private key from 32 big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidLength`] unless exactly 32 bytes are given and
    /// [`AuthError::InvalidPrivateKey`] if the scalar is zero or not below the
    /// curve order.
    pub fn from_bytes(bytes: &[u8]) -> AuthResult<Self> {
        if bytes.len() != PRIVATE_KEY_LENGTH {
            return Err(AuthError::invalid_length(PRIVATE_KEY_LENGTH, bytes.len()));
        }
        let inner = SecretKey::from_slice(bytes)
            .map_err(|_| AuthError::InvalidPrivateKey("scalar must be in [1, n)".into()))?;
        Ok(Self { inner })
    }

    /// Creates a private key from a hex string (with or without `0x`).
    pub fn from_hex(hex_str: &str) -> AuthResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Derives a private key as `SHA-256(seed)`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::OutOfBounds`] if the hash is zero or not below the
    /// curve order.
    pub fn from_seed(seed: impl AsRef<[u8]>) -> AuthResult<Self> {
        let hash = Zeroizing::new(sha256(seed.as_ref()));
        let inner = SecretKey::from_slice(hash.as_slice())
            .map_err(|_| AuthError::OutOfBounds("seed hashed outside [1, n)".into()))?;
        Ok(Self { inner })
    }

    /// Derives a private key from a brain key after normalizing its whitespace.
    pub fn from_brain_key(brain_key: &str) -> AuthResult<Self> {
        let normalized = Zeroizing::new(brain_key::normalize(brain_key));
        Self::from_seed(normalized.as_bytes())
    }

    /// Parses a Wallet Import Format string.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidFormat`] if the string is not base58, has the wrong
    ///   length or does not carry version byte `0x80`
    /// - [`AuthError::ChecksumMismatch`] if the trailing checksum is wrong
    pub fn from_wif(wif: &str) -> AuthResult<Self> {
        let decoded = Zeroizing::new(
            bs58::decode(wif)
                .into_vec()
                .map_err(|e| AuthError::InvalidFormat(format!("WIF is not base58: {e}")))?,
        );
        if decoded.len() != WIF_DECODED_LENGTH {
            return Err(AuthError::InvalidFormat(format!(
                "WIF decodes to {} bytes, expected {}",
                decoded.len(),
                WIF_DECODED_LENGTH
            )));
        }

        let (payload, checksum) = decoded.split_at(1 + PRIVATE_KEY_LENGTH);
        if sha256d_checksum(payload) != checksum {
            return Err(AuthError::ChecksumMismatch("WIF checksum did not match".into()));
        }
        if payload[0] != WIF_VERSION {
            return Err(AuthError::InvalidFormat(format!(
                "Expected WIF version {:#04x}, instead got {:#04x}",
                WIF_VERSION, payload[0]
            )));
        }
        Self::from_bytes(&payload[1..])
    }

    /// Encodes this key in Wallet Import Format.
    pub fn to_wif(&self) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(WIF_DECODED_LENGTH));
        payload.push(WIF_VERSION);
        payload.extend_from_slice(self.inner.to_bytes().as_slice());
        let checksum = sha256d_checksum(&payload);
        payload.extend_from_slice(&checksum);
        bs58::encode(payload.as_slice()).into_string()
    }

    /// Returns the scalar as 32 big-endian bytes.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.inner.to_bytes().into()
    }

    /// Returns the scalar as lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    /// Returns the compressed public key `d·G`.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_k256(self.inner.public_key(), true)
    }

    /// Computes the ECDH shared secret with `peer`: the x-coordinate of `d·Q`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPoint`] if `peer` is the null key.
    pub fn shared_secret(&self, peer: &PublicKey) -> AuthResult<[u8; 32]> {
        let point = peer.as_k256().ok_or_else(|| {
            AuthError::InvalidPoint("cannot derive a shared secret with the null key".into())
        })?;
        let shared = k256::ecdh::diffie_hellman(self.inner.to_nonzero_scalar(), point.as_affine());
        let mut secret = [0u8; 32];
        secret.copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(secret)
    }

    /// Derives a child key: `d + SHA-256(Q ‖ offset) mod n`.
    ///
    /// The child's public key equals [`PublicKey::child`] of this key's
    /// compressed public key with the same offset.
    ///
    /// # Errors
    ///
    /// - [`AuthError::OutOfBounds`] if the tweak is not below the curve order
    /// - [`AuthError::InvalidDerivedKey`] if the sum is zero
    pub fn child(&self, offset: &[u8; 32]) -> AuthResult<Self> {
        let tweak = child_offset(&self.public_key(), offset)?;
        let derived = *self.inner.to_nonzero_scalar() + tweak;
        let derived = Option::<NonZeroScalar>::from(NonZeroScalar::new(derived))
            .ok_or(AuthError::InvalidDerivedKey)?;
        Ok(Self {
            inner: SecretKey::from(derived),
        })
    }

    /// Signs an already-hashed digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> AuthResult<Signature> {
        Signature::sign_digest(digest, self)
    }

    /// Hashes `message` with SHA-256 and signs it.
    pub fn sign_buffer(&self, message: &[u8]) -> AuthResult<Signature> {
        Signature::sign_buffer(message, self)
    }

    pub(crate) fn signing_key(&self) -> SigningKey {
        SigningKey::from(&self.inner)
    }
}

impl Signer for PrivateKey {
    fn sign_digest(&self, digest: &[u8; 32]) -> AuthResult<Signature> {
        PrivateKey::sign_digest(self, digest)
    }

    fn public_key(&self) -> PublicKey {
        PrivateKey::public_key(self)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ct_eq(&other.inner).into()
    }
}

impl Eq for PrivateKey {}

impl FromStr for PrivateKey {
    type Err = AuthError;

    fn from_str(s: &str) -> AuthResult<Self> {
        Self::from_wif(s)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}
