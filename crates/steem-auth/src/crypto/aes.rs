//! ECDH + AES-256-CBC memo encryption.
//!
//! Key material is `SHA-512(LE64(nonce) ‖ ECDH(priv, pub))`: bytes 0..32 are
//! the AES key, 32..48 the IV, and the first four bytes of its SHA-256 read as
//! a little-endian `u32` are the checksum. The checksum is compared before any
//! block is decrypted.

use crate::crypto::hash::{sha256, sha512};
use crate::crypto::private_key::PrivateKey;
use crate::crypto::public_key::PublicKey;
use crate::error::{AuthError, AuthResult};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// A source of encryption nonces.
///
/// Nonces must not repeat for the same key pair; a repeated nonce reuses the
/// AES key and IV.
pub trait NonceSource {
    /// Returns the next nonce.
    fn next_nonce(&self) -> u64;
}

/// Default nonce source: `(now_ms << 16) | counter`, forced strictly greater
/// than every value it has handed out before.
#[derive(Debug)]
pub struct UniqueNonce {
    counter: AtomicU32,
    last: AtomicU64,
}

impl UniqueNonce {
    /// Creates a nonce source whose counter starts at a random 16-bit value.
    pub fn new() -> Self {
        Self {
            counter: AtomicU32::new(u32::from(rand::random::<u16>())),
            last: AtomicU64::new(0),
        }
    }
}

impl Default for UniqueNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceSource for UniqueNonce {
    fn next_nonce(&self) -> u64 {
        let now_ms = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let counter = u64::from(self.counter.fetch_add(1, Ordering::Relaxed) % 0xFFFF);
        let candidate = (now_ms << 16) | counter;
        let next = |prev: u64| candidate.max(prev.wrapping_add(1));
        match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(next(prev)))
        {
            Ok(prev) | Err(prev) => next(prev),
        }
    }
}

/// An encrypted memo.
///
/// In JSON the nonce is a decimal string and the message is hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    /// Nonce mixed into the key material.
    #[serde(with = "u64_string")]
    pub nonce: u64,
    /// AES-256-CBC ciphertext.
    #[serde(with = "hex::serde")]
    pub message: Vec<u8>,
    /// Key-material checksum.
    pub checksum: u32,
}

/// Memo encryption between two key pairs.
///
/// # Example
///
/// ```rust
/// use steem_auth::crypto::{Aes, PrivateKey};
///
/// let alice = PrivateKey::generate();
/// let bob = PrivateKey::generate();
/// let aes = Aes::new();
///
/// let sealed = aes.encrypt(&alice, &bob.public_key(), b"memo").unwrap();
/// let opened = aes.decrypt_message(&bob, &alice.public_key(), &sealed).unwrap();
/// assert_eq!(opened, b"memo");
/// ```
#[derive(Debug, Default)]
pub struct Aes<N: NonceSource = UniqueNonce> {
    nonces: N,
}

impl Aes {
    /// Creates a channel using [`UniqueNonce`].
    pub fn new() -> Self {
        Self {
            nonces: UniqueNonce::new(),
        }
    }
}

impl<N: NonceSource> Aes<N> {
    /// Creates a channel drawing nonces from `nonces`.
    pub fn with_nonce_source(nonces: N) -> Self {
        Self { nonces }
    }

    /// Encrypts `plaintext` from `private_key` to `public_key` with a fresh
    /// nonce.
    pub fn encrypt(
        &self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
        plaintext: &[u8],
    ) -> AuthResult<EncryptedMessage> {
        self.encrypt_with_nonce(private_key, public_key, plaintext, self.nonces.next_nonce())
    }

    /// Encrypts with a caller-chosen nonce.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidArgument`] if `public_key` is the null key.
    pub fn encrypt_with_nonce(
        &self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
        plaintext: &[u8],
        nonce: u64,
    ) -> AuthResult<EncryptedMessage> {
        let key_material = key_material(private_key, public_key, nonce)?;
        let cipher = Aes256CbcEnc::new_from_slices(&key_material[..32], &key_material[32..48])
            .map_err(|e| AuthError::InvalidArgument(format!("cipher setup failed: {e}")))?;
        Ok(EncryptedMessage {
            nonce,
            message: cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            checksum: checksum(&key_material),
        })
    }

    /// Decrypts `message`, sent from the owner of `public_key` to
    /// `private_key`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidArgument`] for the null key or an empty message
    /// - [`AuthError::ChecksumMismatch`] if the key material does not match
    ///   `checksum`
    /// - [`AuthError::Decryption`] for a bad block length or padding
    pub fn decrypt(
        &self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
        nonce: u64,
        message: &[u8],
        checksum_value: u32,
    ) -> AuthResult<Vec<u8>> {
        if message.is_empty() {
            return Err(AuthError::InvalidArgument("message is empty".into()));
        }
        let key_material = key_material(private_key, public_key, nonce)?;
        if checksum(&key_material) != checksum_value {
            return Err(AuthError::ChecksumMismatch(
                "memo key checksum did not match".into(),
            ));
        }
        let cipher = Aes256CbcDec::new_from_slices(&key_material[..32], &key_material[32..48])
            .map_err(|e| AuthError::InvalidArgument(format!("cipher setup failed: {e}")))?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(message)
            .map_err(|_| AuthError::Decryption("invalid padding or block length".into()))
    }

    /// Decrypts a hex-encoded ciphertext.
    pub fn decrypt_hex(
        &self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
        nonce: u64,
        message_hex: &str,
        checksum_value: u32,
    ) -> AuthResult<Vec<u8>> {
        let message = hex::decode(message_hex)?;
        self.decrypt(private_key, public_key, nonce, &message, checksum_value)
    }

    /// Decrypts an [`EncryptedMessage`].
    pub fn decrypt_message(
        &self,
        private_key: &PrivateKey,
        public_key: &PublicKey,
        encrypted: &EncryptedMessage,
    ) -> AuthResult<Vec<u8>> {
        self.decrypt(
            private_key,
            public_key,
            encrypted.nonce,
            &encrypted.message,
            encrypted.checksum,
        )
    }
}

fn key_material(
    private_key: &PrivateKey,
    public_key: &PublicKey,
    nonce: u64,
) -> AuthResult<Zeroizing<[u8; 64]>> {
    if public_key.is_null() {
        return Err(AuthError::InvalidArgument(
            "public key is the null key".into(),
        ));
    }
    let shared = Zeroizing::new(private_key.shared_secret(public_key)?);
    let mut input = Zeroizing::new([0u8; 40]);
    input[..8].copy_from_slice(&nonce.to_le_bytes());
    input[8..].copy_from_slice(shared.as_slice());
    Ok(Zeroizing::new(sha512(input.as_slice())))
}

fn checksum(key_material: &[u8; 64]) -> u32 {
    let hash = sha256(key_material);
    u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]])
}

mod u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub(super) fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        u64::from_str(&string).map_err(|err| D::Error::custom(err.to_string()))
    }
}
