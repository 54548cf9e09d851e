//! Cryptographic primitives for Steem keys.
//!
//! secp256k1 private and public keys, recoverable canonical signatures,
//! address derivation and ECDH-based memo encryption.
//!
//! # Example
//!
//! ```rust
//! use steem_auth::crypto::{PrivateKey, Signer, Verifier};
//!
//! let private_key = PrivateKey::generate();
//! let signature = private_key.sign_buffer(b"hello world").unwrap();
//!
//! let public_key = private_key.public_key();
//! assert!(public_key.verify_buffer(b"hello world", &signature));
//! ```

mod address;
mod aes;
mod hash;
mod private_key;
mod public_key;
mod signature;
mod traits;

// Re-export hash functions
pub use hash::{ripemd160, sha256, sha256_of, sha256d, sha512};

// Re-export traits
pub use traits::{Signer, Verifier};

// Re-export key and signature types
pub use private_key::{PrivateKey, PRIVATE_KEY_LENGTH};
pub use public_key::{PublicKey, PUBLIC_KEY_LENGTH, PUBLIC_KEY_UNCOMPRESSED_LENGTH};
pub use signature::{Signature, SIGNATURE_LENGTH};

// Re-export address and memo types
pub use address::{Address, ADDRESS_LENGTH};
pub use self::aes::{Aes, EncryptedMessage, NonceSource, UniqueNonce};
