//! Signing and verification traits.
//!
//! The RPC protocol and the transaction helpers are written against these
//! traits so that callers can plug in keys held elsewhere (hardware, remote
//! signers) as long as they produce recoverable secp256k1 signatures.

use crate::crypto::hash::sha256;
use crate::crypto::public_key::PublicKey;
use crate::crypto::signature::Signature;
use crate::error::AuthResult;

/// A trait for types that can sign 32-byte digests.
pub trait Signer {
    /// Signs an already-hashed 32-byte digest.
    fn sign_digest(&self, digest: &[u8; 32]) -> AuthResult<Signature>;

    /// Hashes `message` with SHA-256 and signs the result.
    fn sign_buffer(&self, message: &[u8]) -> AuthResult<Signature> {
        self.sign_digest(&sha256(message))
    }

    /// Returns the public key corresponding to this signer.
    fn public_key(&self) -> PublicKey;
}

/// A trait for types that can verify signatures.
///
/// Verification answers yes or no; a well-formed signature that does not
/// match is `false`, not an error.
pub trait Verifier {
    /// Verifies a signature over an already-hashed digest.
    fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool;

    /// Hashes `message` with SHA-256 and verifies the signature over it.
    fn verify_buffer(&self, message: &[u8], signature: &Signature) -> bool {
        self.verify_digest(&sha256(message), signature)
    }
}
