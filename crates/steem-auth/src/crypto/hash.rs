//! Hash functions used by every other component.
//!
//! SHA-256 backs signing digests and base58check checksums, SHA-512 the memo
//! key material, and RIPEMD-160 the public key and address checksums.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Computes the SHA-256 hash of the input.
///
/// # Example
///
/// ```rust
/// use steem_auth::crypto::sha256;
///
/// let hash = sha256(b"hello world");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Computes SHA-256 over several byte slices as if they were concatenated.
pub fn sha256_of<I, T>(items: I) -> [u8; 32]
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item.as_ref());
    }
    hasher.finalize().into()
}

/// Computes SHA-256(SHA-256(data)), the base58check checksum hash.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes the SHA-512 hash of the input.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let result = Sha512::digest(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&result);
    output
}

/// Computes the RIPEMD-160 hash of the input.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// First four bytes of `ripemd160(data)`.
pub(crate) fn ripemd160_checksum(data: &[u8]) -> [u8; 4] {
    let hash = ripemd160(data);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// First four bytes of `sha256d(data)`.
pub(crate) fn sha256d_checksum(data: &[u8]) -> [u8; 4] {
    let hash = sha256d(data);
    [hash[0], hash[1], hash[2], hash[3]]
}
