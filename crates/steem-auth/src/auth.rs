//! String-level helpers over WIF keys and prefixed public keys.
//!
//! These take and return the encoded forms that wallets and RPC payloads
//! carry, so callers do not have to parse keys themselves.

use crate::config::AuthConfig;
use crate::crypto::{sha256d, PrivateKey, PublicKey, Signature, Signer};
use crate::error::AuthResult;

/// Returns true if `wif` is base58 whose last four bytes are the double
/// SHA-256 checksum of the rest. The version byte is not checked.
pub fn is_wif(wif: &str) -> bool {
    let Ok(decoded) = bs58::decode(wif).into_vec() else {
        return false;
    };
    if decoded.len() <= 4 {
        return false;
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    sha256d(payload)[..4] == *checksum
}

/// Returns the prefixed public key string of a WIF private key.
pub fn wif_to_public(wif: &str, prefix: &str) -> AuthResult<String> {
    Ok(PrivateKey::from_wif(wif)?
        .public_key()
        .to_string_with_prefix(prefix))
}

/// Returns true if `wif` decodes to the private key of `public_key`.
pub fn wif_is_valid(wif: &str, public_key: &str, prefix: &str) -> bool {
    wif_to_public(wif, prefix).is_ok_and(|derived| derived == public_key)
}

/// Returns true if `public_key` parses as a public key with `prefix`.
pub fn is_pubkey(public_key: &str, prefix: &str) -> bool {
    PublicKey::from_string_with_prefix(public_key, prefix).is_ok()
}

/// Signs the SHA-256 of `message` with a WIF key and returns the signature
/// hex.
pub fn sign_message(message: &[u8], wif: &str) -> AuthResult<String> {
    Ok(PrivateKey::from_wif(wif)?.sign_buffer(message)?.to_hex())
}

/// Verifies a hex signature over the SHA-256 of `message` against a prefixed
/// public key string. Malformed inputs verify as false.
pub fn verify_message(message: &[u8], signature: &str, public_key: &str, prefix: &str) -> bool {
    let Ok(signature) = Signature::from_hex(signature) else {
        return false;
    };
    let Ok(public_key) = PublicKey::from_string_with_prefix(public_key, prefix) else {
        return false;
    };
    public_key.verify_buffer(message, &signature)
}

/// Signs a serialized transaction with every key.
///
/// Each signature covers `SHA-256(chain_id ‖ serialized_tx)`. Signatures are
/// low-S; a node enforcing the older fc rule rejects those failing
/// [`Signature::is_fc_canonical`], and the transaction must then be re-signed
/// with a changed expiration.
pub fn sign_transaction<S: Signer>(
    config: &AuthConfig,
    serialized_tx: &[u8],
    signers: &[S],
) -> AuthResult<Vec<Signature>> {
    let mut message = Vec::with_capacity(config.chain_id().len() + serialized_tx.len());
    message.extend_from_slice(config.chain_id());
    message.extend_from_slice(serialized_tx);
    signers
        .iter()
        .map(|signer| signer.sign_buffer(&message))
        .collect()
}

/// Like [`sign_transaction`], with WIF-encoded keys.
pub fn sign_transaction_with_wifs<W: AsRef<str>>(
    config: &AuthConfig,
    serialized_tx: &[u8],
    wifs: &[W],
) -> AuthResult<Vec<Signature>> {
    let keys = wifs
        .iter()
        .map(|wif| PrivateKey::from_wif(wif.as_ref()))
        .collect::<AuthResult<Vec<_>>>()?;
    sign_transaction(config, serialized_tx, &keys)
}
