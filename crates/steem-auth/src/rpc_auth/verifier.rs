//! Authority verification for signed requests.
//!
//! The protocol never decides who may act for an account. It hands the
//! signing digest, the hex signatures and the account name to an
//! [`AuthorityVerifier`], which usually looks the account's keys up over the
//! network.

use crate::crypto::{PublicKey, Signature};
use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Resolves an account's authority and checks signatures against it.
#[async_trait]
pub trait AuthorityVerifier: Send + Sync {
    /// Succeeds if `signatures` over `digest` satisfy the authority of
    /// `account`. The error's message becomes the verification failure
    /// reason.
    async fn verify(
        &self,
        digest: &[u8; 32],
        signatures: &[String],
        account: &str,
    ) -> AuthResult<()>;
}

/// A weighted-key authority: signatures whose keys add up to at least
/// `weight_threshold` satisfy it.
///
/// Serializes as `{"weight_threshold": 1, "key_auths": [["STM...", 1]]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAuthority {
    /// Minimum total weight.
    pub weight_threshold: u32,
    /// Keys and their weights.
    pub key_auths: Vec<(PublicKey, u16)>,
}

impl KeyAuthority {
    /// Creates an authority with no keys.
    pub fn new(weight_threshold: u32) -> Self {
        Self {
            weight_threshold,
            key_auths: Vec::new(),
        }
    }

    /// Creates a single-key authority with threshold 1.
    pub fn single(key: PublicKey) -> Self {
        Self::new(1).with_key(key, 1)
    }

    /// Adds a key with a weight.
    pub fn with_key(mut self, key: PublicKey, weight: u16) -> Self {
        self.key_auths.push((key, weight));
        self
    }

    /// Sums the authority weight of each distinct key in `signers`. A key
    /// listed more than once in `key_auths` counts with its first weight. The
    /// sum saturates at `u32::MAX`.
    pub fn weight_of(&self, signers: &[PublicKey]) -> u32 {
        let mut seen: Vec<&PublicKey> = Vec::with_capacity(signers.len());
        let mut total = 0u32;
        for signer in signers {
            if seen.contains(&signer) {
                continue;
            }
            seen.push(signer);
            if let Some((_, weight)) = self.key_auths.iter().find(|(key, _)| key == signer) {
                total = total.saturating_add(u32::from(*weight));
            }
        }
        total
    }

    /// Returns true if `signers` reach the threshold. A zero threshold is
    /// never satisfied.
    pub fn is_satisfied_by(&self, signers: &[PublicKey]) -> bool {
        self.weight_threshold > 0 && self.weight_of(signers) >= self.weight_threshold
    }
}

/// An [`AuthorityVerifier`] backed by a fixed account map.
///
/// Signer keys are recovered from the signatures; signatures from keys
/// outside the authority add no weight.
///
/// # Example
///
/// ```rust
/// use steem_auth::crypto::PrivateKey;
/// use steem_auth::rpc_auth::{KeyAuthority, StaticAuthorityVerifier};
///
/// let key = PrivateKey::from_seed("alice").unwrap();
/// let verifier = StaticAuthorityVerifier::new()
///     .with_authority("alice", KeyAuthority::single(key.public_key()));
/// assert!(verifier.authority("alice").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorityVerifier {
    authorities: HashMap<String, KeyAuthority>,
}

impl StaticAuthorityVerifier {
    /// Creates a verifier with no accounts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the authority of `account`.
    pub fn with_authority(mut self, account: impl Into<String>, authority: KeyAuthority) -> Self {
        self.insert(account, authority);
        self
    }

    /// Adds or replaces the authority of `account`.
    pub fn insert(&mut self, account: impl Into<String>, authority: KeyAuthority) {
        self.authorities.insert(account.into(), authority);
    }

    /// Returns the authority of `account`.
    pub fn authority(&self, account: &str) -> Option<&KeyAuthority> {
        self.authorities.get(account)
    }
}

/// Recovers the distinct signer keys of `signatures` over `digest`.
///
/// # Errors
///
/// Returns [`AuthError::VerificationFailed`] for a malformed, non-canonical
/// or unrecoverable signature.
pub fn recover_signers(digest: &[u8; 32], signatures: &[String]) -> AuthResult<Vec<PublicKey>> {
    let mut signers: Vec<PublicKey> = Vec::with_capacity(signatures.len());
    for encoded in signatures {
        let signature = Signature::from_hex(encoded).map_err(AuthError::verification)?;
        if !signature.is_canonical() {
            return Err(AuthError::VerificationFailed(
                "signature is not canonical".into(),
            ));
        }
        let signer = signature
            .recover_public_key(digest)
            .map_err(AuthError::verification)?;
        if !signers.contains(&signer) {
            signers.push(signer);
        }
    }
    Ok(signers)
}

#[async_trait]
impl AuthorityVerifier for StaticAuthorityVerifier {
    async fn verify(
        &self,
        digest: &[u8; 32],
        signatures: &[String],
        account: &str,
    ) -> AuthResult<()> {
        let authority = self
            .authorities
            .get(account)
            .ok_or_else(|| AuthError::VerificationFailed(format!("unknown account {account}")))?;
        let signers = recover_signers(digest, signatures)?;
        let weight = authority.weight_of(&signers);
        debug!(
            account,
            signers = signers.len(),
            weight,
            threshold = authority.weight_threshold,
            "Checked signer weight"
        );
        if !authority.is_satisfied_by(&signers) {
            return Err(AuthError::VerificationFailed(format!(
                "missing required signature weight: have {weight}, need {}",
                authority.weight_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sha256, PrivateKey};

    fn sign_hex(key: &PrivateKey, digest: &[u8; 32]) -> String {
        key.sign_digest(digest).unwrap().to_hex()
    }

    #[test]
    fn test_weight_counts_each_key_once() {
        let a = PrivateKey::from_seed("a").unwrap().public_key();
        let b = PrivateKey::from_seed("b").unwrap().public_key();
        let authority = KeyAuthority::new(3).with_key(a.clone(), 2).with_key(b.clone(), 1);

        assert_eq!(authority.weight_of(&[a.clone()]), 2);
        assert!(!authority.is_satisfied_by(&[a.clone()]));
        assert!(authority.is_satisfied_by(&[a, b]));
    }

    #[test]
    fn test_duplicated_key_weighs_once() {
        let a = PrivateKey::from_seed("a").unwrap().public_key();
        let authority = KeyAuthority::new(2).with_key(a.clone(), 1).with_key(a.clone(), 1);

        assert_eq!(authority.weight_of(&[a.clone()]), 1);
        assert_eq!(authority.weight_of(&[a.clone(), a.clone()]), 1);
        assert!(!authority.is_satisfied_by(&[a]));
    }

    #[test]
    fn test_large_authority_does_not_overflow() {
        let keys: Vec<PublicKey> = (0u32..3)
            .map(|i| PrivateKey::from_seed(i.to_le_bytes()).unwrap().public_key())
            .collect();
        let mut authority = KeyAuthority::new(u32::MAX);
        for key in &keys {
            authority = authority.with_key(key.clone(), u16::MAX);
        }
        authority.key_auths.extend(std::iter::repeat((keys[0].clone(), u16::MAX)).take(70_000));

        assert_eq!(authority.weight_of(&keys), 3 * u32::from(u16::MAX));
        assert!(!authority.is_satisfied_by(&keys));
    }

    #[test]
    fn test_zero_threshold_never_satisfied() {
        let a = PrivateKey::from_seed("a").unwrap().public_key();
        let authority = KeyAuthority::new(0).with_key(a.clone(), 1);
        assert!(!authority.is_satisfied_by(&[a]));
    }

    #[test]
    fn test_authority_json_shape() {
        let key = PrivateKey::from_seed("alice").unwrap().public_key();
        let authority = KeyAuthority::single(key);
        let value = serde_json::to_value(&authority).unwrap();
        assert_eq!(value["weight_threshold"], 1);
        assert_eq!(
            value["key_auths"][0][0],
            "STM7zsqi7QUAjTAdyynd6DVe8uv4K8gCTRHnAoMN9w9CA1xLCTDVv"
        );
        assert_eq!(value["key_auths"][0][1], 1);
        let restored: KeyAuthority = serde_json::from_value(value).unwrap();
        assert_eq!(restored, authority);
    }

    #[test]
    fn test_recover_signers_deduplicates() {
        let key = PrivateKey::generate();
        let digest = sha256(b"digest");
        let signature = sign_hex(&key, &digest);
        let signers = recover_signers(&digest, &[signature.clone(), signature]).unwrap();
        assert_eq!(signers, vec![key.public_key()]);
    }

    #[test]
    fn test_recover_signers_rejects_garbage() {
        let digest = sha256(b"digest");
        let err = recover_signers(&digest, &["nothex".to_string()]).unwrap_err();
        assert!(matches!(err, AuthError::VerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_static_verifier_accepts_threshold() {
        let owner = PrivateKey::from_seed("owner").unwrap();
        let active = PrivateKey::from_seed("active").unwrap();
        let verifier = StaticAuthorityVerifier::new().with_authority(
            "alice",
            KeyAuthority::new(2)
                .with_key(owner.public_key(), 1)
                .with_key(active.public_key(), 1),
        );
        let digest = sha256(b"request");
        let both = vec![sign_hex(&owner, &digest), sign_hex(&active, &digest)];
        assert!(verifier.verify(&digest, &both, "alice").await.is_ok());

        let one = vec![sign_hex(&owner, &digest)];
        let err = verifier.verify(&digest, &one, "alice").await.unwrap_err();
        assert!(err.to_string().contains("have 1, need 2"));
    }

    #[tokio::test]
    async fn test_static_verifier_rejects_duplicated_key_authority() {
        let owner = PrivateKey::from_seed("owner").unwrap();
        let verifier = StaticAuthorityVerifier::new().with_authority(
            "alice",
            KeyAuthority::new(2)
                .with_key(owner.public_key(), 1)
                .with_key(owner.public_key(), 1),
        );
        let digest = sha256(b"request");
        let err = verifier
            .verify(&digest, &[sign_hex(&owner, &digest)], "alice")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("have 1, need 2"));
    }

    #[tokio::test]
    async fn test_static_verifier_unknown_account_and_foreign_key() {
        let alice = PrivateKey::from_seed("alice").unwrap();
        let mallory = PrivateKey::from_seed("mallory").unwrap();
        let verifier = StaticAuthorityVerifier::new()
            .with_authority("alice", KeyAuthority::single(alice.public_key()));
        let digest = sha256(b"request");

        let err = verifier
            .verify(&digest, &[sign_hex(&alice, &digest)], "bob")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown account"));

        let err = verifier
            .verify(&digest, &[sign_hex(&mallory, &digest)], "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VerificationFailed(_)));

        assert!(verifier.verify(&digest, &[], "alice").await.is_err());
    }
}
