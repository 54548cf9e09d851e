//! Property tests for the cryptographic invariants.
//!
//! Properties tested:
//! - WIF and public key encodings round trip
//! - Every signature is canonical and recovers its signer
//! - ECDH agrees from both sides
//! - Memo encryption round trips and rejects foreign keys
//! - Decoders never panic on arbitrary input

#[cfg(test)]
mod property_tests {
    use crate::brain_key::normalize;
    use crate::crypto::{Aes, PrivateKey, PublicKey, Signature};
    use proptest::prelude::*;

    fn seed() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 1..64)
    }

    fn distinct_seeds() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
        (seed(), seed()).prop_filter("distinct seeds", |(a, b)| a != b)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_wif_roundtrip(seed in seed()) {
            let key = PrivateKey::from_seed(&seed).unwrap();
            let restored = PrivateKey::from_wif(&key.to_wif()).unwrap();
            prop_assert_eq!(restored.to_bytes(), key.to_bytes());
        }

        #[test]
        fn prop_public_key_roundtrip(seed in seed(), compressed: bool) {
            let key = PrivateKey::from_seed(&seed).unwrap().public_key();
            let key = if compressed { key } else { key.to_uncompressed() };

            let from_bytes = PublicKey::from_bytes(&key.to_bytes()).unwrap();
            prop_assert_eq!(from_bytes.to_bytes(), key.to_bytes());

            let from_string: PublicKey = key.to_string().parse().unwrap();
            prop_assert_eq!(from_string.is_compressed(), compressed);
            prop_assert_eq!(from_string, key);
        }

        #[test]
        fn prop_signatures_canonical_and_recoverable(seed in seed(), message: Vec<u8>) {
            let key = PrivateKey::from_seed(&seed).unwrap();
            let signature = key.sign_buffer(&message).unwrap();

            prop_assert!(signature.is_canonical());
            prop_assert!(key.public_key().verify_buffer(&message, &signature));
            prop_assert_eq!(
                signature.recover_public_key_from_buffer(&message).unwrap(),
                key.public_key()
            );

            let restored = Signature::from_bytes(&signature.to_bytes()).unwrap();
            prop_assert_eq!(restored, signature);
        }

        #[test]
        fn prop_ecdh_symmetric((a, b) in distinct_seeds()) {
            let a = PrivateKey::from_seed(&a).unwrap();
            let b = PrivateKey::from_seed(&b).unwrap();
            prop_assert_eq!(
                a.shared_secret(&b.public_key()).unwrap(),
                b.shared_secret(&a.public_key()).unwrap()
            );
        }

        #[test]
        fn prop_memo_roundtrip((a, b) in distinct_seeds(), plaintext: Vec<u8>, nonce: u64) {
            let aes = Aes::new();
            let alice = PrivateKey::from_seed(&a).unwrap();
            let bob = PrivateKey::from_seed(&b).unwrap();

            let sealed = aes
                .encrypt_with_nonce(&alice, &bob.public_key(), &plaintext, nonce)
                .unwrap();
            prop_assert_eq!(sealed.message.len() % 16, 0);
            prop_assert!(sealed.message.len() > plaintext.len());

            let opened = aes.decrypt_message(&bob, &alice.public_key(), &sealed).unwrap();
            prop_assert_eq!(opened, plaintext);

            let eve = PrivateKey::generate();
            let err = aes.decrypt_message(&eve, &alice.public_key(), &sealed).unwrap_err();
            prop_assert!(err.is_checksum_error());
        }

        #[test]
        fn prop_signature_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..80)) {
            let _ = Signature::from_bytes(&bytes);
        }

        #[test]
        fn prop_public_key_string_decode_never_panics(s in "STM[1-9A-HJ-NP-Za-km-z]{0,60}") {
            let _ = s.parse::<PublicKey>();
        }

        #[test]
        fn prop_brain_key_normalize_idempotent(s in "[ a-z\t\n\r]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
        }
    }
}
