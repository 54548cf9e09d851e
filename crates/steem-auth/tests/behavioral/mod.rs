//! Behavioral tests for steem-auth.
//!
//! These tests drive the public API end to end: a client signs, a server
//! validates, and keys move between processes only in their encoded forms.

mod key_tests {
    use steem_auth::crypto::{Address, PrivateKey, PublicKey};

    #[test]
    fn test_seed_to_encodings() {
        let key = PrivateKey::from_seed("steem-auth test seed").unwrap();
        assert_eq!(
            key.to_hex(),
            "d5981606ac21b72f7c787ad706b0fdc233b02bdcbe58e111d40fc8fe398fc9ad"
        );
        assert_eq!(
            key.to_wif(),
            "5KSMZBr3pkt5zdUawj5UATNN1HCpDzW5JisRxmyYYqYSVyGVjvW"
        );
        assert_eq!(
            key.public_key().to_string(),
            "STM6eqNDEHPUNYvQnW4CiztR92zym5f8cf9UUGzYzrN7dy1PqqeTm"
        );
    }

    #[test]
    fn test_keys_survive_string_transport() {
        let key = PrivateKey::generate();
        let wif = key.to_wif();
        let public = key.public_key().to_string();

        let restored: PrivateKey = wif.parse().unwrap();
        let public_key: PublicKey = public.parse().unwrap();
        assert_eq!(restored.public_key(), public_key);
    }

    #[test]
    fn test_child_keys_agree() {
        let parent = PrivateKey::from_seed("parent").unwrap();
        let offset = [42u8; 32];
        let child = parent.child(&offset).unwrap();
        assert_eq!(
            child.public_key(),
            parent.public_key().child(&offset).unwrap()
        );
        assert_ne!(child.public_key(), parent.public_key());
    }

    #[test]
    fn test_brain_key_matches_seed_of_normalized_text() {
        let from_brain = PrivateKey::from_brain_key("  correct   horse\tbattery staple \n").unwrap();
        let from_seed = PrivateKey::from_seed("correct horse battery staple").unwrap();
        assert_eq!(from_brain, from_seed);
    }

    #[test]
    fn test_address_families() {
        let public_key = PrivateKey::from_seed("bob").unwrap().public_key();
        assert_eq!(
            Address::from_public_key_string(&public_key, true, "STM"),
            "STM5VE6Dgy9FUmd1mFotXwF88HkQN1KysCWLPqpVnDMjRvGRi1YrM"
        );
        let derived = Address::from_public(&public_key, true, 56);
        assert_eq!(derived.to_string(), "STMFsTQG2oy1GQgYpt5gDDja9Za1CBbCeYPQ");
        assert_eq!(
            "STMFsTQG2oy1GQgYpt5gDDja9Za1CBbCeYPQ".parse::<Address>().unwrap(),
            derived
        );
    }
}

mod signing_flow_tests {
    use steem_auth::crypto::{sha256, PrivateKey, Signature, Signer, Verifier};

    fn sign_with<S: Signer>(signer: &S, message: &[u8]) -> Signature {
        signer.sign_buffer(message).unwrap()
    }

    fn verify_with<V: Verifier>(verifier: &V, message: &[u8], signature: &Signature) -> bool {
        verifier.verify_buffer(message, signature)
    }

    #[test]
    fn test_sign_verify_through_traits() {
        let key = PrivateKey::generate();
        let signature = sign_with(&key, b"through traits");
        assert!(verify_with(&key.public_key(), b"through traits", &signature));
        assert!(!verify_with(&key.public_key(), b"something else", &signature));
    }

    #[test]
    fn test_signature_hex_transport() {
        let key = PrivateKey::generate();
        let digest = sha256(b"transport");
        let hex = key.sign_digest(&digest).unwrap().to_hex();

        let received = Signature::from_hex(&hex).unwrap();
        assert!(received.is_canonical());
        assert_eq!(received.recover_public_key(&digest).unwrap(), key.public_key());
    }

    #[test]
    fn test_different_keys_produce_different_signatures() {
        let digest = sha256(b"same message");
        let a = PrivateKey::generate().sign_digest(&digest).unwrap();
        let b = PrivateKey::generate().sign_digest(&digest).unwrap();
        assert_ne!(a.to_bytes(), b.to_bytes());
    }
}

mod memo_tests {
    use steem_auth::crypto::{Aes, EncryptedMessage, PrivateKey};

    #[test]
    fn test_memo_over_json() {
        let alice = PrivateKey::from_seed("alice").unwrap();
        let bob = PrivateKey::from_seed("bob").unwrap();
        let aes = Aes::new();

        let sealed = aes
            .encrypt(&alice, &bob.public_key(), "pay rent".as_bytes())
            .unwrap();
        let wire = serde_json::to_string(&sealed).unwrap();

        let received: EncryptedMessage = serde_json::from_str(&wire).unwrap();
        let opened = aes
            .decrypt_message(&bob, &alice.public_key(), &received)
            .unwrap();
        assert_eq!(String::from_utf8(opened).unwrap(), "pay rent");
    }
}

mod rpc_auth_tests {
    use serde_json::{json, Value};
    use steem_auth::crypto::PrivateKey;
    use steem_auth::rpc_auth::{
        self, KeyAuthority, RpcRequest, SignedRequest, StaticAuthorityVerifier,
    };
    use steem_auth::AuthError;
    use tracing_subscriber::EnvFilter;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn verifier(account: &str, key: &PrivateKey) -> StaticAuthorityVerifier {
        StaticAuthorityVerifier::new()
            .with_authority(account, KeyAuthority::single(key.public_key()))
    }

    #[tokio::test]
    async fn test_client_server_roundtrip() -> anyhow::Result<()> {
        init_tracing();
        let key = PrivateKey::from_seed("alice")?;
        let request = RpcRequest::new("get_account", json!(["alice"]), 1);

        let signed = rpc_auth::sign(&request, "alice", &[key.to_wif()])?;
        let wire = serde_json::to_string(&signed)?;

        let envelope: Value = serde_json::from_str(&wire)?;
        let params = rpc_auth::validate(&envelope, &verifier("alice", &key)).await?;
        assert_eq!(params, json!(["alice"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_object_params_keep_key_order() {
        let key = PrivateKey::from_seed("alice").unwrap();
        let params = json!({"zeta": 1, "alpha": [true, null, "x"]});
        let request = RpcRequest::new("find_accounts", params.clone(), 2);

        let signed = rpc_auth::sign(&request, "alice", &[key.to_wif()]).unwrap();
        let decoded = rpc_auth::validate_request(&signed, &verifier("alice", &key))
            .await
            .unwrap();
        assert_eq!(decoded, params);
        assert_eq!(
            serde_json::to_string(&decoded).unwrap(),
            r#"{"zeta":1,"alpha":[true,null,"x"]}"#
        );
    }

    #[tokio::test]
    async fn test_signer_must_match_account() {
        init_tracing();
        let alice = PrivateKey::from_seed("alice").unwrap();
        let bob = PrivateKey::from_seed("bob").unwrap();
        let request = RpcRequest::new("get_account", json!(["alice"]), 1);

        let signed = rpc_auth::sign(&request, "alice", &[bob.to_wif()]).unwrap();
        let err = rpc_auth::validate_request(&signed, &verifier("alice", &alice))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VerificationFailed(_)));
        assert!(err.requires_resign());
    }

    #[tokio::test]
    async fn test_account_swap_is_detected() {
        let alice = PrivateKey::from_seed("alice").unwrap();
        let request = RpcRequest::new("get_account", json!(["alice"]), 1);
        let mut signed: SignedRequest = rpc_auth::sign(&request, "alice", &[alice.to_wif()]).unwrap();
        signed.params.signed.account = "mallory".into();

        let verifier = StaticAuthorityVerifier::new()
            .with_authority("mallory", KeyAuthority::single(alice.public_key()));
        let err = rpc_auth::validate_request(&signed, &verifier)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_multisig_threshold() {
        let owner = PrivateKey::from_seed("owner").unwrap();
        let active = PrivateKey::from_seed("active").unwrap();
        let verifier = StaticAuthorityVerifier::new().with_authority(
            "treasury",
            KeyAuthority::new(2)
                .with_key(owner.public_key(), 1)
                .with_key(active.public_key(), 1),
        );
        let request = RpcRequest::new("get_account", json!(["treasury"]), 7);

        let both = rpc_auth::sign_with_keys(&request, "treasury", &[owner.clone(), active]).unwrap();
        assert!(rpc_auth::validate_request(&both, &verifier).await.is_ok());

        let one = rpc_auth::sign_with_keys(&request, "treasury", &[owner]).unwrap();
        assert!(rpc_auth::validate_request(&one, &verifier).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_authority_rejects_without_panicking() {
        let key = PrivateKey::from_seed("alice").unwrap();
        let mut authority = KeyAuthority::new(u32::MAX);
        authority
            .key_auths
            .extend(std::iter::repeat((key.public_key(), u16::MAX)).take(70_000));
        let verifier = StaticAuthorityVerifier::new().with_authority("alice", authority);
        let request = RpcRequest::new("get_account", json!(["alice"]), 1);

        let signed = rpc_auth::sign(&request, "alice", &[key.to_wif()]).unwrap();
        let err = rpc_auth::validate_request(&signed, &verifier)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::VerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_verifier_as_trait_object() {
        let key = PrivateKey::from_seed("alice").unwrap();
        let verifier: Box<dyn rpc_auth::AuthorityVerifier> = Box::new(verifier("alice", &key));
        let request = RpcRequest::new("get_account", json!(["alice"]), 1);
        let signed = rpc_auth::sign(&request, "alice", &[key.to_wif()]).unwrap();
        assert!(rpc_auth::validate_request(&signed, verifier.as_ref())
            .await
            .is_ok());
    }
}

mod error_tests {
    use steem_auth::crypto::PrivateKey;
    use steem_auth::AuthError;

    #[test]
    fn test_wif_errors_are_sanitized() {
        let err = PrivateKey::from_wif("5KSMZBr3pkt5zdUawj5UATNN1HCpDzW5JisRxmyYYqYSVyGVjvX").unwrap_err();
        assert!(err.is_checksum_error());
        assert!(!err.sanitized_message().contains("5KSMZBr3"));
    }

    #[test]
    fn test_expired_requires_resign() {
        let err = AuthError::SignatureExpired { age_ms: 61_000 };
        assert!(err.requires_resign());
        assert!(err.is_validation_error());
        assert!(!AuthError::InvalidNonce.requires_resign());
    }
}
