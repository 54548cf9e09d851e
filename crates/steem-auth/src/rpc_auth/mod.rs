//! Signed JSON-RPC requests.
//!
//! A client wraps a request's params in a `__signed` payload carrying the
//! account, a random nonce, a timestamp and one signature per key. The
//! signing digest is
//!
//! ```text
//! SHA-256(K ‖ SHA-256(timestamp ‖ account ‖ method ‖ params_b64) ‖ nonce)
//! ```
//!
//! where `K = SHA-256("steem_jsonrpc_auth")` keeps these digests apart from
//! every other message the same keys sign. A server checks the envelope
//! shape, rejects requests older than [`REPLAY_WINDOW_MS`], and hands the
//! digest to an [`AuthorityVerifier`].
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use steem_auth::crypto::PrivateKey;
//! use steem_auth::rpc_auth::{self, KeyAuthority, RpcRequest, StaticAuthorityVerifier};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = PrivateKey::from_seed("alice").unwrap();
//! let request = RpcRequest::new("get_account", json!(["alice"]), 1);
//! let signed = rpc_auth::sign(&request, "alice", &[key.to_wif()])?;
//!
//! let verifier = StaticAuthorityVerifier::new()
//!     .with_authority("alice", KeyAuthority::single(key.public_key()));
//! let params = rpc_auth::validate_request(&signed, &verifier).await?;
//! assert_eq!(params, json!(["alice"]));
//! # Ok(())
//! # }
//! ```

mod types;
mod verifier;

pub use types::{RpcRequest, SignedParams, SignedPayload, SignedRequest, JSONRPC_VERSION};
pub use verifier::{recover_signers, AuthorityVerifier, KeyAuthority, StaticAuthorityVerifier};

use crate::config::REPLAY_WINDOW_MS;
use crate::crypto::{sha256_of, PrivateKey, Signer};
use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

/// `SHA-256("steem_jsonrpc_auth")`.
pub const K: [u8; 32] = [
    0x3b, 0x3b, 0x08, 0x1e, 0x46, 0xea, 0x80, 0x8d, 0x5a, 0x96, 0xb0, 0x8c, 0x4b, 0xc5, 0x00, 0x3f,
    0x5e, 0x15, 0x76, 0x70, 0x90, 0xf3, 0x44, 0xfa, 0xab, 0x53, 0x1e, 0xc5, 0x75, 0x65, 0x13, 0x6b,
];

/// Nonce length in bytes.
pub const NONCE_LENGTH: usize = 8;

/// Computes the digest that request signatures cover.
pub fn hash_message(
    timestamp: &str,
    account: &str,
    method: &str,
    params: &str,
    nonce: &[u8; NONCE_LENGTH],
) -> [u8; 32] {
    let inner = sha256_of([
        timestamp.as_bytes(),
        account.as_bytes(),
        method.as_bytes(),
        params.as_bytes(),
    ]);
    sha256_of([K.as_slice(), inner.as_slice(), nonce.as_slice()])
}

/// Signs `request` as `account` with WIF-encoded keys.
///
/// # Errors
///
/// - [`AuthError::MissingParams`] if the request has no params
/// - WIF decoding errors for any malformed key
pub fn sign<W: AsRef<str>>(
    request: &RpcRequest,
    account: &str,
    wifs: &[W],
) -> AuthResult<SignedRequest> {
    let keys = wifs
        .iter()
        .map(|wif| PrivateKey::from_wif(wif.as_ref()))
        .collect::<AuthResult<Vec<_>>>()?;
    sign_with_keys(request, account, &keys)
}

/// Signs `request` with a fresh random nonce and the current time.
pub fn sign_with_keys<S: Signer>(
    request: &RpcRequest,
    account: &str,
    signers: &[S],
) -> AuthResult<SignedRequest> {
    sign_at(request, account, signers, rand::random(), Utc::now())
}

/// Signs `request` with a fixed nonce and timestamp.
pub fn sign_at<S: Signer>(
    request: &RpcRequest,
    account: &str,
    signers: &[S],
    nonce: [u8; NONCE_LENGTH],
    timestamp: DateTime<Utc>,
) -> AuthResult<SignedRequest> {
    let params = match &request.params {
        None | Some(Value::Null) => return Err(AuthError::MissingParams),
        Some(params) => params,
    };
    let encoded_params = base64::encode(serde_json::to_vec(params)?);
    let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    let digest = hash_message(
        &timestamp,
        account,
        &request.method,
        &encoded_params,
        &nonce,
    );
    let signatures = signers
        .iter()
        .map(|signer| signer.sign_digest(&digest).map(|signature| signature.to_hex()))
        .collect::<AuthResult<Vec<_>>>()?;

    debug!(
        account,
        method = %request.method,
        signatures = signatures.len(),
        "Signed RPC request"
    );

    Ok(SignedRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method: request.method.clone(),
        id: request.id,
        params: SignedParams {
            signed: SignedPayload {
                account: account.to_string(),
                nonce: hex::encode(nonce),
                params: encoded_params,
                signatures,
                timestamp,
            },
        },
    })
}

/// Validates a signed envelope and returns its decoded params.
///
/// See [`validate_at`] for the checks performed.
pub async fn validate<V>(envelope: &Value, verifier: &V) -> AuthResult<Value>
where
    V: AuthorityVerifier + ?Sized,
{
    validate_at(envelope, verifier, Utc::now()).await
}

/// Validates a typed signed envelope.
pub async fn validate_request<V>(request: &SignedRequest, verifier: &V) -> AuthResult<Value>
where
    V: AuthorityVerifier + ?Sized,
{
    let envelope = serde_json::to_value(request)?;
    validate(&envelope, verifier).await
}

/// Validates a signed envelope as of `now`.
///
/// Checks run in order and the first failure is returned:
///
/// 1. `jsonrpc` is `"2.0"` and `method` is a string ([`AuthError::MalformedRequest`])
/// 2. `params.__signed` exists ([`AuthError::MissingSignedPayload`]) and is
///    the only key of `params` ([`AuthError::InvalidParams`])
/// 3. `account` is present ([`AuthError::MissingAccount`])
/// 4. `params` is base64 JSON ([`AuthError::InvalidEncodedParams`])
/// 5. `nonce` is 8 hex bytes ([`AuthError::InvalidNonce`])
/// 6. `timestamp` parses ([`AuthError::InvalidTimestamp`])
/// 7. the request is at most 60 s old ([`AuthError::SignatureExpired`])
/// 8. `verifier` accepts the signatures ([`AuthError::VerificationFailed`])
///
/// Timestamps in the future are accepted.
pub async fn validate_at<V>(envelope: &Value, verifier: &V, now: DateTime<Utc>) -> AuthResult<Value>
where
    V: AuthorityVerifier + ?Sized,
{
    let checked = check_envelope(envelope, now).inspect_err(log_rejection)?;
    let digest = hash_message(
        checked.timestamp,
        checked.account,
        checked.method,
        checked.encoded_params,
        &checked.nonce,
    );
    let signatures = checked.signatures.inspect_err(log_rejection)?;

    if let Err(err) = verifier.verify(&digest, &signatures, checked.account).await {
        let err = match err {
            AuthError::VerificationFailed(reason) => AuthError::VerificationFailed(reason),
            other => AuthError::verification(other),
        };
        log_rejection(&err);
        return Err(err);
    }

    debug!(
        account = checked.account,
        method = checked.method,
        "Validated signed RPC request"
    );
    Ok(checked.params)
}

/// Envelope fields that passed the synchronous checks.
struct CheckedEnvelope<'a> {
    method: &'a str,
    account: &'a str,
    encoded_params: &'a str,
    params: Value,
    nonce: [u8; NONCE_LENGTH],
    timestamp: &'a str,
    signatures: AuthResult<Vec<String>>,
}

fn check_envelope(envelope: &Value, now: DateTime<Utc>) -> AuthResult<CheckedEnvelope<'_>> {
    let method = match (
        envelope.get("jsonrpc").and_then(Value::as_str),
        envelope.get("method").and_then(Value::as_str),
    ) {
        (Some(JSONRPC_VERSION), Some(method)) => method,
        _ => return Err(AuthError::MalformedRequest),
    };

    let params = envelope.get("params");
    let signed = match params.and_then(|params| params.get("__signed")) {
        None | Some(Value::Null) => return Err(AuthError::MissingSignedPayload),
        Some(signed) => signed,
    };
    if params.and_then(Value::as_object).map(|params| params.len()) != Some(1) {
        return Err(AuthError::InvalidParams);
    }

    let account = signed
        .get("account")
        .and_then(Value::as_str)
        .ok_or(AuthError::MissingAccount)?;

    let encoded_params = signed
        .get("params")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::InvalidEncodedParams("params is not a string".into()))?;
    let decoded = base64::decode(encoded_params)
        .map_err(|e| AuthError::InvalidEncodedParams(e.to_string()))?;
    let params: Value = serde_json::from_slice(&decoded)
        .map_err(|e| AuthError::InvalidEncodedParams(e.to_string()))?;

    let nonce = signed
        .get("nonce")
        .and_then(Value::as_str)
        .and_then(|nonce| hex::decode(nonce).ok())
        .and_then(|nonce| <[u8; NONCE_LENGTH]>::try_from(nonce).ok())
        .ok_or(AuthError::InvalidNonce)?;

    let timestamp = signed
        .get("timestamp")
        .and_then(Value::as_str)
        .ok_or(AuthError::InvalidTimestamp)?;
    let signed_at = parse_timestamp(timestamp).ok_or(AuthError::InvalidTimestamp)?;

    let age_ms = (now - signed_at).num_milliseconds();
    if age_ms > REPLAY_WINDOW_MS {
        return Err(AuthError::SignatureExpired { age_ms });
    }

    Ok(CheckedEnvelope {
        method,
        account,
        encoded_params,
        params,
        nonce,
        timestamp,
        signatures: signature_list(signed.get("signatures")),
    })
}

fn signature_list(value: Option<&Value>) -> AuthResult<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    AuthError::VerificationFailed("signatures must be strings".into())
                })
            })
            .collect(),
        Some(_) => Err(AuthError::VerificationFailed(
            "signatures must be an array".into(),
        )),
    }
}

/// Parses an RFC 3339 timestamp. A timestamp without an offset is read as
/// UTC.
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

fn log_rejection(err: &AuthError) {
    warn!(error = %err.sanitized_message(), "Rejected signed RPC request");
}
