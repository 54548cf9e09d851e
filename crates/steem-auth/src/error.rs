//! Error types for steem-auth.
//!
//! Every fallible operation in the crate returns [`AuthResult`]. Parsing
//! failures are local and never transient: retrying the same input yields the
//! same error.

use thiserror::Error;

/// A specialized Result type for steem-auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// The error type for key handling, signing, encryption and RPC authentication.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Error occurred during hex encoding/decoding
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Error occurred during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not in the expected encoding or has the wrong shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A fixed-size value has the wrong length
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A checksum embedded in the input does not match the recomputed one
    #[error("Checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// The encoded string does not start with the configured network prefix
    #[error("Expecting prefix {expected}, instead got {found}")]
    PrefixMismatch {
        /// Configured prefix
        expected: String,
        /// Leading characters of the input
        found: String,
    },

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The operation needs a curve point but got the null key
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// A derived scalar is not below the curve order
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Child key derivation landed on the point at infinity or a zero scalar
    #[error("Child offset derived to an invalid key")]
    InvalidDerivedKey,

    /// Invalid signature encoding
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// A required argument was not supplied
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Block decryption failed after the checksum matched
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// A request without params cannot be signed
    #[error("Unable to sign a request without params")]
    MissingParams,

    /// The envelope is not a JSON-RPC 2.0 request
    #[error("Invalid JSON RPC Request")]
    MalformedRequest,

    /// `params.__signed` is absent
    #[error("Signed payload missing")]
    MissingSignedPayload,

    /// `params` carries keys besides `__signed`
    #[error("Invalid request params")]
    InvalidParams,

    /// The signed payload names no account
    #[error("Missing account")]
    MissingAccount,

    /// `__signed.params` is not base64-encoded JSON
    #[error("Invalid encoded params: {0}")]
    InvalidEncodedParams(String),

    /// The nonce is absent or not 8 hex-encoded bytes
    #[error("Invalid nonce")]
    InvalidNonce,

    /// The timestamp cannot be parsed
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// The signed request is older than the replay window
    #[error("Signature expired: request is {age_ms} ms old")]
    SignatureExpired {
        /// Age of the request at validation time
        age_ms: i64,
    },

    /// The authority verifier rejected the signatures
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}

/// Maximum length for error messages to prevent excessive memory usage in logs.
const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Patterns that might indicate key material in error messages.
const SENSITIVE_PATTERNS: &[&str] = &["private_key", "secret", "password", "wif", "brain"];

impl AuthError {
    /// Creates an [`AuthError::InvalidLength`].
    pub fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }

    /// Creates an [`AuthError::VerificationFailed`] from any displayable cause.
    pub fn verification<E: std::fmt::Display>(cause: E) -> Self {
        Self::VerificationFailed(cause.to_string())
    }

    /// Returns true if the input failed a checksum comparison.
    pub fn is_checksum_error(&self) -> bool {
        matches!(self, Self::ChecksumMismatch(_))
    }

    /// Returns true if the client must re-sign with a fresh nonce and
    /// timestamp instead of resubmitting the same envelope.
    pub fn requires_resign(&self) -> bool {
        matches!(
            self,
            Self::SignatureExpired { .. } | Self::VerificationFailed(_)
        )
    }

    /// Returns true if the error came from envelope validation.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest
                | Self::MissingSignedPayload
                | Self::InvalidParams
                | Self::MissingAccount
                | Self::InvalidEncodedParams(_)
                | Self::InvalidNonce
                | Self::InvalidTimestamp
                | Self::SignatureExpired { .. }
                | Self::VerificationFailed(_)
        )
    }

    /// Returns a sanitized version of the error message safe for logging.
    ///
    /// Control characters are removed, messages that look like they carry key
    /// material are redacted, and long messages are truncated.
    pub fn sanitized_message(&self) -> String {
        Self::sanitize_string(&self.to_string())
    }

    fn sanitize_string(s: &str) -> String {
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let lower = cleaned.to_lowercase();
        for pattern in SENSITIVE_PATTERNS {
            if lower.contains(pattern) {
                return format!("[REDACTED: message contained sensitive pattern '{pattern}']");
            }
        }

        if cleaned.len() > MAX_ERROR_MESSAGE_LENGTH {
            let mut end = MAX_ERROR_MESSAGE_LENGTH;
            while !cleaned.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... [truncated, total length: {}]",
                &cleaned[..end],
                cleaned.len()
            )
        } else {
            cleaned
        }
    }

    /// Returns a short message suitable for end users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Hex(_) => "Invalid hex format",
            Self::Json(_) => "Failed to process JSON",
            Self::InvalidFormat(_) | Self::InvalidLength { .. } => "Malformed input",
            Self::ChecksumMismatch(_) => "Checksum did not match",
            Self::PrefixMismatch { .. } => "Wrong network prefix",
            Self::InvalidPrivateKey(_) => "Invalid private key",
            Self::InvalidPublicKey(_) | Self::InvalidPoint(_) => "Invalid public key",
            Self::OutOfBounds(_) | Self::InvalidDerivedKey => "Key derivation failed",
            Self::InvalidSignature(_) => "Invalid signature",
            Self::InvalidArgument(_) => "Missing required argument",
            Self::Decryption(_) => "Decryption failed",
            Self::MissingParams => "Request has no params",
            Self::MalformedRequest
            | Self::MissingSignedPayload
            | Self::InvalidParams
            | Self::MissingAccount
            | Self::InvalidEncodedParams(_)
            | Self::InvalidNonce
            | Self::InvalidTimestamp => "Malformed signed request",
            Self::SignatureExpired { .. } => "Signed request expired",
            Self::VerificationFailed(_) => "Signature verification failed",
        }
    }
}
