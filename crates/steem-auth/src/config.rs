//! Chain configuration for key encoding and transaction signing.
//!
//! Configuration is always passed explicitly; nothing in the crate reads a
//! process-wide setting.

use crate::error::AuthResult;

/// Address prefix used by mainnet keys and addresses.
pub const DEFAULT_ADDRESS_PREFIX: &str = "STM";

/// Maximum accepted age of a signed RPC request, in milliseconds.
pub const REPLAY_WINDOW_MS: i64 = 60_000;

/// Version byte prepended to private keys in WIF.
pub const WIF_VERSION: u8 = 0x80;

/// Version byte of PTS-style and derived addresses.
pub const PTS_ADDRESS_VERSION: u8 = 56;

/// Chain parameters used when encoding keys and signing transactions.
///
/// # Example
///
/// ```rust
/// use steem_auth::AuthConfig;
///
/// let config = AuthConfig::custom("TST").with_chain_id([7u8; 32]);
/// assert_eq!(config.address_prefix(), "TST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub(crate) address_prefix: String,
    pub(crate) chain_id: [u8; 32],
}

impl AuthConfig {
    /// Mainnet: prefix `STM` and the all-zero chain id.
    pub fn mainnet() -> Self {
        Self {
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            chain_id: [0u8; 32],
        }
    }

    /// A chain with a custom address prefix and the all-zero chain id.
    pub fn custom(address_prefix: impl Into<String>) -> Self {
        Self {
            address_prefix: address_prefix.into(),
            chain_id: [0u8; 32],
        }
    }

    /// Sets the address prefix.
    pub fn with_address_prefix(mut self, address_prefix: impl Into<String>) -> Self {
        self.address_prefix = address_prefix.into();
        self
    }

    /// Sets the chain id.
    pub fn with_chain_id(mut self, chain_id: [u8; 32]) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Sets the chain id from 64 hex characters.
    pub fn with_chain_id_hex(mut self, chain_id: &str) -> AuthResult<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(chain_id.strip_prefix("0x").unwrap_or(chain_id), &mut bytes)?;
        self.chain_id = bytes;
        Ok(self)
    }

    /// Returns the address prefix.
    pub fn address_prefix(&self) -> &str {
        &self.address_prefix
    }

    /// Returns the chain id.
    pub fn chain_id(&self) -> &[u8; 32] {
        &self.chain_id
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
