//! # steem-auth
//!
//! Cryptographic identity and request authentication for Steem clients and
//! servers.
//!
//! ## Quick Start
//!
//! ```rust
//! use steem_auth::crypto::{PrivateKey, PublicKey};
//!
//! let key = PrivateKey::from_seed("alice").unwrap();
//! let wif = key.to_wif();
//! let public_key: PublicKey = "STM7zsqi7QUAjTAdyynd6DVe8uv4K8gCTRHnAoMN9w9CA1xLCTDVv"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(PrivateKey::from_wif(&wif).unwrap().public_key(), public_key);
//! ```
//!
//! ## Modules
//!
//! - [`crypto`] - Keys, signatures, addresses and memo encryption
//! - [`rpc_auth`] - Signing and validating JSON-RPC requests
//! - [`auth`] - Helpers over WIF and public key strings
//! - [`brain_key`] - Brain key normalization
//! - [`config`] - Address prefix and chain id

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod auth;
pub mod brain_key;
pub mod config;
pub mod crypto;
pub mod error;
pub mod rpc_auth;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};

#[cfg(test)]
mod tests;
