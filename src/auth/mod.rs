//! Authentication module for the WeChat platform.
//!
//! This module provides:
//! - Application identity with secure secret storage
//! - A cache for the two short-lived platform credentials (access token
//!   and jsapi ticket) with margin-based refresh
//! - Random nonce generation
//! - SHA-1 signature generation for JS-SDK delegated calls

mod cache;
mod credentials;
mod nonce;
mod signature;

pub use cache::{
    BoxFuture, Credential, CredentialCache, CredentialFetcher, CredentialKind, FetchedCredential,
    FRESHNESS_MARGIN_SECS,
};
pub(crate) use cache::unix_now;
pub use credentials::AppCredentials;
pub use nonce::{nonce_string, JSSDK_NONCE_LEN};
pub use signature::{sign_params, JsapiSignInput};
