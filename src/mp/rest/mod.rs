//! WeChat Official Account REST API client.
//!
//! Provides the client plumbing (credential injection, bounded retry,
//! error-envelope classification) plus typed endpoint methods for
//! template management, mass messaging, and subscriber lookups.

mod client;
mod endpoints;
mod messaging;
mod templates;
pub mod types;
mod users;

pub use client::{
    DEFAULT_TIMEOUT, MpRestClient, MpRestClientBuilder, RetryPolicy, TokenEndpointFetcher,
};
pub(crate) use client::{ApiRequest, Auth};
pub use endpoints::*;
pub use messaging::{MASS_SEND_TIMEOUT, TEXT_BROADCAST_BYTE_LIMIT};
