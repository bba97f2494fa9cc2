//! # WeChat MP Client
//!
//! An async Rust client library for the WeChat Official Account platform API.
//!
//! ## Features
//!
//! - Credential lifecycle for the two short-lived platform secrets (access
//!   token and jsapi ticket) with margin-based refresh and forced refresh on
//!   server-reported invalidation
//! - Bounded retry around every API call: invalid credentials are
//!   re-fetched between attempts, timeouts are re-attempted as-is
//! - Deterministic SHA-1 signing and signed JS-SDK configurations
//! - Web authorization (sns) flow as explicit typed steps, free of any web
//!   framework
//! - Template management, mass messaging, and subscriber lookups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wechat_mp_client::MpRestClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MpRestClient::new("wx-app-id", "app-secret");
//!     let config = client.jssdk_config("https://example.com/page").await?;
//!     println!("signature: {}", config.signature);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod mp;

// Re-export commonly used types at crate root
pub use error::{ApiError, WechatError};
pub use mp::MpRestClient;

/// Result type alias using WechatError
pub type Result<T> = std::result::Result<T, WechatError>;
