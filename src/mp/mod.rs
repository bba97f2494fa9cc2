//! WeChat Official Account platform surface.
//!
//! This module provides:
//! - [`rest`] - REST API client with credential injection and bounded retry
//! - [`jssdk`] - signed configuration for the browser-side JS-SDK
//! - [`sns`] - web authorization flow as explicit typed steps

pub mod jssdk;
pub mod rest;
pub mod sns;

pub use rest::MpRestClient;
pub use sns::{AuthStep, SnsScope, SnsSession};
