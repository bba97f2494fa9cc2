//! SHA-1 signature generation for JS-SDK delegated calls.
//!
//! The platform verifies signatures computed as:
//! ```text
//! sha1("key1=value1&key2=value2&...")
//! ```
//! where parameter names are lower-cased, entries are sorted by name in
//! byte order, and values are joined raw (no URL escaping). The digest is
//! returned as lowercase hex.

use sha1::{Digest, Sha1};

/// Sign a set of named parameters.
///
/// Canonicalization makes the result deterministic: the same mapping
/// produces the same signature regardless of key order or key casing,
/// which is the property the platform's verifier relies on.
///
/// # Example
///
/// ```rust
/// use wechat_mp_client::auth::sign_params;
///
/// let signature = sign_params([("Timestamp", "1"), ("Url", "http://x")]);
/// assert_eq!(signature, sign_params([("url", "http://x"), ("timestamp", "1")]));
/// ```
pub fn sign_params<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: std::fmt::Display,
{
    let mut pairs: Vec<(String, String)> = params
        .into_iter()
        .map(|(key, value)| (key.as_ref().to_ascii_lowercase(), value.to_string()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha1::digest(canonical.as_bytes()))
}

/// The four parameters of a JS-SDK configuration signature.
///
/// Consumed once per signing; not persisted.
#[derive(Debug, Clone)]
pub struct JsapiSignInput {
    /// Valid jsapi ticket
    pub jsapi_ticket: String,
    /// Random nonce string
    pub noncestr: String,
    /// Unix timestamp in seconds
    pub timestamp: u64,
    /// The page URL being configured, without any fragment component
    pub url: String,
}

impl JsapiSignInput {
    /// Compute the signature over the four canonical parameters.
    pub fn signature(&self) -> String {
        let timestamp = self.timestamp.to_string();
        sign_params([
            ("jsapi_ticket", self.jsapi_ticket.as_str()),
            ("noncestr", self.noncestr.as_str()),
            ("timestamp", timestamp.as_str()),
            ("url", self.url.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_known_vector() {
        // sha1("a=1&b=2")
        assert_eq!(
            sign_params([("a", "1"), ("b", "2")]),
            "d53cf64e768f4ef09c806bbe12258c78211b2690"
        );
    }

    #[test]
    fn test_case_and_order_insensitive() {
        // sha1("jsapi_ticket=t&noncestr=abc&timestamp=1&url=http://x")
        let expected = "7d65afb8c634e6ab12b8d9a2e5fa941813093a2e";

        let mixed = sign_params([
            ("Timestamp", "1"),
            ("Url", "http://x"),
            ("Noncestr", "abc"),
            ("JsapiTicket", "t"),
        ]);
        assert_eq!(mixed, expected);

        let lower = sign_params([
            ("jsapi_ticket", "t"),
            ("noncestr", "abc"),
            ("timestamp", "1"),
            ("url", "http://x"),
        ]);
        assert_eq!(lower, expected);
    }

    #[test]
    fn test_deterministic_for_unordered_mappings() {
        let mut params = HashMap::new();
        params.insert("url".to_string(), "https://example.com/?a=b".to_string());
        params.insert("noncestr".to_string(), "Wm3WZYTPz0wzccnW".to_string());
        params.insert("timestamp".to_string(), "1414587457".to_string());
        params.insert("jsapi_ticket".to_string(), "tick".to_string());

        assert_eq!(sign_params(params.clone()), sign_params(params));
    }

    #[test]
    fn test_platform_documentation_example() {
        // The worked example published with the JS-SDK documentation.
        let input = JsapiSignInput {
            jsapi_ticket: "sM4AOVdWfPE4DxkXGEs8VMCPGGVi4C3VM0P37wVUCFvkVAy_90u5h9nbSlYy3-Sl-HhTdfl2fzFy1AOcHKP7qg".to_string(),
            noncestr: "Wm3WZYTPz0wzccnW".to_string(),
            timestamp: 1_414_587_457,
            url: "http://mp.weixin.qq.com?params=value".to_string(),
        };
        assert_eq!(
            input.signature(),
            "0f9de62fce790f9a083d5c99e95740ceb90c27ed"
        );
    }

    #[test]
    fn test_values_are_not_escaped() {
        // sha1 over the raw value, ampersands in values included as-is.
        let with_query = sign_params([("url", "http://x?a=1"), ("noncestr", "n")]);
        let escaped_would_differ = sign_params([("url", "http%3A%2F%2Fx%3Fa%3D1"), ("noncestr", "n")]);
        assert_ne!(with_query, escaped_would_differ);
    }
}
