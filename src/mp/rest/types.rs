//! Request and response types for the Official Account REST API.

use serde::{Deserialize, Serialize};

/// Response to an app access-token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// The granted token
    pub access_token: String,
    /// Server-declared lifetime in seconds
    pub expires_in: u64,
}

/// Response to a jsapi ticket fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct JsapiTicketResponse {
    /// The granted ticket
    pub ticket: String,
    /// Server-declared lifetime in seconds
    pub expires_in: u64,
}

/// Acknowledgement for write endpoints that return only the error envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {}

/// One industry classification.
#[derive(Debug, Clone, Deserialize)]
pub struct IndustryClass {
    /// Top-level industry name
    pub first_class: String,
    /// Sub-industry name
    pub second_class: String,
}

/// The account's configured industries.
#[derive(Debug, Clone, Deserialize)]
pub struct IndustryInfo {
    /// Primary industry
    pub primary_industry: IndustryClass,
    /// Secondary industry
    pub secondary_industry: IndustryClass,
}

/// Response to adding a library template to the account.
#[derive(Debug, Clone, Deserialize)]
pub struct AddTemplateResponse {
    /// ID of the template now available to the account
    pub template_id: String,
}

/// A message template owned by the account.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInfo {
    /// Template ID
    pub template_id: String,
    /// Template title
    pub title: String,
    /// Primary industry of the template
    #[serde(default)]
    pub primary_industry: String,
    /// Secondary industry of the template
    #[serde(default)]
    pub deputy_industry: String,
    /// Template body with placeholder markup
    pub content: String,
    /// Rendered example
    #[serde(default)]
    pub example: String,
}

/// The account's private template list.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateList {
    /// All templates owned by the account
    pub template_list: Vec<TemplateInfo>,
}

/// Response to a mass broadcast submission.
#[derive(Debug, Clone, Deserialize)]
pub struct MassSendResponse {
    /// Message ID assigned to the broadcast task
    pub msg_id: u64,
    /// Secondary ID present for some message types
    #[serde(default)]
    pub msg_data_id: Option<u64>,
}

/// Subscriber profile returned by the user-info endpoint.
///
/// When `subscribe` is 0 the platform omits the profile fields, so they
/// are all optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// 1 if the user subscribes to the account, 0 otherwise
    pub subscribe: u8,
    /// User's unique ID for this account
    pub openid: String,
    /// Nickname
    #[serde(default)]
    pub nickname: Option<String>,
    /// Preferred language
    #[serde(default)]
    pub language: Option<String>,
    /// Unix timestamp of the subscription
    #[serde(default)]
    pub subscribe_time: Option<u64>,
    /// Operator-assigned remark
    #[serde(default)]
    pub remark: Option<String>,
    /// Group the user belongs to
    #[serde(default)]
    pub groupid: Option<i64>,
    /// Tags applied to the user
    #[serde(default)]
    pub tagid_list: Vec<i64>,
}

impl UserInfo {
    /// Whether the user currently subscribes to the account.
    pub fn is_subscribed(&self) -> bool {
        self.subscribe == 1
    }
}

/// User-scoped token from the web authorization code exchange.
///
/// Distinct from the app access token: it authorizes delegated calls on
/// behalf of one user and is never injected automatically.
#[derive(Debug, Clone, Deserialize)]
pub struct SnsToken {
    /// The user-scoped access token
    pub access_token: String,
    /// Server-declared lifetime in seconds
    pub expires_in: u64,
    /// Token for refreshing the user-scoped token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The authorizing user's ID
    pub openid: String,
    /// Granted scope
    #[serde(default)]
    pub scope: Option<String>,
}

/// User profile pulled with a user-scoped token.
#[derive(Debug, Clone, Deserialize)]
pub struct SnsUserInfo {
    /// The user's ID
    pub openid: String,
    /// Nickname
    #[serde(default)]
    pub nickname: Option<String>,
    /// 1 male, 2 female, 0 unknown
    #[serde(default)]
    pub sex: Option<u8>,
    /// Province
    #[serde(default)]
    pub province: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub headimgurl: Option<String>,
    /// Privilege labels
    #[serde(default)]
    pub privilege: Vec<String>,
}

/// Signed configuration handed to the browser-side JS-SDK.
///
/// Serializes with the platform's field names (`appId`, `timestamp`,
/// `nonceStr`, `signature`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsSdkConfig {
    /// The application identifier
    pub app_id: String,
    /// Unix timestamp used in the signature
    pub timestamp: u64,
    /// Nonce used in the signature
    pub nonce_str: String,
    /// Lowercase hex SHA-1 signature
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jssdk_config_field_names() {
        let config = JsSdkConfig {
            app_id: "wx1234".to_string(),
            timestamp: 1_414_587_457,
            nonce_str: "abc".to_string(),
            signature: "sig".to_string(),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["appId"], "wx1234");
        assert_eq!(json["timestamp"], 1_414_587_457);
        assert_eq!(json["nonceStr"], "abc");
        assert_eq!(json["signature"], "sig");
    }

    #[test]
    fn test_user_info_minimal_body() {
        // Unsubscribed users come back with only the flag and openid.
        let info: UserInfo =
            serde_json::from_value(serde_json::json!({"subscribe": 0, "openid": "o123"})).unwrap();
        assert!(!info.is_subscribed());
        assert!(info.nickname.is_none());
        assert!(info.tagid_list.is_empty());
    }

    #[test]
    fn test_ack_ignores_envelope_fields() {
        let _: Ack = serde_json::from_value(serde_json::json!({"errcode": 0, "errmsg": "ok"})).unwrap();
    }
}
