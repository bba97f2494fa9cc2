//! WeChat platform endpoint constants.

/// Base URL for the Official Account API.
pub const API_BASE_URL: &str = "https://api.weixin.qq.com";

/// Base URL for the open-platform pages (web authorization).
pub const OPEN_BASE_URL: &str = "https://open.weixin.qq.com";

/// Credential endpoints consumed by the default token fetcher.
pub mod token {
    /// Grant an app access token.
    pub const GRANT_TOKEN: &str = "/cgi-bin/token";
    /// Fetch a jsapi ticket (requires a valid access token).
    pub const GET_TICKET: &str = "/cgi-bin/ticket/getticket";
}

/// Template-message management endpoints.
pub mod template {
    /// Set the account's industry.
    pub const SET_INDUSTRY: &str = "/cgi-bin/template/api_set_industry";
    /// Get the configured industry.
    pub const GET_INDUSTRY: &str = "/cgi-bin/template/get_industry";
    /// Obtain a template ID from the template library.
    pub const ADD_TEMPLATE: &str = "/cgi-bin/template/api_add_template";
    /// List the account's private templates.
    pub const ALL_PRIVATE_TEMPLATES: &str = "/cgi-bin/template/get_all_private_template";
    /// Delete a private template.
    pub const DEL_PRIVATE_TEMPLATE: &str = "/cgi-bin/template/del_private_template";
}

/// Mass-messaging endpoints.
pub mod message {
    /// Broadcast to all subscribers.
    pub const MASS_SEND_ALL: &str = "/cgi-bin/message/mass/sendall";
}

/// Subscriber endpoints.
pub mod user {
    /// Subscriber profile lookup.
    pub const INFO: &str = "/cgi-bin/user/info";
}

/// Web authorization (sns) endpoints.
pub mod sns {
    /// Authorization page (on [`OPEN_BASE_URL`](super::OPEN_BASE_URL)).
    pub const AUTHORIZE: &str = "/connect/oauth2/authorize";
    /// Exchange an authorization code for a user-scoped token.
    pub const ACCESS_TOKEN: &str = "/sns/oauth2/access_token";
    /// Pull user info with a user-scoped token.
    pub const USER_INFO: &str = "/sns/userinfo";
}
