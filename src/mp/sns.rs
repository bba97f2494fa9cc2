//! Web authorization (sns) flow for user-scoped credentials.
//!
//! The platform's redirect-based handshake, expressed as explicit typed
//! steps instead of web-framework hooks: each helper either finishes with
//! a typed outcome or tells the caller where to send the user agent next.
//! Integrations translate [`AuthStep::Redirect`] into whatever redirect
//! mechanism their framework provides.

use url::Url;

use crate::error::WechatError;
use crate::mp::rest::sns as sns_endpoints;
use crate::mp::rest::{ApiRequest, Auth, MpRestClient};
use crate::mp::rest::types::{SnsToken, SnsUserInfo, UserInfo};

/// Authorization scope for the web flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnsScope {
    /// Silent authorization; yields only the user's openid.
    Base,
    /// Consent-prompting authorization; unlocks profile access.
    UserInfo,
}

impl SnsScope {
    /// The scope's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SnsScope::Base => "snsapi_base",
            SnsScope::UserInfo => "snsapi_userinfo",
        }
    }
}

impl std::fmt::Display for SnsScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next step of a redirect-based flow.
#[derive(Debug, Clone)]
pub enum AuthStep<T> {
    /// Send the user agent to this URL, then re-enter the flow.
    Redirect(Url),
    /// The flow finished with a typed outcome.
    Complete(T),
}

/// User identity established by a completed authorization.
#[derive(Debug, Clone)]
pub struct SnsSession {
    /// The authorizing user's openid
    pub openid: String,
    /// The user-scoped access token for delegated calls
    pub user_token: String,
}

impl MpRestClient {
    /// Build the authorization page URL that starts the web flow.
    ///
    /// After the user passes the page, the platform redirects to
    /// `redirect_uri` with `code` (and `state`) appended as query
    /// parameters.
    pub fn authorize_url(
        &self,
        scope: SnsScope,
        redirect_uri: &str,
        state: &str,
    ) -> Result<Url, WechatError> {
        let mut url = Url::parse(&format!("{}{}", self.authorize_base_url(), sns_endpoints::AUTHORIZE))?;
        url.query_pairs_mut()
            .append_pair("appid", self.app_id())
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", scope.as_str())
            .append_pair("state", state);
        // The platform requires this marker fragment on authorize links.
        url.set_fragment(Some("wechat_redirect"));
        Ok(url)
    }

    /// Exchange an authorization code for a user-scoped token.
    ///
    /// Authorized by appid and secret; the app access token is not
    /// involved and not injected.
    pub async fn exchange_code(&self, code: &str) -> Result<SnsToken, WechatError> {
        self.execute(
            ApiRequest::get(sns_endpoints::ACCESS_TOKEN)
                .auth(Auth::None)
                .query("appid", self.app_id())
                .query("secret", self.credentials().expose_secret())
                .query("code", code)
                .query("grant_type", "authorization_code"),
        )
        .await
    }

    /// Pull a user's profile with a user-scoped token.
    ///
    /// Requires a token from a [`SnsScope::UserInfo`] authorization. The
    /// delegated token is sent as-is and never replaced by the app access
    /// token.
    pub async fn sns_user_info(
        &self,
        user_token: &str,
        openid: &str,
        lang: &str,
    ) -> Result<SnsUserInfo, WechatError> {
        self.execute(
            ApiRequest::get(sns_endpoints::USER_INFO)
                .auth(Auth::Delegated)
                .query("access_token", user_token)
                .query("openid", openid)
                .query("lang", lang),
        )
        .await
    }

    /// Advance the silent (base-scope) authorization flow for a request to
    /// `current_url`.
    ///
    /// Without a `code` query parameter the flow has not started: the
    /// caller should redirect to the returned authorization URL, which
    /// brings the user back to `current_url` with a code attached. With a
    /// code, the flow completes by exchanging it for the user's identity.
    pub async fn resolve_authorization(
        &self,
        current_url: &Url,
    ) -> Result<AuthStep<SnsSession>, WechatError> {
        let code = current_url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned());

        match code {
            None => {
                let authorize =
                    self.authorize_url(SnsScope::Base, current_url.as_str(), "")?;
                Ok(AuthStep::Redirect(authorize))
            }
            Some(code) => {
                let token = self.exchange_code(&code).await?;
                Ok(AuthStep::Complete(SnsSession {
                    openid: token.openid,
                    user_token: token.access_token,
                }))
            }
        }
    }

    /// Gate a page on the user subscribing to the account.
    ///
    /// Completes with the user's profile when subscribed; otherwise
    /// redirects to `fallback_url`, or to the builder-configured
    /// subscribe URL when no fallback is given.
    pub async fn require_subscriber(
        &self,
        openid: &str,
        fallback_url: Option<&str>,
    ) -> Result<AuthStep<UserInfo>, WechatError> {
        let info = self.get_user_info(openid, "zh_CN").await?;
        if info.is_subscribed() {
            return Ok(AuthStep::Complete(info));
        }
        let target = fallback_url
            .or_else(|| self.subscribe_url())
            .ok_or(WechatError::MissingSubscribeUrl)?;
        Ok(AuthStep::Redirect(Url::parse(target)?))
    }
}
