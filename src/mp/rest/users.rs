//! Subscriber endpoints.

use crate::error::WechatError;
use crate::mp::rest::client::{ApiRequest, MpRestClient};
use crate::mp::rest::endpoints::user;
use crate::mp::rest::types::UserInfo;

impl MpRestClient {
    /// Fetch the profile of a subscriber by openid.
    ///
    /// `lang` selects the localization of text fields, e.g. `zh_CN`,
    /// `zh_TW`, or `en`.
    pub async fn get_user_info(&self, openid: &str, lang: &str) -> Result<UserInfo, WechatError> {
        self.execute(
            ApiRequest::get(user::INFO)
                .query("openid", openid)
                .query("lang", lang),
        )
        .await
    }
}
