//! Signed configuration for the browser-side JS-SDK.

use crate::auth::{CredentialKind, JSSDK_NONCE_LEN, JsapiSignInput, nonce_string, unix_now};
use crate::error::WechatError;
use crate::mp::rest::MpRestClient;
use crate::mp::rest::types::JsSdkConfig;

impl MpRestClient {
    /// Build the signed configuration the JS-SDK needs to initialize on a
    /// page.
    ///
    /// `url` must be the page's current URL without any fragment component;
    /// callers are responsible for stripping it. The jsapi ticket comes
    /// from the credential cache and is refreshed under the usual margin
    /// rule.
    pub async fn jssdk_config(&self, url: &str) -> Result<JsSdkConfig, WechatError> {
        let ticket = self.tokens().get(CredentialKind::JsapiTicket, false).await?;
        let input = JsapiSignInput {
            jsapi_ticket: ticket.value,
            noncestr: nonce_string(JSSDK_NONCE_LEN),
            timestamp: unix_now(),
            url: url.to_string(),
        };
        let signature = input.signature();

        Ok(JsSdkConfig {
            app_id: self.app_id().to_string(),
            timestamp: input.timestamp,
            nonce_str: input.noncestr,
            signature,
        })
    }
}
