//! WeChat Official Account REST client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::{
    AppCredentials, BoxFuture, CredentialCache, CredentialFetcher, CredentialKind,
    FetchedCredential,
};
use crate::error::{Classified, WechatError, classify};
use crate::mp::rest::endpoints::{API_BASE_URL, OPEN_BASE_URL, token};
use crate::mp::rest::types::{AccessTokenResponse, JsapiTicketResponse};

/// Per-attempt timeout applied to generic API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded retry policy for the request executor.
///
/// `max_attempts` counts total attempts, not re-tries: the default of 3
/// means one initial call plus at most two more. There is no delay between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed for retryable failures
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Whether a failed attempt may be retried under this policy.
    ///
    /// Credential invalidation and timeouts qualify; everything else is
    /// surfaced immediately.
    pub fn is_retryable(&self, error: &WechatError) -> bool {
        matches!(
            error,
            WechatError::CredentialInvalid(_) | WechatError::Timeout
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// How a request is authorized before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Inject the cached app access token as the `access_token` query parameter.
    App,
    /// The query already carries a delegated user-scoped token; leave it untouched.
    Delegated,
    /// No credential at all (code exchange carries appid and secret instead).
    None,
}

/// One outbound API call, described before dispatch.
pub(crate) struct ApiRequest {
    method: Method,
    path: &'static str,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    timeout: Option<Duration>,
    auth: Auth,
}

impl ApiRequest {
    pub(crate) fn get(path: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
            timeout: None,
            auth: Auth::App,
        }
    }

    pub(crate) fn post(path: &'static str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            query: Vec::new(),
            body: Some(body),
            timeout: None,
            auth: Auth::App,
        }
    }

    pub(crate) fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub(crate) fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub(crate) fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The WeChat Official Account REST client.
///
/// The client owns the credential cache and wraps every outbound call with
/// bounded retry: a server-reported credential invalidation forces a token
/// refresh before the next attempt, and timeouts are re-attempted as-is.
///
/// # Example
///
/// ```rust,no_run
/// use wechat_mp_client::mp::rest::MpRestClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = MpRestClient::new("wx-app-id", "app-secret");
///     let templates = client.get_all_private_templates().await?;
///     println!("{} templates", templates.template_list.len());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MpRestClient {
    http: ClientWithMiddleware,
    api_base_url: String,
    authorize_base_url: String,
    credentials: AppCredentials,
    tokens: Arc<CredentialCache>,
    timeout: Duration,
    retry: RetryPolicy,
    subscribe_url: Option<String>,
}

impl MpRestClient {
    /// Create a client with default settings for the given app identity.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self::builder(app_id, app_secret).build()
    }

    /// Create a new client builder.
    pub fn builder(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> MpRestClientBuilder {
        MpRestClientBuilder::new(app_id, app_secret)
    }

    /// The application identifier this client acts as.
    pub fn app_id(&self) -> &str {
        &self.credentials.app_id
    }

    /// Current app access token, fetching a fresh one when the cached value
    /// has less than the safety margin left or `force` is set.
    pub async fn access_token(&self, force: bool) -> Result<String, WechatError> {
        Ok(self
            .tokens
            .get(CredentialKind::AccessToken, force)
            .await?
            .value)
    }

    /// Current jsapi ticket, refreshed under the same margin rule.
    pub async fn jsapi_ticket(&self, force: bool) -> Result<String, WechatError> {
        Ok(self
            .tokens
            .get(CredentialKind::JsapiTicket, force)
            .await?
            .value)
    }

    pub(crate) fn tokens(&self) -> &CredentialCache {
        &self.tokens
    }

    pub(crate) fn credentials(&self) -> &AppCredentials {
        &self.credentials
    }

    pub(crate) fn authorize_base_url(&self) -> &str {
        &self.authorize_base_url
    }

    pub(crate) fn subscribe_url(&self) -> Option<&str> {
        self.subscribe_url.as_deref()
    }

    /// Run one API call through the retry loop.
    ///
    /// Retryable failures (credential invalidation, timeouts) are absorbed
    /// up to the attempt cap; the last classified error surfaces if the cap
    /// is reached. Fatal errors surface immediately.
    pub(crate) async fn execute<T>(&self, request: ApiRequest) -> Result<T, WechatError>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 1u32;
        loop {
            match self.dispatch::<T>(&request).await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.retry.max_attempts && self.retry.is_retryable(&error) => {
                    tracing::debug!(attempt, path = request.path, %error, "retrying request");
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// One attempt: inject the credential, send, classify.
    async fn dispatch<T>(&self, request: &ApiRequest) -> Result<T, WechatError>
    where
        T: DeserializeOwned,
    {
        let mut url = Url::parse(&format!("{}{}", self.api_base_url, request.path))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        if request.auth == Auth::App {
            let token = self.tokens.get(CredentialKind::AccessToken, false).await?;
            url.query_pairs_mut().append_pair("access_token", &token.value);
        }

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .timeout(request.timeout.unwrap_or(self.timeout));
        if let Some(body) = &request.body {
            // serde_json leaves non-ASCII text unescaped, as the platform expects.
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_middleware_error)?;
        let response = response.error_for_status().map_err(map_reqwest_error)?;
        let body: Value = response.json().await.map_err(map_reqwest_error)?;

        match classify(&body) {
            Classified::Success => Ok(serde_json::from_value(body)?),
            Classified::CredentialInvalid(error) => {
                if request.auth == Auth::App {
                    tracing::warn!(code = error.code, "access token rejected, invalidating cache");
                    self.tokens.invalidate(CredentialKind::AccessToken).await;
                }
                Err(WechatError::CredentialInvalid(error))
            }
            Classified::ClientError(error) => Err(WechatError::Api(error)),
        }
    }
}

impl std::fmt::Debug for MpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpRestClient")
            .field("api_base_url", &self.api_base_url)
            .field("app_id", &self.credentials.app_id)
            .finish()
    }
}

/// Builder for [`MpRestClient`].
pub struct MpRestClientBuilder {
    api_base_url: String,
    authorize_base_url: String,
    credentials: AppCredentials,
    timeout: Duration,
    retry: RetryPolicy,
    subscribe_url: Option<String>,
    user_agent: Option<String>,
    fetcher: Option<Arc<dyn CredentialFetcher>>,
}

impl MpRestClientBuilder {
    /// Create a new builder for the given app identity.
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            authorize_base_url: OPEN_BASE_URL.to_string(),
            credentials: AppCredentials::new(app_id, app_secret),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            subscribe_url: None,
            user_agent: None,
            fetcher: None,
        }
    }

    /// Set the API base URL (useful for testing with a mock server).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the base URL of the authorization pages.
    pub fn authorize_base_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_base_url = url.into();
        self
    }

    /// Set the per-attempt timeout for generic API calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the total number of attempts for retryable failures.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry = RetryPolicy { max_attempts };
        self
    }

    /// Set the page unsubscribed users are redirected to by
    /// [`require_subscriber`](MpRestClient::require_subscriber).
    pub fn subscribe_url(mut self, url: impl Into<String>) -> Self {
        self.subscribe_url = Some(url.into());
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the credential fetcher.
    ///
    /// This is the extension point for multi-process deployments that keep
    /// token state in external storage instead of the platform default.
    pub fn credential_fetcher(mut self, fetcher: Arc<dyn CredentialFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the client.
    pub fn build(self) -> MpRestClient {
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("wechat-mp-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("wechat-mp-client"));
        headers.insert(USER_AGENT, header_value);

        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let http = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let fetcher = self.fetcher.unwrap_or_else(|| {
            Arc::new(TokenEndpointFetcher::new(
                http.clone(),
                self.api_base_url.clone(),
                self.credentials.clone(),
                self.timeout,
            ))
        });

        MpRestClient {
            http,
            api_base_url: self.api_base_url,
            authorize_base_url: self.authorize_base_url,
            credentials: self.credentials,
            tokens: Arc::new(CredentialCache::new(fetcher)),
            timeout: self.timeout,
            retry: self.retry,
            subscribe_url: self.subscribe_url,
        }
    }
}

/// Default [`CredentialFetcher`] backed by the platform's token endpoints.
pub struct TokenEndpointFetcher {
    http: ClientWithMiddleware,
    api_base_url: String,
    credentials: AppCredentials,
    timeout: Duration,
}

impl TokenEndpointFetcher {
    /// Create a fetcher that grants tokens for the given app identity.
    pub fn new(
        http: ClientWithMiddleware,
        api_base_url: impl Into<String>,
        credentials: AppCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into(),
            credentials,
            timeout,
        }
    }

    async fn fetch_envelope<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WechatError>
    where
        T: DeserializeOwned,
    {
        let mut url = Url::parse(&format!("{}{}", self.api_base_url, path))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_middleware_error)?;
        let response = response.error_for_status().map_err(map_reqwest_error)?;
        let body: Value = response.json().await.map_err(map_reqwest_error)?;

        match classify(&body) {
            Classified::Success => Ok(serde_json::from_value(body)?),
            Classified::CredentialInvalid(error) => Err(WechatError::CredentialInvalid(error)),
            Classified::ClientError(error) => Err(WechatError::Api(error)),
        }
    }
}

impl CredentialFetcher for TokenEndpointFetcher {
    fn fetch_access_token(&self) -> BoxFuture<'_, Result<FetchedCredential, WechatError>> {
        Box::pin(async move {
            let response: AccessTokenResponse = self
                .fetch_envelope(
                    token::GRANT_TOKEN,
                    &[
                        ("grant_type", "client_credential"),
                        ("appid", &self.credentials.app_id),
                        ("secret", self.credentials.expose_secret()),
                    ],
                )
                .await?;
            Ok(FetchedCredential {
                value: response.access_token,
                expires_in: response.expires_in,
            })
        })
    }

    fn fetch_jsapi_ticket<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<FetchedCredential, WechatError>> {
        Box::pin(async move {
            let response: JsapiTicketResponse = self
                .fetch_envelope(
                    token::GET_TICKET,
                    &[("type", "jsapi"), ("access_token", access_token)],
                )
                .await?;
            Ok(FetchedCredential {
                value: response.ticket,
                expires_in: response.expires_in,
            })
        })
    }
}

fn map_middleware_error(error: reqwest_middleware::Error) -> WechatError {
    match error {
        reqwest_middleware::Error::Reqwest(error) => map_reqwest_error(error),
        other => WechatError::HttpMiddleware(other),
    }
}

fn map_reqwest_error(error: reqwest::Error) -> WechatError {
    // Connect and read timeouts are the only retryable transport failures.
    if error.is_timeout() {
        WechatError::Timeout
    } else {
        WechatError::Http(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_retry_policy_predicate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.is_retryable(&WechatError::Timeout));
        assert!(policy.is_retryable(&WechatError::CredentialInvalid(ApiError::new(
            40001,
            "invalid credential"
        ))));
        assert!(!policy.is_retryable(&WechatError::Api(ApiError::new(40013, "invalid appid"))));
        assert!(!policy.is_retryable(&WechatError::MissingSubscribeUrl));
    }

    #[test]
    fn test_builder_defaults() {
        let client = MpRestClient::builder("wx1234", "secret").build();
        assert_eq!(client.app_id(), "wx1234");
        assert_eq!(client.api_base_url, API_BASE_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
        assert_eq!(client.retry, RetryPolicy { max_attempts: 3 });
    }

    #[test]
    fn test_debug_omits_secret() {
        let client = MpRestClient::new("wx1234", "super_secret");
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("super_secret"));
    }
}
