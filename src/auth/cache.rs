//! Cached short-lived credentials issued by the platform.
//!
//! The platform hands out two independent secrets: the app access token
//! (required on nearly every API call) and the jsapi ticket (used only to
//! sign JS-SDK configurations). Both expire server-side after a declared
//! time-to-live, so the cache refreshes each one before its expiry and on
//! server-reported invalidation.
//!
//! How fresh values are obtained is injected through [`CredentialFetcher`];
//! deployments that share credentials across processes can supply their own
//! implementation backed by external storage.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::error::WechatError;

/// Seconds a credential must still have left to be considered usable.
///
/// The margin trades a little wasted lifetime for never putting a
/// credential on the wire that could expire mid-flight at the server.
pub const FRESHNESS_MARGIN_SECS: u64 = 60;

/// Boxed `Send` future returned by [`CredentialFetcher`] methods, so the
/// trait stays object-safe behind `Arc<dyn CredentialFetcher>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Current unix time in whole seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Which of the two platform secrets a cache operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// The app access token
    AccessToken,
    /// The jsapi ticket used for JS-SDK signatures
    JsapiTicket,
}

/// A credential value together with its absolute expiry.
///
/// Value and expiry are always replaced together; the cache never
/// partially updates a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// The secret itself
    pub value: String,
    /// Unix timestamp (seconds) at which the platform expires it
    pub expires_at: u64,
}

impl Credential {
    /// Whether the credential is still usable at `now`, honoring the
    /// safety margin.
    pub fn is_fresh(&self, now: u64) -> bool {
        self.expires_at.saturating_sub(now) > FRESHNESS_MARGIN_SECS
    }
}

/// A freshly fetched credential value and its server-declared lifetime.
#[derive(Debug, Clone)]
pub struct FetchedCredential {
    /// The secret returned by the platform
    pub value: String,
    /// Server-declared time-to-live in seconds
    pub expires_in: u64,
}

/// Source of fresh credential values.
///
/// The default implementation calls the platform's token endpoints; tests
/// and multi-process deployments inject their own.
pub trait CredentialFetcher: Send + Sync {
    /// Fetch a fresh app access token.
    fn fetch_access_token(&self) -> BoxFuture<'_, Result<FetchedCredential, WechatError>>;

    /// Fetch a fresh jsapi ticket.
    ///
    /// The ticket endpoint itself requires a valid access token, which the
    /// cache resolves first and passes in.
    fn fetch_jsapi_ticket<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, Result<FetchedCredential, WechatError>>;
}

/// Cache for the two platform credentials.
///
/// Each kind has its own slot and its own timer: the two secrets come from
/// different endpoints and carry different lifetimes. Slots are guarded by
/// async mutexes so a single client instance can be shared across tasks;
/// the lock is held across a refresh, so concurrent callers needing the
/// same stale credential trigger only one fetch.
pub struct CredentialCache {
    fetcher: Arc<dyn CredentialFetcher>,
    access_token: Mutex<Option<Credential>>,
    jsapi_ticket: Mutex<Option<Credential>>,
}

impl CredentialCache {
    /// Create an empty cache around the given fetcher.
    pub fn new(fetcher: Arc<dyn CredentialFetcher>) -> Self {
        Self {
            fetcher,
            access_token: Mutex::new(None),
            jsapi_ticket: Mutex::new(None),
        }
    }

    /// Return the cached credential of `kind`, fetching a fresh one when
    /// missing, stale (less than the margin left), or `force` is set.
    ///
    /// Fetch failures propagate unchanged and leave the cached state as it
    /// was.
    pub async fn get(&self, kind: CredentialKind, force: bool) -> Result<Credential, WechatError> {
        match kind {
            CredentialKind::AccessToken => self.get_access_token(force).await,
            CredentialKind::JsapiTicket => self.get_jsapi_ticket(force).await,
        }
    }

    /// Clear the cached state for `kind`, forcing the next [`get`](Self::get)
    /// to fetch regardless of its `force` flag.
    ///
    /// Used after the server reports the credential invalid.
    pub async fn invalidate(&self, kind: CredentialKind) {
        let slot = match kind {
            CredentialKind::AccessToken => &self.access_token,
            CredentialKind::JsapiTicket => &self.jsapi_ticket,
        };
        *slot.lock().await = None;
        tracing::debug!(?kind, "invalidated cached credential");
    }

    async fn get_access_token(&self, force: bool) -> Result<Credential, WechatError> {
        let mut slot = self.access_token.lock().await;
        if !force {
            if let Some(credential) = slot.as_ref() {
                if credential.is_fresh(unix_now()) {
                    return Ok(credential.clone());
                }
            }
        }
        let fetched = self.fetcher.fetch_access_token().await?;
        let credential = store(&mut slot, fetched);
        tracing::debug!(expires_at = credential.expires_at, "refreshed access token");
        Ok(credential)
    }

    async fn get_jsapi_ticket(&self, force: bool) -> Result<Credential, WechatError> {
        let mut slot = self.jsapi_ticket.lock().await;
        if !force {
            if let Some(credential) = slot.as_ref() {
                if credential.is_fresh(unix_now()) {
                    return Ok(credential.clone());
                }
            }
        }
        // Lock order is ticket -> token only, never the reverse.
        let token = self.get_access_token(false).await?;
        let fetched = self.fetcher.fetch_jsapi_ticket(&token.value).await?;
        let credential = store(&mut slot, fetched);
        tracing::debug!(expires_at = credential.expires_at, "refreshed jsapi ticket");
        Ok(credential)
    }
}

fn store(slot: &mut Option<Credential>, fetched: FetchedCredential) -> Credential {
    let credential = Credential {
        value: fetched.value,
        expires_at: unix_now() + fetched.expires_in,
    };
    *slot = Some(credential.clone());
    credential
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Fetcher that counts calls and hands out numbered values.
    struct FakeFetcher {
        token_calls: AtomicUsize,
        ticket_calls: AtomicUsize,
        expires_in: u64,
        last_token_seen: std::sync::Mutex<Option<String>>,
    }

    impl FakeFetcher {
        fn new(expires_in: u64) -> Self {
            Self {
                token_calls: AtomicUsize::new(0),
                ticket_calls: AtomicUsize::new(0),
                expires_in,
                last_token_seen: std::sync::Mutex::new(None),
            }
        }
    }

    impl CredentialFetcher for FakeFetcher {
        fn fetch_access_token(&self) -> BoxFuture<'_, Result<FetchedCredential, WechatError>> {
            let n = self.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
            let expires_in = self.expires_in;
            Box::pin(async move {
                Ok(FetchedCredential {
                    value: format!("token-{n}"),
                    expires_in,
                })
            })
        }

        fn fetch_jsapi_ticket<'a>(
            &'a self,
            access_token: &'a str,
        ) -> BoxFuture<'a, Result<FetchedCredential, WechatError>> {
            let n = self.ticket_calls.fetch_add(1, Ordering::SeqCst) + 1;
            *self.last_token_seen.lock().unwrap() = Some(access_token.to_string());
            let expires_in = self.expires_in;
            Box::pin(async move {
                Ok(FetchedCredential {
                    value: format!("ticket-{n}"),
                    expires_in,
                })
            })
        }
    }

    fn cache_with(fetcher: &Arc<FakeFetcher>) -> CredentialCache {
        CredentialCache::new(fetcher.clone())
    }

    #[test]
    fn test_freshness_margin() {
        let credential = Credential {
            value: "t".to_string(),
            expires_at: 1_000,
        };
        assert!(credential.is_fresh(880)); // 120 s left
        assert!(!credential.is_fresh(970)); // 30 s left
        assert!(!credential.is_fresh(940)); // exactly 60 s left
        assert!(credential.is_fresh(939)); // 61 s left
        assert!(!credential.is_fresh(2_000)); // already expired
    }

    #[tokio::test]
    async fn test_fresh_credential_served_from_cache() {
        let fetcher = Arc::new(FakeFetcher::new(7_200));
        let cache = cache_with(&fetcher);

        let first = cache.get(CredentialKind::AccessToken, false).await.unwrap();
        let second = cache.get(CredentialKind::AccessToken, false).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_credential_refetched() {
        // 30 s of lifetime is inside the 60 s margin, so every get fetches.
        let fetcher = Arc::new(FakeFetcher::new(30));
        let cache = cache_with(&fetcher);

        let first = cache.get(CredentialKind::AccessToken, false).await.unwrap();
        let second = cache.get(CredentialKind::AccessToken, false).await.unwrap();

        assert_ne!(first.value, second.value);
        assert_eq!(fetcher.token_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_force_always_fetches() {
        let fetcher = Arc::new(FakeFetcher::new(7_200));
        let cache = cache_with(&fetcher);

        cache.get(CredentialKind::AccessToken, false).await.unwrap();
        let forced = cache.get(CredentialKind::AccessToken, true).await.unwrap();

        assert_eq!(forced.value, "token-2");
        assert_eq!(fetcher.token_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_fetch() {
        let fetcher = Arc::new(FakeFetcher::new(7_200));
        let cache = cache_with(&fetcher);

        cache.get(CredentialKind::AccessToken, false).await.unwrap();
        cache.invalidate(CredentialKind::AccessToken).await;
        let refreshed = cache.get(CredentialKind::AccessToken, false).await.unwrap();

        assert_eq!(refreshed.value, "token-2");
    }

    #[tokio::test]
    async fn test_ticket_returns_ticket_not_token() {
        let fetcher = Arc::new(FakeFetcher::new(7_200));
        let cache = cache_with(&fetcher);

        let ticket = cache.get(CredentialKind::JsapiTicket, false).await.unwrap();

        assert_eq!(ticket.value, "ticket-1");
    }

    #[tokio::test]
    async fn test_ticket_fetch_resolves_access_token_first() {
        let fetcher = Arc::new(FakeFetcher::new(7_200));
        let cache = cache_with(&fetcher);

        cache.get(CredentialKind::JsapiTicket, false).await.unwrap();

        assert_eq!(fetcher.token_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            fetcher.last_token_seen.lock().unwrap().as_deref(),
            Some("token-1")
        );
    }

    #[tokio::test]
    async fn test_kinds_have_independent_timers() {
        let fetcher = Arc::new(FakeFetcher::new(7_200));
        let cache = cache_with(&fetcher);

        cache.get(CredentialKind::JsapiTicket, false).await.unwrap();
        cache.invalidate(CredentialKind::AccessToken).await;

        // Ticket slot untouched by the token invalidation.
        cache.get(CredentialKind::JsapiTicket, false).await.unwrap();
        assert_eq!(fetcher.ticket_calls.load(Ordering::SeqCst), 1);
    }
}
