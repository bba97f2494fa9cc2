//! Mass-messaging endpoints.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::error::WechatError;
use crate::mp::rest::client::{ApiRequest, MpRestClient};
use crate::mp::rest::endpoints::message;
use crate::mp::rest::types::MassSendResponse;

/// UTF-8 byte cap the platform enforces on a plain-text broadcast.
pub const TEXT_BROADCAST_BYTE_LIMIT: usize = 2048;

/// Per-attempt timeout for broadcast submissions, which the platform
/// serves noticeably slower than ordinary calls.
pub const MASS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

impl MpRestClient {
    /// Broadcast a plain-text message to all subscribers.
    ///
    /// The content must stay under [`TEXT_BROADCAST_BYTE_LIMIT`] UTF-8
    /// bytes; oversized payloads are rejected locally with
    /// [`WechatError::PayloadTooLarge`] and never reach the wire.
    pub async fn send_text_to_all(&self, content: &str) -> Result<MassSendResponse, WechatError> {
        let size = content.len();
        if size >= TEXT_BROADCAST_BYTE_LIMIT {
            return Err(WechatError::PayloadTooLarge {
                size,
                limit: TEXT_BROADCAST_BYTE_LIMIT,
            });
        }

        let body = json!({
            "filter": { "is_to_all": true },
            "text": { "content": content },
            "msgtype": "text",
            // Deduplication key: the platform drops broadcasts that repeat
            // a recent clientmsgid.
            "clientmsgid": unix_millis(),
        });

        self.execute(
            ApiRequest::post(message::MASS_SEND_ALL, body).timeout(MASS_SEND_TIMEOUT),
        )
        .await
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_oversized_broadcast_rejected_locally() {
        // Base URL points nowhere; the guard must fire before any I/O.
        let client = MpRestClient::builder("wx1234", "secret")
            .api_base_url("http://127.0.0.1:9")
            .build();

        let content = "a".repeat(TEXT_BROADCAST_BYTE_LIMIT);
        let error = client.send_text_to_all(&content).await.unwrap_err();

        assert!(matches!(
            error,
            WechatError::PayloadTooLarge { size: 2048, limit: 2048 }
        ));
    }

    #[test]
    fn test_limit_counts_bytes_not_chars() {
        // 683 CJK chars are 2049 UTF-8 bytes.
        let content = "\u{4e2d}".repeat(683);
        assert!(content.chars().count() < TEXT_BROADCAST_BYTE_LIMIT);
        assert!(content.len() >= TEXT_BROADCAST_BYTE_LIMIT);
    }
}
