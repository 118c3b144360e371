//! In-memory push transport.
//!
//! Records every accepted message instead of delivering anywhere, and
//! supports per-token failure injection. Used as the default backend in
//! development and as the transport double in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashSet;

use super::{MulticastReport, PushError, PushTransport};

/// A message accepted by the in-memory transport.
#[derive(Debug, Clone)]
pub struct SentPush {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

/// In-memory push transport backend.
pub struct MemoryPushTransport {
    sent: Mutex<Vec<SentPush>>,
    failing_tokens: DashSet<String>,
}

impl MemoryPushTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_tokens: DashSet::new(),
        }
    }

    /// Make every send to `token` fail from now on.
    pub fn fail_token(&self, token: impl Into<String>) {
        self.failing_tokens.insert(token.into());
    }

    /// All messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().expect("sent log poisoned").clone()
    }

    /// Messages accepted for a specific token.
    pub fn sent_to(&self, token: &str) -> Vec<SentPush> {
        self.sent()
            .into_iter()
            .filter(|m| m.token == token)
            .collect()
    }

    fn record(&self, token: &str, title: &str, body: &str, data: &HashMap<String, String>) {
        self.sent.lock().expect("sent log poisoned").push(SentPush {
            token: token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            data: data.clone(),
        });
    }
}

impl Default for MemoryPushTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushTransport for MemoryPushTransport {
    async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), PushError> {
        if self.failing_tokens.contains(token) {
            return Err(PushError::Rejected(format!(
                "token {} rejected by transport",
                token
            )));
        }

        self.record(token, title, body, data);
        Ok(())
    }

    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> MulticastReport {
        let mut report = MulticastReport::default();

        for token in tokens {
            if self.failing_tokens.contains(token.as_str()) {
                report.failed += 1;
                tracing::debug!(token = %token, "Multicast send failed for token");
            } else {
                self.record(token, title, body, data);
                report.delivered += 1;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_records_message() {
        let transport = MemoryPushTransport::new();
        let data = HashMap::from([("k".to_string(), "v".to_string())]);

        transport.send("tok-1", "title", "body", &data).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "tok-1");
        assert_eq!(sent[0].data.get("k").map(String::as_str), Some("v"));
    }

    #[tokio::test]
    async fn test_failing_token_rejects_single_send() {
        let transport = MemoryPushTransport::new();
        transport.fail_token("bad");

        let result = transport.send("bad", "t", "b", &HashMap::new()).await;
        assert!(matches!(result, Err(PushError::Rejected(_))));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_multicast_is_best_effort_per_token() {
        let transport = MemoryPushTransport::new();
        transport.fail_token("bad");

        let tokens = vec!["a".to_string(), "bad".to_string(), "c".to_string()];
        let report = transport
            .send_multicast(&tokens, "t", "b", &HashMap::new())
            .await;

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(transport.sent().len(), 2);
    }
}
