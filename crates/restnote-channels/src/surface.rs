//! Surface side channel
//!
//! The display surface posts asynchronous messages at the kernel; the
//! only recognized command persists a previously rendered response
//! through the external storage collaborator. Anything else is ignored.
//! Storage failures become transient notifications, never errors — the
//! side channel must not be able to break cell state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

/// Command recognized by the side channel.
pub const COMMAND_PERSIST_RESPONSE: &str = "persist-response";

/// Destination name used when the payload carries no usable URL.
pub const FALLBACK_DESTINATION: &str = "unknown-url";

/// One message posted by the display surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceMessage {
    pub command: String,
    #[serde(default)]
    pub data: Value,
}

impl SurfaceMessage {
    /// Build a persist-response message.
    pub fn persist_response(data: Value) -> Self {
        Self {
            command: COMMAND_PERSIST_RESPONSE.to_string(),
            data,
        }
    }
}

/// Storage collaborator failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage write failed: {0}")]
    Write(String),
}

/// External storage collaborator.
#[async_trait]
pub trait ResponseStorage: Send + Sync {
    /// Prompt for a destination and write the payload.
    ///
    /// A user-cancelled prompt is a successful no-op, not an error.
    async fn prompt_and_write(
        &self,
        suggested_name: &str,
        payload: &Value,
    ) -> Result<(), StorageError>;
}

/// Transient, non-blocking user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Handler for surface messages.
pub struct SideChannel {
    storage: Arc<dyn ResponseStorage>,
    notifier: Arc<dyn Notifier>,
}

impl SideChannel {
    pub fn new(storage: Arc<dyn ResponseStorage>, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    /// Handle one surface message. Unknown commands are ignored.
    pub async fn handle(&self, message: SurfaceMessage) {
        match message.command.as_str() {
            COMMAND_PERSIST_RESPONSE => self.persist_response(message.data).await,
            other => {
                tracing::debug!(command = other, "ignoring unrecognized surface command");
            }
        }
    }

    /// Drain surface messages from a queue until every sender is gone.
    ///
    /// Surfaces post messages instead of registering callbacks; this loop
    /// is the receiving end.
    pub async fn serve(&self, mut messages: mpsc::Receiver<SurfaceMessage>) {
        while let Some(message) = messages.recv().await {
            self.handle(message).await;
        }
    }

    async fn persist_response(&self, payload: Value) {
        let name = suggested_file_name(&payload, Utc::now());
        if let Err(error) = self.storage.prompt_and_write(&name, &payload).await {
            tracing::warn!(error = %error, name = %name, "failed to persist response");
            self.notifier
                .notify(&format!("Failed to save response: {error}"))
                .await;
        }
    }
}

/// Suggested file name for a persisted response payload.
///
/// The payload is expected in the structured render shape; the final
/// resolved URL is read from `request.url` when present.
pub fn suggested_file_name(payload: &Value, now: DateTime<Utc>) -> String {
    let name = payload
        .get("request")
        .and_then(|request| request.get("url"))
        .and_then(|url| url.as_str())
        .map(destination_name)
        .unwrap_or_else(|| FALLBACK_DESTINATION.to_string());
    let date = now.format("%a-%b-%d-%Y");
    format!("response-{name}-{date}.json")
}

/// Short destination name derived from a URL host.
///
/// Strips the outermost subdomain label and the top-level suffix, then
/// replaces the remaining dots with hyphens.
pub fn destination_name(url: &str) -> String {
    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_string()))
    else {
        return FALLBACK_DESTINATION.to_string();
    };

    let mut labels: Vec<&str> = host.split('.').filter(|label| !label.is_empty()).collect();
    if labels.is_empty() {
        return FALLBACK_DESTINATION.to_string();
    }
    if labels.len() >= 2 {
        labels.remove(0);
    }
    if labels.len() >= 2 {
        labels.pop();
    }
    labels.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::RwLock;

    struct RecordingStorage {
        writes: RwLock<Vec<(String, Value)>>,
        fail: bool,
    }

    impl RecordingStorage {
        fn new(fail: bool) -> Self {
            Self {
                writes: RwLock::new(Vec::new()),
                fail,
            }
        }

        fn writes(&self) -> Vec<(String, Value)> {
            self.writes.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResponseStorage for RecordingStorage {
        async fn prompt_and_write(
            &self,
            suggested_name: &str,
            payload: &Value,
        ) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Write("disk full".to_string()));
            }
            self.writes
                .write()
                .unwrap()
                .push((suggested_name.to_string(), payload.clone()));
            Ok(())
        }
    }

    struct RecordingNotifier {
        messages: RwLock<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                messages: RwLock::new(Vec::new()),
            }
        }

        fn messages(&self) -> Vec<String> {
            self.messages.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) {
            self.messages.write().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_destination_name_strips_subdomain_and_suffix() {
        assert_eq!(destination_name("https://www.example.com/path"), "example");
        assert_eq!(
            destination_name("https://api.eu.example.co.uk/v1"),
            "eu-example-co"
        );
    }

    #[test]
    fn test_destination_name_with_two_labels_keeps_the_remainder() {
        assert_eq!(destination_name("https://example.com/"), "com");
    }

    #[test]
    fn test_destination_name_falls_back_on_unparsable_url() {
        assert_eq!(destination_name("definitely not a url"), FALLBACK_DESTINATION);
    }

    #[test]
    fn test_suggested_file_name_appends_the_current_date() {
        let payload = json!({"request": {"url": "https://www.example.com/a"}});
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            suggested_file_name(&payload, now),
            "response-example-Fri-Jan-01-2021.json"
        );
    }

    #[test]
    fn test_suggested_file_name_without_url_uses_placeholder() {
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            suggested_file_name(&json!({"status": 200}), now),
            "response-unknown-url-Fri-Jan-01-2021.json"
        );
    }

    #[test]
    fn test_persist_response_forwards_payload_unmodified() {
        tokio_test::block_on(async {
            let storage = Arc::new(RecordingStorage::new(false));
            let notifier = Arc::new(RecordingNotifier::new());
            let channel = SideChannel::new(storage.clone(), notifier.clone());

            let payload = json!({"status": 200, "request": {"url": "https://www.example.com/a"}});
            channel
                .handle(SurfaceMessage::persist_response(payload.clone()))
                .await;

            let writes = storage.writes();
            assert_eq!(writes.len(), 1);
            assert!(writes[0].0.starts_with("response-example-"));
            assert_eq!(writes[0].1, payload);
            assert!(notifier.messages().is_empty());
        });
    }

    #[test]
    fn test_unknown_command_is_ignored_without_error() {
        tokio_test::block_on(async {
            let storage = Arc::new(RecordingStorage::new(false));
            let notifier = Arc::new(RecordingNotifier::new());
            let channel = SideChannel::new(storage.clone(), notifier.clone());

            channel
                .handle(SurfaceMessage {
                    command: "reticulate-splines".to_string(),
                    data: json!({}),
                })
                .await;

            assert!(storage.writes().is_empty());
            assert!(notifier.messages().is_empty());
        });
    }

    #[test]
    fn test_serve_drains_queued_messages_in_order() {
        tokio_test::block_on(async {
            let storage = Arc::new(RecordingStorage::new(false));
            let notifier = Arc::new(RecordingNotifier::new());
            let channel = SideChannel::new(storage.clone(), notifier);

            let (tx, rx) = mpsc::channel(8);
            tx.send(SurfaceMessage::persist_response(
                json!({"request": {"url": "https://www.first.example/"}}),
            ))
            .await
            .unwrap();
            tx.send(SurfaceMessage {
                command: "noise".to_string(),
                data: json!({}),
            })
            .await
            .unwrap();
            tx.send(SurfaceMessage::persist_response(
                json!({"request": {"url": "https://www.second.example/"}}),
            ))
            .await
            .unwrap();
            drop(tx);

            channel.serve(rx).await;

            let writes = storage.writes();
            assert_eq!(writes.len(), 2);
            assert!(writes[0].0.starts_with("response-first-"));
            assert!(writes[1].0.starts_with("response-second-"));
        });
    }

    #[test]
    fn test_storage_failure_becomes_a_notification() {
        tokio_test::block_on(async {
            let storage = Arc::new(RecordingStorage::new(true));
            let notifier = Arc::new(RecordingNotifier::new());
            let channel = SideChannel::new(storage, notifier.clone());

            channel
                .handle(SurfaceMessage::persist_response(json!({"status": 200})))
                .await;

            let messages = notifier.messages();
            assert_eq!(messages.len(), 1);
            assert!(messages[0].contains("disk full"));
        });
    }
}
