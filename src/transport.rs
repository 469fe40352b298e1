//! Seams to the chat transport
//!
//! The core never talks to a chat network directly. Inbound events arrive
//! through an [`EventSource`] and lead notifications leave through a
//! [`Notifier`]. This module ships a newline-delimited JSON source for
//! replaying exported events and a notifier that only logs.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::info;

use crate::error::{DeliveryError, LeadError, Result};
use crate::models::{InboundEvent, NotificationTarget};

/// Stream of inbound message events
#[async_trait]
pub trait EventSource: Send {
    /// Next event, `Ok(None)` once the source is exhausted.
    ///
    /// An `Err` concerns one event only; callers may keep reading.
    async fn next_event(&mut self) -> Result<Option<InboundEvent>>;
}

/// Outbound notification delivery
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a formatted notification to `target`
    async fn send(
        &self,
        target: &NotificationTarget,
        text: &str,
    ) -> std::result::Result<(), DeliveryError>;
}

/// Reads one JSON-encoded [`InboundEvent`] per line
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for JsonLinesSource<R> {
    async fn next_event(&mut self) -> Result<Option<InboundEvent>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            return serde_json::from_str(&line).map(Some).map_err(|e| {
                LeadError::Other(format!("Malformed event on line {}: {}", self.line_number, e))
            });
        }

        Ok(None)
    }
}

/// Dry-run notifier that writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        target: &NotificationTarget,
        text: &str,
    ) -> std::result::Result<(), DeliveryError> {
        info!(target_chat = %target, notification = %text, "Lead notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_json_lines_source_skips_blank_lines() {
        let input = concat!(
            "\n",
            r#"{"chat_id": 100, "message_id": 1, "text": "продам дом", "#,
            r#""date": "2026-01-01T10:00:00Z"}"#,
            "\n\n",
            r#"{"chat_id": 100, "message_id": 2, "sender_id": 7, "chat_title": "Flats", "#,
            r#""text": "куплю", "date": "2026-01-01T10:01:00Z", "chat_kind": "channel"}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(BufReader::new(input.as_bytes()));

        let first = source.next_event().await.expect("read").expect("event");
        assert_eq!(first.message_id, 1);
        assert_eq!(first.sender_id, None);

        let second = source.next_event().await.expect("read").expect("event");
        assert_eq!(second.chat_title.as_deref(), Some("Flats"));
        assert_eq!(second.chat_kind, crate::models::ChatKind::Channel);

        assert!(source.next_event().await.expect("read").is_none());
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_end_the_stream() {
        let input = concat!(
            "not json\n",
            r#"{"chat_id": 1, "message_id": 9, "date": "2026-01-01T00:00:00Z"}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(BufReader::new(input.as_bytes()));

        let err = source.next_event().await.expect_err("first line is malformed");
        assert!(err.to_string().contains("line 1"));
        assert!(!err.is_persistent_io());

        let event = source.next_event().await.expect("read").expect("event");
        assert_eq!(event.message_id, 9);
        assert!(event.text.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_recoverable() {
        let mut input = b"\xff\xfe broken\n".to_vec();
        input.extend_from_slice(
            br#"{"chat_id": 1, "message_id": 2, "date": "2026-01-01T00:00:00Z"}"#,
        );
        input.push(b'\n');
        let mut source = JsonLinesSource::new(BufReader::new(input.as_slice()));

        let err = source.next_event().await.expect_err("first line is not UTF-8");
        assert!(!err.is_persistent_io());

        let event = source.next_event().await.expect("read").expect("event");
        assert_eq!(event.message_id, 2);
    }
}
