use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::classifier::LeadAnalyzer;
use crate::config::ProcessingConfig;
use crate::db::{message_hash, Database};
use crate::error::{DeliveryError, Result};
use crate::logging::OperationTimer;
use crate::metrics::ProcessingStats;
use crate::models::{ChatKind, InboundEvent, NewLeadMessage, NotificationTarget};
use crate::notification::build_notification;
use crate::transport::{EventSource, Notifier};

/// What happened to one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Filtered out before classification (private chat or empty text)
    Ignored,
    /// The (chat, message) pair was already stored
    Duplicate,
    /// Stored as not a lead
    Stored,
    /// Stored as a lead and the notification went out
    Notified,
    /// Stored as a lead but its text was already stored under another key
    ContentDuplicate,
    /// Stored as a lead, notification failed
    NotificationFailed,
}

/// Classifies, stores and notifies, one event at a time
pub struct LeadService<N> {
    analyzer: LeadAnalyzer,
    db: Database,
    notifier: N,
    target: NotificationTarget,
    settings: ProcessingConfig,
}

impl<N: Notifier> LeadService<N> {
    pub fn new(
        analyzer: LeadAnalyzer,
        db: Database,
        notifier: N,
        target: NotificationTarget,
        settings: ProcessingConfig,
    ) -> Self {
        Self {
            analyzer,
            db,
            notifier,
            target,
            settings,
        }
    }

    /// The underlying store, for queries
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Process a single inbound event
    pub async fn process_event(
        &self,
        stats: &mut ProcessingStats,
        event: &InboundEvent,
    ) -> Result<ProcessOutcome> {
        if self.settings.groups_only && event.chat_kind == ChatKind::Private {
            return Ok(ProcessOutcome::Ignored);
        }
        if event.text.is_empty() {
            return Ok(ProcessOutcome::Ignored);
        }

        let timer = OperationTimer::new("process_event");
        let decision = self.analyzer.analyze(&event.text);
        stats.record_processed(timer.elapsed());

        let new_message = NewLeadMessage::from_event(event, &decision);
        let inserted = self.db.insert_message(&new_message)?;
        timer.finish();

        if !inserted {
            debug!(
                chat_id = event.chat_id,
                message_id = event.message_id,
                "Duplicate message skipped"
            );
            stats.record_duplicate();
            return Ok(ProcessOutcome::Duplicate);
        }

        if !decision.is_lead {
            return Ok(ProcessOutcome::Stored);
        }

        stats.record_lead(decision.category.as_str());
        info!(
            chat_title = %new_message.chat_title,
            chat_id = event.chat_id,
            user_id = ?event.sender_id,
            category = %decision.category,
            "Lead found"
        );

        if self.settings.suppress_content_duplicates {
            let copies = self.db.count_by_hash(&message_hash(&event.text))?;
            if copies > 1 {
                debug!(
                    chat_id = event.chat_id,
                    message_id = event.message_id,
                    copies,
                    "Lead text already seen, notification suppressed"
                );
                return Ok(ProcessOutcome::ContentDuplicate);
            }
        }

        let text = build_notification(
            event,
            &decision,
            self.settings.max_reasons,
            self.settings.preview_chars,
        );
        match self.notifier.send(&self.target, &text).await {
            Ok(()) => {
                stats.record_notification(true);
                Ok(ProcessOutcome::Notified)
            },
            Err(DeliveryError::RateLimited { seconds }) => {
                warn!(seconds, "Rate limited while sending notification");
                stats.record_notification(false);
                Ok(ProcessOutcome::NotificationFailed)
            },
            Err(e) => {
                error!(error = %e, "Failed to send notification");
                stats.record_notification(false);
                Ok(ProcessOutcome::NotificationFailed)
            },
        }
    }

    /// Drain `source` until it ends, fails for good, or `shutdown` flips to true.
    ///
    /// A failing event is logged and counted; the loop moves on to the next one.
    /// An I/O failure of the source itself ends the loop.
    pub async fn run<S: EventSource>(
        &self,
        source: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> ProcessingStats {
        let mut stats = ProcessingStats::default();
        info!("Monitoring group/channel messages");

        loop {
            if *shutdown.borrow() {
                info!("Shutdown requested");
                break;
            }

            let next = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        info!("Shutdown channel closed");
                        break;
                    }
                    continue;
                }
                next = source.next_event() => next,
            };

            let event = match next {
                Ok(Some(event)) => event,
                Ok(None) => {
                    info!("Event source exhausted");
                    break;
                },
                Err(e) if e.is_persistent_io() => {
                    error!(error = %e, "Event source failed, stopping");
                    stats.record_error("source");
                    break;
                },
                Err(e) => {
                    error!(error = %e, "Failed to read event");
                    stats.record_error("source");
                    continue;
                },
            };

            let before = stats.processed;
            if let Err(e) = self.process_event(&mut stats, &event).await {
                error!(
                    error = %e,
                    chat_id = event.chat_id,
                    message_id = event.message_id,
                    "Error processing message"
                );
                stats.record_error("processing");
            }

            if stats.processed != before && stats.should_report(self.settings.stats_interval) {
                info!(processed = stats.processed, leads = stats.leads, "Stats");
            }
        }

        info!(processed = stats.processed, leads = stats.leads, "Processing finished");
        stats
    }

    /// Release the store. Call once at shutdown.
    pub fn close(self) -> Result<()> {
        self.db.close()
    }
}
