use std::time::Duration;

use metrics::{counter, histogram};

pub const MESSAGES_PROCESSED_TOTAL: &str = "lead_finder_messages_processed_total";
pub const LEADS_TOTAL: &str = "lead_finder_leads_total";
pub const DUPLICATES_TOTAL: &str = "lead_finder_duplicates_total";
pub const NOTIFICATIONS_TOTAL: &str = "lead_finder_notifications_total";
pub const ERRORS_TOTAL: &str = "lead_finder_errors_total";
pub const PROCESSING_DURATION: &str = "lead_finder_processing_duration_seconds";

/// Running totals owned by the processing loop.
///
/// Every `record_*` call also emits the matching `metrics` counter, so an
/// installed recorder sees the same numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub processed: u64,
    pub leads: u64,
    pub duplicates: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
    pub errors: u64,
}

impl ProcessingStats {
    /// A message was classified
    pub fn record_processed(&mut self, duration: Duration) {
        self.processed += 1;
        counter!(MESSAGES_PROCESSED_TOTAL).increment(1);
        histogram!(PROCESSING_DURATION).record(duration.as_secs_f64());
    }

    /// A newly stored message was a lead
    pub fn record_lead(&mut self, category: &str) {
        self.leads += 1;
        counter!(LEADS_TOTAL, "category" => category.to_string()).increment(1);
    }

    /// The store already had this (chat, message) pair
    pub fn record_duplicate(&mut self) {
        self.duplicates += 1;
        counter!(DUPLICATES_TOTAL).increment(1);
    }

    /// Outcome of a notification attempt
    pub fn record_notification(&mut self, delivered: bool) {
        if delivered {
            self.notifications_sent += 1;
        } else {
            self.notifications_failed += 1;
        }
        let status = if delivered { "success" } else { "error" };
        counter!(NOTIFICATIONS_TOTAL, "status" => status).increment(1);
    }

    /// A message failed to process
    pub fn record_error(&mut self, error_type: &'static str) {
        self.errors += 1;
        counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
    }

    /// True when running totals should be reported
    #[must_use]
    pub const fn should_report(&self, interval: u64) -> bool {
        interval > 0 && self.processed > 0 && self.processed % interval == 0
    }
}
