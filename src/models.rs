//! Data models for lead detection and storage
//!
//! This module contains all data structures used throughout the application,
//! including rule configuration, classifier decisions, inbound events and
//! database records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category implied by the keyword hits of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Only buy keywords matched
    Buy,
    /// Only sell keywords matched
    Sell,
    /// Both buy and sell keywords matched
    Mixed,
    /// No intent keywords, but a request for realtor help
    RealtorHelp,
    /// Nothing matched
    None,
}

impl Category {
    /// Stable string form used in storage and notifications
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Mixed => "mixed",
            Self::RealtorHelp => "realtor_help",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "mixed" => Ok(Self::Mixed),
            "realtor_help" => Ok(Self::RealtorHelp),
            "none" => Ok(Self::None),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Storage status of a processed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Accepted as a lead
    Lead,
    /// Processed but rejected
    NotLead,
}

impl LeadStatus {
    /// Stable string form used in storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::NotLead => "not_lead",
        }
    }
}

impl From<bool> for LeadStatus {
    fn from(is_lead: bool) -> Self {
        if is_lead {
            Self::Lead
        } else {
            Self::NotLead
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead" => Ok(Self::Lead),
            "not_lead" => Ok(Self::NotLead),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Outcome of analyzing a single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDecision {
    /// True if the message passed both gates and reached the score threshold
    pub is_lead: bool,
    /// Category implied by keyword hits, independent of `is_lead`
    pub category: Category,
    /// Diagnostic tags in detection order
    pub reasons: Vec<String>,
}

impl LeadDecision {
    /// Storage status for this decision
    #[must_use]
    pub fn status(&self) -> LeadStatus {
        LeadStatus::from(self.is_lead)
    }
}

/// Keyword lists and scoring flags used by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfiguration {
    /// Purchase intent keywords
    pub buy: Vec<String>,
    /// Sale intent keywords
    pub sell: Vec<String>,
    /// Urgency or interest markers
    pub urgency_interest: Vec<String>,
    /// Requests for a realtor
    pub realtor_help: Vec<String>,
    /// Property detail vocabulary
    pub details: Vec<String>,
    /// Reject messages without any buy/sell/realtor hit
    pub require_explicit_intent: bool,
    /// Minimum number of detail signals unless a contact is present
    pub min_details_required: usize,
    /// Add a point for contact information
    pub contact_bonus: bool,
}

impl RuleConfiguration {
    /// Lowercase, trim and deduplicate a keyword list, dropping empty entries.
    #[must_use]
    pub fn normalize_keywords<S: AsRef<str>>(values: &[S]) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let keyword = value.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !out.contains(&keyword) {
                out.push(keyword);
            }
        }
        out
    }
}

impl Default for RuleConfiguration {
    fn default() -> Self {
        Self {
            buy: Self::normalize_keywords(&[
                "куплю",
                "купить",
                "покупка",
                "хочу купить",
                "ищу квартиру",
                "ищу дом",
                "рассмотрю варианты",
            ]),
            sell: Self::normalize_keywords(&[
                "продам",
                "продаю",
                "продается",
                "продаётся",
                "продажа",
                "срочная продажа",
            ]),
            urgency_interest: Self::normalize_keywords(&[
                "срочно",
                "интересует",
                "готов",
                "быстрая сделка",
                "как можно скорее",
            ]),
            realtor_help: Self::normalize_keywords(&[
                "риелтор",
                "риэлтор",
                "агент по недвижимости",
                "помогите подобрать",
                "нужен риелтор",
            ]),
            details: Self::normalize_keywords(&[
                "квартир",
                "комнат",
                "студи",
                "дом",
                "ипотек",
                "новостройк",
                "вторичк",
            ]),
            require_explicit_intent: true,
            min_details_required: 1,
            contact_bonus: true,
        }
    }
}

/// Where lead notifications are delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationTarget {
    /// Numeric chat/user identity
    ChatId(i64),
    /// `@`-prefixed handle
    Handle(String),
}

impl fmt::Display for NotificationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChatId(id) => write!(f, "{id}"),
            Self::Handle(handle) => f.write_str(handle),
        }
    }
}

/// Kind of chat an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// One-to-one conversation
    Private,
    /// Group or supergroup
    #[default]
    Group,
    /// Broadcast channel
    Channel,
}

/// A message event delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Chat identity
    pub chat_id: i64,
    /// Message identity within the chat
    pub message_id: i64,
    /// Sender identity, absent for anonymous channel posts
    #[serde(default)]
    pub sender_id: Option<i64>,
    /// Chat display name
    #[serde(default)]
    pub chat_title: Option<String>,
    /// Raw message text
    #[serde(default)]
    pub text: String,
    /// When the message was sent
    pub date: DateTime<Utc>,
    /// Chat kind
    #[serde(default)]
    pub chat_kind: ChatKind,
}

impl InboundEvent {
    /// Chat title, falling back to the numeric chat id
    #[must_use]
    pub fn display_title(&self) -> String {
        self.chat_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .map_or_else(|| self.chat_id.to_string(), ToString::to_string)
    }
}

/// Data for inserting a processed message
#[derive(Debug, Clone)]
pub struct NewLeadMessage {
    /// Message identity within the chat
    pub message_id: i64,
    /// Chat identity
    pub chat_id: i64,
    /// Sender identity
    pub user_id: Option<i64>,
    /// Chat display name
    pub chat_title: String,
    /// Original message text, untrimmed
    pub message_text: String,
    /// Classifier category
    pub category: Category,
    /// Lead status
    pub status: LeadStatus,
    /// Diagnostic tags
    pub reasons: Vec<String>,
    /// Event timestamp
    pub created_at: DateTime<Utc>,
}

impl NewLeadMessage {
    /// Build an insert record from an event and its decision
    #[must_use]
    pub fn from_event(event: &InboundEvent, decision: &LeadDecision) -> Self {
        Self {
            message_id: event.message_id,
            chat_id: event.chat_id,
            user_id: event.sender_id,
            chat_title: event.display_title(),
            message_text: event.text.clone(),
            category: decision.category,
            status: decision.status(),
            reasons: decision.reasons.clone(),
            created_at: event.date,
        }
    }
}

/// Database representation of a processed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Database primary key
    pub id: i64,
    /// Message identity within the chat
    pub message_id: i64,
    /// Chat identity
    pub chat_id: i64,
    /// Sender identity
    pub user_id: Option<i64>,
    /// Chat display name
    pub chat_title: Option<String>,
    /// Original message text
    pub message_text: String,
    /// SHA-256 of the normalized text
    pub message_hash: String,
    /// Classifier category
    pub category: Category,
    /// Lead status
    pub status: LeadStatus,
    /// Diagnostic tags
    pub reasons: Vec<String>,
    /// Event timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keywords() {
        let raw = ["  Куплю ", "", "куплю", "   ", "ПРОДАМ"];
        let normalized = RuleConfiguration::normalize_keywords(&raw);
        assert_eq!(normalized, vec!["куплю".to_string(), "продам".to_string()]);
    }

    #[test]
    fn test_category_round_trip_strings() {
        for category in [
            Category::Buy,
            Category::Sell,
            Category::Mixed,
            Category::RealtorHelp,
            Category::None,
        ] {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("other".parse::<Category>().is_err());
    }

    #[test]
    fn test_display_title_falls_back_to_chat_id() {
        let event = InboundEvent {
            chat_id: -100,
            message_id: 1,
            sender_id: None,
            chat_title: Some(String::new()),
            text: "hi".to_string(),
            date: Utc::now(),
            chat_kind: ChatKind::Group,
        };
        assert_eq!(event.display_title(), "-100");
    }
}
