use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LeadError, Result};
use crate::models::{NotificationTarget, RuleConfiguration};
use crate::validation::InputValidator;

/// Keyword categories the classifier understands
pub const KEYWORD_CATEGORIES: [&str; 5] =
    ["buy", "sell", "urgency_interest", "realtor_help", "details"];

const TARGET_ID_KEY: &str = "target_telegram_id";
const HANDLE_KEY: &str = "target_bot_username";

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub notification: NotificationConfig,
    pub keywords: HashMap<String, Vec<String>>,
    pub rules: RulesConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Numeric chat id; strings are accepted as long as they parse
    #[serde(default, deserialize_with = "string_or_int")]
    pub target_telegram_id: Option<String>,
    /// `@`-prefixed handle, preferred over the numeric id when both are set
    #[serde(default)]
    pub target_bot_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_true")]
    pub require_explicit_intent: bool,
    /// Negative values are clamped to zero
    #[serde(default = "default_min_details")]
    pub min_details_required: i64,
    #[serde(default = "default_true")]
    pub contact_bonus: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Log running totals every N processed messages
    pub stats_interval: u64,
    /// Characters of message text included in a notification
    pub preview_chars: usize,
    /// Reasons included in a notification
    pub max_reasons: usize,
    /// Ignore private chats
    pub groups_only: bool,
    /// Do not re-notify leads whose text was already stored under another key
    pub suppress_content_duplicates: bool,
}

/// Raw document shape; required sections stay optional so all missing ones can be reported
#[derive(Debug, Deserialize)]
struct RawConfig {
    notification: Option<NotificationConfig>,
    keywords: Option<HashMap<String, Vec<String>>>,
    rules: Option<RulesConfig>,
    #[serde(default)]
    database: DatabaseConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    processing: ProcessingConfig,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Int(i64),
    Str(String),
}

fn string_or_int<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<IdValue>::deserialize(deserializer)?.map(|value| match value {
        IdValue::Int(id) => id.to_string(),
        IdValue::Str(s) => s,
    }))
}

const fn default_true() -> bool {
    true
}

const fn default_min_details() -> i64 {
    1
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            require_explicit_intent: true,
            min_details_required: default_min_details(),
            contact_bonus: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "leads.db".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 100,
            preview_chars: 700,
            max_reasons: 8,
            groups_only: true,
            suppress_content_duplicates: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let rules = RuleConfiguration::default();
        let keywords = HashMap::from([
            ("buy".to_string(), rules.buy),
            ("sell".to_string(), rules.sell),
            ("urgency_interest".to_string(), rules.urgency_interest),
            ("realtor_help".to_string(), rules.realtor_help),
            ("details".to_string(), rules.details),
        ]);

        Self {
            notification: NotificationConfig::default(),
            keywords,
            rules: RulesConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, overlaid by `LEAD_FINDER__*` environment variables
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(Environment::with_prefix("LEAD_FINDER").separator("__"))
            .build()?;

        let raw: RawConfig = config.try_deserialize()?;
        let app_config = Self::from_raw(raw)?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Parse configuration from a JSON string, without environment overlays
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let app_config = Self::from_raw(raw)?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let mut missing = Vec::new();
        if raw.notification.is_none() {
            missing.push("notification".to_string());
        }
        if raw.keywords.is_none() {
            missing.push("keywords".to_string());
        }
        if raw.rules.is_none() {
            missing.push("rules".to_string());
        }

        match (raw.notification, raw.keywords, raw.rules) {
            (Some(notification), Some(keywords), Some(rules)) => Ok(Self {
                notification,
                keywords,
                rules,
                database: raw.database,
                logging: raw.logging,
                processing: raw.processing,
            }),
            _ => {
                missing.sort();
                Err(LeadError::MissingSections(missing))
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.notification_target()?;

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(LeadError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level, valid_levels
            )));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(LeadError::InvalidConfig(format!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format, valid_formats
            )));
        }

        // Validate processing config
        if self.processing.stats_interval == 0 {
            return Err(LeadError::InvalidConfig(
                "stats_interval must be greater than 0".to_string(),
            ));
        }
        if self.processing.preview_chars == 0 {
            return Err(LeadError::InvalidConfig(
                "preview_chars must be greater than 0".to_string(),
            ));
        }

        InputValidator::validate_database_path(&self.database.path)?;

        Ok(())
    }

    /// Resolve where lead notifications go.
    ///
    /// The handle wins when both forms are configured.
    pub fn notification_target(&self) -> Result<NotificationTarget> {
        let target_id = self.notification.target_telegram_id.as_deref().map(str::trim);
        let handle = self
            .notification
            .target_bot_username
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty());

        if target_id.is_none() && handle.is_none() {
            return Err(LeadError::InvalidConfig(format!(
                "Set one of: config.notification.{TARGET_ID_KEY} \
                 or config.notification.{HANDLE_KEY}"
            )));
        }

        let chat_id = target_id.map(InputValidator::validate_target_id).transpose()?;

        if let Some(handle) = handle {
            InputValidator::validate_handle(handle)?;
            return Ok(NotificationTarget::Handle(handle.to_string()));
        }

        chat_id.map(NotificationTarget::ChatId).ok_or_else(|| {
            LeadError::InvalidConfig(format!(
                "config.notification.{TARGET_ID_KEY} must be an integer"
            ))
        })
    }

    /// Typed rules for the classifier; unknown keyword categories are ignored
    #[must_use]
    pub fn rule_configuration(&self) -> RuleConfiguration {
        for category in self.keywords.keys() {
            if !KEYWORD_CATEGORIES.contains(&category.as_str()) {
                warn!(category = %category, "Ignoring unknown keyword category");
            }
        }

        let list = |name: &str| {
            self.keywords
                .get(name)
                .map(|values| RuleConfiguration::normalize_keywords(values))
                .unwrap_or_default()
        };

        RuleConfiguration {
            buy: list("buy"),
            sell: list("sell"),
            urgency_interest: list("urgency_interest"),
            realtor_help: list("realtor_help"),
            details: list("details"),
            require_explicit_intent: self.rules.require_explicit_intent,
            min_details_required: usize::try_from(self.rules.min_details_required.max(0))
                .unwrap_or(usize::MAX),
            contact_bonus: self.rules.contact_bonus,
        }
    }

    /// Get log level, honouring `--verbose`
    #[must_use]
    pub fn get_log_level(&self, verbose: bool) -> String {
        if verbose {
            "debug".to_string()
        } else {
            self.logging.level.clone()
        }
    }
}
