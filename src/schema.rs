//! Database schema definitions
//!
//! This module provides constants for table and column names used with rusqlite.

/// Processed messages table schema
pub mod leads {
    /// Table name
    pub const TABLE: &str = "leads";
    /// Primary key column
    pub const ID: &str = "id";
    /// Message identifier within the chat
    pub const MESSAGE_ID: &str = "message_id";
    /// Chat identifier column
    pub const CHAT_ID: &str = "chat_id";
    /// Sender identifier column
    pub const USER_ID: &str = "user_id";
    /// Chat display name column
    pub const CHAT_TITLE: &str = "chat_title";
    /// Original message text column
    pub const MESSAGE_TEXT: &str = "message_text";
    /// Content fingerprint column
    pub const MESSAGE_HASH: &str = "message_hash";
    /// Classifier category column
    pub const CATEGORY: &str = "category";
    /// Lead status column
    pub const STATUS: &str = "status";
    /// Comma-separated diagnostic tags column
    pub const REASONS: &str = "reasons";
    /// Event timestamp column (RFC 3339, UTC)
    pub const CREATED_AT: &str = "created_at";
}
