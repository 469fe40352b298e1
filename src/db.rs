use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::models::{LeadStatus, NewLeadMessage, StoredMessage};
use crate::schema::leads;

/// Persistent store of processed messages, deduplicated by (chat_id, message_id)
pub struct Database {
    conn: Connection,
}

/// Row counts for the leads table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// All stored messages
    pub total_messages: usize,
    /// Messages stored as leads
    pub leads: usize,
    /// Messages stored as not leads
    pub not_leads: usize,
    /// Distinct content fingerprints
    pub distinct_texts: usize,
    /// Distinct chats seen
    pub distinct_chats: usize,
}

/// Fingerprint of a message's normalized (trimmed, lowercased) text
#[must_use]
pub fn message_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

impl Database {
    /// Open (or create) the database file and run migrations
    pub fn new(database_path: &str) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(database_path)?;
        Self::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Open an existing database file for queries only.
    ///
    /// Fails when the file does not exist; nothing is created or migrated.
    pub fn open_read_only(database_path: &str) -> Result<Self> {
        let conn = Connection::open_with_flags(database_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!("../migrations/2026-10-01-000000_create_leads/up.sql"))?;
        Ok(())
    }

    /// Store a processed message.
    ///
    /// Returns `false` without touching the table when the (chat_id, message_id)
    /// pair is already stored. The unique constraint decides, not a prior lookup.
    pub fn insert_message(&self, new_message: &NewLeadMessage) -> Result<bool> {
        let hash = message_hash(&new_message.message_text);

        let result = self.conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                leads::TABLE,
                leads::MESSAGE_ID,
                leads::CHAT_ID,
                leads::USER_ID,
                leads::CHAT_TITLE,
                leads::MESSAGE_TEXT,
                leads::MESSAGE_HASH,
                leads::CATEGORY,
                leads::STATUS,
                leads::REASONS,
                leads::CREATED_AT
            ),
            params![
                new_message.message_id,
                new_message.chat_id,
                new_message.user_id,
                new_message.chat_title,
                new_message.message_text,
                hash,
                new_message.category.as_str(),
                new_message.status.as_str(),
                new_message.reasons.join(","),
                new_message.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                debug!(
                    chat_id = new_message.chat_id,
                    message_id = new_message.message_id,
                    "Duplicate message rejected by unique constraint"
                );
                Ok(false)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Get a stored message by its natural key
    pub fn get_message(&self, chat_id: i64, message_id: i64) -> Result<Option<StoredMessage>> {
        let message = self
            .conn
            .query_row(
                &format!(
                    "SELECT * FROM {} WHERE {} = ? AND {} = ?",
                    leads::TABLE,
                    leads::CHAT_ID,
                    leads::MESSAGE_ID
                ),
                params![chat_id, message_id],
                map_stored_message,
            )
            .optional()?;

        Ok(message)
    }

    /// All stored messages sharing a content fingerprint, oldest first
    pub fn find_by_hash(&self, hash: &str) -> Result<Vec<StoredMessage>> {
        self.query_messages(
            &format!(
                "SELECT * FROM {} WHERE {} = ? ORDER BY {} ASC",
                leads::TABLE,
                leads::MESSAGE_HASH,
                leads::ID
            ),
            params![hash],
        )
    }

    /// Number of stored messages sharing a content fingerprint
    pub fn count_by_hash(&self, hash: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?",
                leads::TABLE,
                leads::MESSAGE_HASH
            ),
            params![hash],
            |row| row.get(0),
        )?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Most recent messages with the given status
    pub fn messages_by_status(
        &self,
        status: LeadStatus,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_messages(
            &format!(
                "SELECT * FROM {} WHERE {} = ? ORDER BY {} DESC LIMIT ?",
                leads::TABLE,
                leads::STATUS,
                leads::ID
            ),
            params![status.as_str(), limit],
        )
    }

    /// All messages from one sender, oldest first
    pub fn messages_by_user(&self, user_id: i64) -> Result<Vec<StoredMessage>> {
        self.query_messages(
            &format!(
                "SELECT * FROM {} WHERE {} = ? ORDER BY {} ASC",
                leads::TABLE,
                leads::USER_ID,
                leads::ID
            ),
            params![user_id],
        )
    }

    fn query_messages(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredMessage>> {
        let mut stmt = self.conn.prepare(sql)?;
        let message_iter = stmt.query_map(params, map_stored_message)?;

        let mut results = Vec::new();
        for message in message_iter {
            results.push(message?);
        }

        Ok(results)
    }

    /// Get row counts for the leads table
    pub fn stats(&self) -> Result<StoreStats> {
        let (total, leads_count, not_leads, distinct_texts, distinct_chats): Counts =
            self.conn.query_row(
                &format!(
                    "SELECT COUNT(*), \
                     COALESCE(SUM(CASE WHEN {status} = ? THEN 1 ELSE 0 END), 0), \
                     COALESCE(SUM(CASE WHEN {status} = ? THEN 1 ELSE 0 END), 0), \
                     COUNT(DISTINCT {hash}), \
                     COUNT(DISTINCT {chat}) \
                     FROM {table}",
                    status = leads::STATUS,
                    hash = leads::MESSAGE_HASH,
                    chat = leads::CHAT_ID,
                    table = leads::TABLE
                ),
                params![LeadStatus::Lead.as_str(), LeadStatus::NotLead.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

        Ok(StoreStats {
            total_messages: usize::try_from(total).unwrap_or_default(),
            leads: usize::try_from(leads_count).unwrap_or_default(),
            not_leads: usize::try_from(not_leads).unwrap_or_default(),
            distinct_texts: usize::try_from(distinct_texts).unwrap_or_default(),
            distinct_chats: usize::try_from(distinct_chats).unwrap_or_default(),
        })
    }

    /// Release the connection. No operations are possible afterwards.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}

type Counts = (i64, i64, i64, i64, i64);

/// Map a database row to a StoredMessage
fn map_stored_message(row: &Row) -> rusqlite::Result<StoredMessage> {
    let category: String = row.get(leads::CATEGORY)?;
    let status: String = row.get(leads::STATUS)?;
    let reasons: Option<String> = row.get(leads::REASONS)?;
    let created_at: String = row.get(leads::CREATED_AT)?;

    Ok(StoredMessage {
        id: row.get(leads::ID)?,
        message_id: row.get(leads::MESSAGE_ID)?,
        chat_id: row.get(leads::CHAT_ID)?,
        user_id: row.get(leads::USER_ID)?,
        chat_title: row.get(leads::CHAT_TITLE)?,
        message_text: row.get(leads::MESSAGE_TEXT)?,
        message_hash: row.get(leads::MESSAGE_HASH)?,
        category: category.parse().map_err(|e: String| conversion_error(leads::CATEGORY, e))?,
        status: status.parse().map_err(|e: String| conversion_error(leads::STATUS, e))?,
        reasons: reasons
            .filter(|r| !r.is_empty())
            .map(|r| r.split(',').map(ToString::to_string).collect())
            .unwrap_or_default(),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| conversion_error(leads::CREATED_AT, e.to_string()))?
            .with_timezone(&Utc),
    })
}

fn conversion_error(column: &str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, format!("{column}: {message}").into())
}
