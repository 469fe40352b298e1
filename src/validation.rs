use anyhow::{anyhow, Result};

/// Validation utilities for configuration and inbound input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a numeric notification target and return it
    pub fn validate_target_id(raw: &str) -> Result<i64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("config.notification.target_telegram_id must be an integer"));
        }

        trimmed
            .parse::<i64>()
            .map_err(|_| anyhow!("config.notification.target_telegram_id must be an integer"))
    }

    /// Validate an `@`-prefixed notification handle
    pub fn validate_handle(handle: &str) -> Result<()> {
        let trimmed = handle.trim();
        if !trimmed.starts_with('@') {
            return Err(anyhow!("config.notification.target_bot_username must start with '@'"));
        }

        if trimmed.len() < 2 {
            return Err(anyhow!(
                "config.notification.target_bot_username is missing a name after '@'"
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(anyhow!(
                "config.notification.target_bot_username cannot contain whitespace"
            ));
        }

        Ok(())
    }

    /// Validate the SQLite database path
    pub fn validate_database_path(path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(anyhow!("Database path cannot be empty"));
        }

        if path.contains('\0') {
            return Err(anyhow!("Database path contains invalid characters"));
        }

        if path.len() > 4096 {
            return Err(anyhow!("Database path too long (max 4096 characters)"));
        }

        Ok(())
    }

    /// Truncate text to at most `max_chars` characters, on a char boundary
    #[must_use]
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(InputValidator::truncate_chars("квартира", 3), "ква");
        assert_eq!(InputValidator::truncate_chars("дом", 10), "дом");
        assert_eq!(InputValidator::truncate_chars("", 0), "");
    }
}
