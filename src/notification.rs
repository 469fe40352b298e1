use chrono::Local;

use crate::models::{InboundEvent, LeadDecision};
use crate::validation::InputValidator;

/// Format the Markdown notification sent for a lead
#[must_use]
pub fn build_notification(
    event: &InboundEvent,
    decision: &LeadDecision,
    max_reasons: usize,
    preview_chars: usize,
) -> String {
    let chat_name = event
        .chat_title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("Unknown chat");
    let sender = event
        .sender_id
        .map_or_else(|| "unknown".to_string(), |id| id.to_string());
    let created = Local::now().format("%Y-%m-%d %H:%M:%S %Z");
    let reasons = decision
        .reasons
        .iter()
        .take(max_reasons)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let sanitized = InputValidator::sanitize_text(&event.text);
    let text = InputValidator::truncate_chars(&sanitized, preview_chars);

    format!(
        "🏠 *Новый лид найден*\n\
         • Категория: `{category}`\n\
         • Чат: {chat_name}\n\
         • User ID: `{sender}`\n\
         • Время: {created}\n\
         • Причины: {reasons}\n\n\
         Сообщение:\n```\n{text}\n```",
        category = decision.category,
    )
}
