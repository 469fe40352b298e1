use regex::Regex;

use crate::error::Result;
use crate::models::{Category, LeadDecision, RuleConfiguration};

/// Score a message must reach to be accepted as a lead
pub const LEAD_SCORE_THRESHOLD: u32 = 3;

const BUDGET_TOKENS: [&str; 4] = ["бюджет", "₽", "руб", "рублей"];
const LOCATION_TOKENS: [&str; 7] = ["район", "метро", "ул.", "улица", "город", "жк", "этаж"];
const AREA_TOKENS: [&str; 3] = ["площадь", "м²", "кв.м"];

/// Boolean heuristics detected in a normalized message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    /// Monetary amount or budget vocabulary
    pub has_budget: bool,
    /// Locality marker
    pub has_location: bool,
    /// Area amount or area unit
    pub has_area: bool,
    /// Phone number or email
    pub has_contact: bool,
}

impl Signals {
    /// Number of detail signals present (budget, location, area)
    #[must_use]
    pub fn details_score(&self) -> u32 {
        u32::from(self.has_budget) + u32::from(self.has_location) + u32::from(self.has_area)
    }
}

/// Rule-based lead classifier
pub struct LeadAnalyzer {
    rules: RuleConfiguration,
    budget_regex: Regex,
    area_regex: Regex,
    phone_regex: Regex,
    email_regex: Regex,
}

impl LeadAnalyzer {
    /// Create an analyzer for the given rules
    pub fn new(rules: RuleConfiguration) -> Result<Self> {
        let budget_regex = Regex::new(r"\b\d{2,}\s?(?:₽|руб|рублей|р\.)")?;
        let area_regex = Regex::new(r"\b\d{1,4}\s?(?:м²|кв\.м\b|м2\b)")?;
        let phone_regex = Regex::new(r"(?:(?:\+7|7|8)[\s\-()]*)?(?:\d[\s\-()]*){10,11}")?;
        let email_regex = Regex::new(r"(?i)[\w.+\-]+@[\w\-]+\.[\w.\-]+")?;

        Ok(Self {
            rules,
            budget_regex,
            area_regex,
            phone_regex,
            email_regex,
        })
    }

    /// Classify a message. Never fails.
    #[must_use]
    pub fn analyze(&self, text: &str) -> LeadDecision {
        let cleaned = text.trim().to_lowercase();
        if cleaned.is_empty() {
            return LeadDecision {
                is_lead: false,
                category: Category::None,
                reasons: vec!["empty_message".to_string()],
            };
        }

        let buy_hits = count_hits(&self.rules.buy, &cleaned);
        let sell_hits = count_hits(&self.rules.sell, &cleaned);
        let urgency_hits = count_hits(&self.rules.urgency_interest, &cleaned);
        let realtor_hits = count_hits(&self.rules.realtor_help, &cleaned);
        let detail_hits = count_hits(&self.rules.details, &cleaned);

        let signals = self.detect_signals(&cleaned);
        let details_score = signals.details_score();
        let has_intent = buy_hits > 0 || sell_hits > 0;

        let category = resolve_category(buy_hits, sell_hits, realtor_hits);

        let mut reasons = Vec::new();
        for (tag, hits) in [
            ("buy_keywords", buy_hits),
            ("sell_keywords", sell_hits),
            ("urgency_keywords", urgency_hits),
            ("realtor_keywords", realtor_hits),
            ("detail_keywords", detail_hits),
        ] {
            if hits > 0 {
                reasons.push(format!("{tag}:{hits}"));
            }
        }
        for (tag, present) in [
            ("has_budget", signals.has_budget),
            ("has_location", signals.has_location),
            ("has_area", signals.has_area),
            ("has_contact", signals.has_contact),
        ] {
            if present {
                reasons.push(tag.to_string());
            }
        }

        if self.rules.require_explicit_intent && !has_intent && realtor_hits == 0 {
            reasons.push("no_intent".to_string());
            return LeadDecision { is_lead: false, category, reasons };
        }

        let min_details = u32::try_from(self.rules.min_details_required).unwrap_or(u32::MAX);
        if details_score < min_details && !signals.has_contact {
            reasons.push("insufficient_details".to_string());
            return LeadDecision { is_lead: false, category, reasons };
        }

        let mut score = 0;
        if has_intent {
            score += 2;
        }
        score += details_score;
        if urgency_hits > 0 {
            score += 1;
        }
        if realtor_hits > 0 {
            score += 1;
        }
        if self.rules.contact_bonus && signals.has_contact {
            score += 1;
        }

        LeadDecision {
            is_lead: score >= LEAD_SCORE_THRESHOLD,
            category,
            reasons,
        }
    }

    /// Detect the heuristic signals in already-normalized text
    #[must_use]
    pub fn detect_signals(&self, cleaned: &str) -> Signals {
        Signals {
            has_budget: self.budget_regex.is_match(cleaned)
                || contains_any(cleaned, &BUDGET_TOKENS),
            has_location: contains_any(cleaned, &LOCATION_TOKENS),
            has_area: self.area_regex.is_match(cleaned) || contains_any(cleaned, &AREA_TOKENS),
            has_contact: self.phone_regex.is_match(cleaned) || self.email_regex.is_match(cleaned),
        }
    }
}

fn count_hits(keywords: &[String], text: &str) -> usize {
    keywords.iter().filter(|kw| text.contains(kw.as_str())).count()
}

fn contains_any(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| text.contains(token))
}

// Buy and sell together is always mixed, whatever the counts.
const fn resolve_category(buy_hits: usize, sell_hits: usize, realtor_hits: usize) -> Category {
    match (buy_hits > 0, sell_hits > 0) {
        (true, false) => Category::Buy,
        (false, true) => Category::Sell,
        (true, true) => Category::Mixed,
        (false, false) if realtor_hits > 0 => Category::RealtorHelp,
        (false, false) => Category::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> LeadAnalyzer {
        LeadAnalyzer::new(RuleConfiguration::default()).expect("Failed to create analyzer")
    }

    #[test]
    fn test_budget_signal() {
        let a = analyzer();
        assert!(a.detect_signals("цена 50 руб").has_budget);
        assert!(a.detect_signals("бюджет обсуждаем").has_budget);
        assert!(!a.detect_signals("5 яблок").has_budget);
    }

    #[test]
    fn test_area_signal() {
        let a = analyzer();
        assert!(a.detect_signals("квартира 45 м2 у парка").has_area);
        assert!(a.detect_signals("45 кв.м").has_area);
        assert!(a.detect_signals("большая площадь").has_area);
        assert!(!a.detect_signals("45 м2х").has_area);
    }

    #[test]
    fn test_contact_signal() {
        let a = analyzer();
        assert!(a.detect_signals("звоните +7 (999) 123-45-67").has_contact);
        assert!(a.detect_signals("пишите agent@example.com").has_contact);
        assert!(!a.detect_signals("звоните завтра").has_contact);
    }

    #[test]
    fn test_location_signal() {
        let a = analyzer();
        assert!(a.detect_signals("рядом метро").has_location);
        assert!(!a.detect_signals("рядом парк").has_location);
    }

    #[test]
    fn test_resolve_category() {
        assert_eq!(resolve_category(1, 0, 0), Category::Buy);
        assert_eq!(resolve_category(0, 2, 0), Category::Sell);
        assert_eq!(resolve_category(3, 1, 1), Category::Mixed);
        assert_eq!(resolve_category(0, 0, 1), Category::RealtorHelp);
        assert_eq!(resolve_category(0, 0, 0), Category::None);
    }

    #[test]
    fn test_empty_message() {
        let decision = analyzer().analyze("   \n ");
        assert!(!decision.is_lead);
        assert_eq!(decision.category, Category::None);
        assert_eq!(decision.reasons, vec!["empty_message".to_string()]);
    }
}
