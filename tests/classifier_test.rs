//! Integration tests for the lead classifier

use lead_finder::classifier::LeadAnalyzer;
use lead_finder::models::{Category, RuleConfiguration};
use proptest::prelude::*;

fn default_analyzer() -> LeadAnalyzer {
    LeadAnalyzer::new(RuleConfiguration::default()).expect("Failed to create analyzer")
}

fn rules(min_details_required: usize, contact_bonus: bool) -> RuleConfiguration {
    RuleConfiguration {
        buy: vec!["куплю".to_string()],
        sell: vec!["продам".to_string()],
        urgency_interest: vec!["срочно".to_string()],
        realtor_help: vec!["риелтор".to_string()],
        details: vec!["квартир".to_string()],
        require_explicit_intent: true,
        min_details_required,
        contact_bonus,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[test]
fn test_buy_lead_end_to_end() {
    let decision = default_analyzer().analyze(
        "Куплю квартиру срочно, бюджет 12 000 000 рублей, район Приморский, звоните +79991234567",
    );

    assert!(decision.is_lead);
    assert_eq!(decision.category, Category::Buy);
    assert_eq!(
        decision.reasons,
        strings(&[
            "buy_keywords:1",
            "urgency_keywords:1",
            "detail_keywords:1",
            "has_budget",
            "has_location",
            "has_contact",
        ])
    );
}

#[test]
fn test_irrelevant_message_rejected() {
    let decision = default_analyzer().analyze("Добрый день, обсуждаем новости рынка");

    assert!(!decision.is_lead);
    assert_eq!(decision.category, Category::None);
    assert_eq!(decision.reasons, strings(&["no_intent"]));
}

#[test]
fn test_sell_lead_with_all_details() {
    let decision =
        default_analyzer().analyze("Продам студию 25 м2, метро Девяткино, 4 500 000 руб");

    assert!(decision.is_lead);
    assert_eq!(decision.category, Category::Sell);
    assert!(decision.reasons.contains(&"has_area".to_string()));
    assert!(decision.reasons.contains(&"has_budget".to_string()));
    assert!(decision.reasons.contains(&"has_location".to_string()));
}

#[test]
fn test_realtor_help_lead() {
    let decision = default_analyzer().analyze("Нужен риелтор, район центр, звоните +79991234567");

    assert!(decision.is_lead);
    assert_eq!(decision.category, Category::RealtorHelp);
    assert_eq!(
        decision.reasons,
        strings(&["realtor_keywords:2", "has_location", "has_contact"])
    );
}

#[test]
fn test_mixed_category_ignores_counts() {
    let analyzer = LeadAnalyzer::new(rules(0, true)).expect("analyzer");
    let decision = analyzer.analyze("куплю куплю куплю или продам");

    assert_eq!(decision.category, Category::Mixed);
    assert!(decision.reasons.starts_with(&strings(&["buy_keywords:1", "sell_keywords:1"])));
}

#[test]
fn test_details_threshold_boundary() {
    let analyzer = LeadAnalyzer::new(rules(2, true)).expect("analyzer");

    let at_threshold = analyzer.analyze("куплю, бюджет есть, район любой");
    assert!(at_threshold.is_lead);
    assert!(!at_threshold.reasons.contains(&"insufficient_details".to_string()));

    let below = analyzer.analyze("куплю, бюджет есть");
    assert!(!below.is_lead);
    assert_eq!(below.category, Category::Buy);
    assert_eq!(below.reasons.last().map(String::as_str), Some("insufficient_details"));
}

#[test]
fn test_contact_waives_details_gate() {
    let with_bonus = LeadAnalyzer::new(rules(2, true)).expect("analyzer");
    let decision = with_bonus.analyze("куплю, пишите +7 999 123 45 67");
    assert!(decision.is_lead);
    assert_eq!(decision.reasons, strings(&["buy_keywords:1", "has_contact"]));

    // Gate passes, but intent plus nothing else stays under the threshold.
    let without_bonus = LeadAnalyzer::new(rules(2, false)).expect("analyzer");
    let decision = without_bonus.analyze("куплю, пишите +7 999 123 45 67");
    assert!(!decision.is_lead);
    assert_eq!(decision.reasons, strings(&["buy_keywords:1", "has_contact"]));
}

#[test]
fn test_gate_rejection_preserves_category() {
    let analyzer = LeadAnalyzer::new(rules(3, true)).expect("analyzer");
    let decision = analyzer.analyze("продам или куплю");

    assert!(!decision.is_lead);
    assert_eq!(decision.category, Category::Mixed);
    assert_eq!(
        decision.reasons,
        strings(&["buy_keywords:1", "sell_keywords:1", "insufficient_details"])
    );
}

#[test]
fn test_details_alone_can_score_without_intent_requirement() {
    let mut lenient = RuleConfiguration::default();
    lenient.require_explicit_intent = false;
    let analyzer = LeadAnalyzer::new(lenient).expect("analyzer");

    let two_details = analyzer.analyze("район центр, бюджет 5 000 000 руб");
    assert!(!two_details.is_lead);
    assert_eq!(two_details.category, Category::None);
    assert_eq!(two_details.reasons, strings(&["has_budget", "has_location"]));

    let three_details = analyzer.analyze("район центр, бюджет 5 000 000 руб, площадь 50 м²");
    assert!(three_details.is_lead);
    assert_eq!(three_details.category, Category::None);
}

#[test]
fn test_keywords_match_case_insensitively() {
    let analyzer = LeadAnalyzer::new(rules(0, true)).expect("analyzer");
    let decision = analyzer.analyze("  КУПЛЮ КВАРТИРУ СРОЧНО  ");

    assert_eq!(decision.category, Category::Buy);
    assert_eq!(
        decision.reasons,
        strings(&["buy_keywords:1", "urgency_keywords:1", "detail_keywords:1"])
    );
    assert!(decision.is_lead);
}

#[test]
fn test_empty_keyword_lists_behave_as_absent() {
    let empty = RuleConfiguration {
        buy: Vec::new(),
        sell: Vec::new(),
        urgency_interest: Vec::new(),
        realtor_help: Vec::new(),
        details: Vec::new(),
        require_explicit_intent: true,
        min_details_required: 1,
        contact_bonus: true,
    };
    let analyzer = LeadAnalyzer::new(empty).expect("analyzer");
    let decision = analyzer.analyze("куплю квартиру, район центр");

    assert!(!decision.is_lead);
    assert_eq!(decision.reasons, strings(&["has_location", "no_intent"]));
}

const FRAGMENTS: [&str; 10] = [
    "куплю",
    "продам",
    "срочно",
    "риелтор",
    "квартиру",
    "бюджет",
    "район",
    "площадь",
    "+79991234567",
    "привет",
];

proptest! {
    #[test]
    fn prop_no_intent_keywords_never_lead(text in "[a-z0-9 ,.]{0,80}") {
        let decision = default_analyzer().analyze(&text);
        prop_assert!(!decision.is_lead);
        let last = decision.reasons.last().cloned().unwrap_or_default();
        prop_assert!(last == "no_intent" || last == "empty_message");
    }

    #[test]
    fn prop_category_independent_of_rules(
        picks in proptest::collection::vec(0..FRAGMENTS.len(), 0..8)
    ) {
        let text = picks.iter().map(|&i| FRAGMENTS[i]).collect::<Vec<_>>().join(" ");

        let strict = LeadAnalyzer::new(rules(3, false)).expect("analyzer");
        let mut lenient_rules = rules(0, true);
        lenient_rules.require_explicit_intent = false;
        let lenient = LeadAnalyzer::new(lenient_rules).expect("analyzer");

        prop_assert_eq!(strict.analyze(&text).category, lenient.analyze(&text).category);
    }
}
