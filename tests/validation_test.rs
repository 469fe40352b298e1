//! Integration tests for input validation

use lead_finder::validation::InputValidator;

#[test]
fn test_validate_target_id_valid() {
    assert_eq!(InputValidator::validate_target_id("123456").expect("valid"), 123_456);
    assert_eq!(InputValidator::validate_target_id(" -100200 ").expect("valid"), -100_200);
}

#[test]
fn test_validate_target_id_invalid() {
    assert!(InputValidator::validate_target_id("").is_err());
    assert!(InputValidator::validate_target_id("   ").is_err());
    assert!(InputValidator::validate_target_id("abc").is_err());
    assert!(InputValidator::validate_target_id("12.5").is_err());
    assert!(InputValidator::validate_target_id("99999999999999999999").is_err());
}

#[test]
fn test_validate_handle() {
    assert!(InputValidator::validate_handle("@my_leads_bot").is_ok());
    assert!(InputValidator::validate_handle("my_leads_bot").is_err());
    assert!(InputValidator::validate_handle("@").is_err());
    assert!(InputValidator::validate_handle("@my bot").is_err());
}

#[test]
fn test_validate_database_path() {
    assert!(InputValidator::validate_database_path("leads.db").is_ok());
    assert!(InputValidator::validate_database_path("data/leads.db").is_ok());
    assert!(InputValidator::validate_database_path("").is_err());
    assert!(InputValidator::validate_database_path("leads\0.db").is_err());
    assert!(InputValidator::validate_database_path(&"a".repeat(4097)).is_err());
}

#[test]
fn test_sanitize_text_keeps_newlines() {
    assert_eq!(InputValidator::sanitize_text("Продам\x00 дом\nсрочно\t!"), "Продам дом\nсрочно\t!");
}

#[test]
fn test_truncate_chars() {
    let text = "Продам квартиру";
    assert_eq!(InputValidator::truncate_chars(text, 6), "Продам");
    assert_eq!(InputValidator::truncate_chars(text, 100), text);
}
