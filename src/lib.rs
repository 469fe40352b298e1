//! Lead Finder - Real-Estate Lead Detection for Chat Messages
//!
//! A Rust library for spotting buy/sell real-estate leads in group chat
//! messages and recording every processed message exactly once.
//!
//! # Features
//!
//! - Keyword and heuristic lead classification with configurable rules
//! - SQLite storage deduplicated by (chat, message) identity
//! - Content fingerprints for spotting reposted texts
//! - Best-effort lead notifications through a pluggable transport

/// Rule-based lead classification
pub mod classifier;
/// Configuration management
pub mod config;
/// Database operations
pub mod db;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Lead notification formatting
pub mod notification;
/// Database schema definitions
pub mod schema;
/// Event processing loop
pub mod service;
/// Transport seams
pub mod transport;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use classifier::LeadAnalyzer;
pub use db::Database;
pub use error::{LeadError, Result};
pub use models::{Category, LeadDecision, LeadStatus, RuleConfiguration};
