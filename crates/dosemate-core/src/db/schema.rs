//! SQLite schema definition.

/// Complete database schema for the local settings store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Settings (key → JSON document)
-- ============================================================================

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                          -- JSON document
    updated_at TEXT NOT NULL
);
"#;

/// Key of the user settings document.
pub const USER_SETTINGS_KEY: &str = "user_settings";
