//! Settings database operations.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::{Database, DbError, DbResult, USER_SETTINGS_KEY};
use crate::models::Settings;

impl Database {
    /// Load user settings, or defaults when none were saved.
    pub fn load_settings(&self) -> DbResult<Settings> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                [USER_SETTINGS_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                debug!("no saved settings, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// Validate and save user settings, replacing any previous value.
    pub fn save_settings(&self, settings: &Settings) -> DbResult<()> {
        settings.validate().map_err(DbError::Constraint)?;
        let json = serde_json::to_string(settings)?;

        self.conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![USER_SETTINGS_KEY, json, chrono::Utc::now().to_rfc3339()],
        )?;
        info!(locale = settings.locale.tag(), "settings saved");
        Ok(())
    }

    /// Remove saved settings so the next load returns defaults.
    pub fn reset_settings(&self) -> DbResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?", [USER_SETTINGS_KEY])?;
        Ok(rows > 0)
    }

    /// When the settings were last saved (RFC 3339).
    pub fn settings_updated_at(&self) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT updated_at FROM settings WHERE key = ?",
                [USER_SETTINGS_KEY],
                |row| row.get(0),
            )
            .optional()?)
    }
}
