use super::store::{Store, StoreError};
use crate::theme::ThemeVariant;

/// Fixed key of the theme preference record.
pub const THEME_KEY: &str = "theme";

impl Store {
    // ========================================================================
    // Theme Preference
    // ========================================================================

    /// The persisted theme, if one was saved and is recognised.
    ///
    /// The record is a JSON string (`"dark"` or `"light"`); a bare word is
    /// accepted too. Unreadable values are ignored.
    pub fn theme_preference(&self) -> Option<ThemeVariant> {
        let raw = match self.get(THEME_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme preference");
                return None;
            }
        };
        let name = serde_json::from_str::<String>(&raw).unwrap_or_else(|_| raw.trim().to_string());
        let variant = ThemeVariant::from_str_name(&name);
        if variant.is_none() {
            tracing::debug!(value = %name, "Ignoring unknown theme preference");
        }
        variant
    }

    /// Persist the chosen theme.
    pub fn set_theme_preference(&self, variant: ThemeVariant) -> Result<(), StoreError> {
        let json = serde_json::Value::String(variant.key().to_string()).to_string();
        self.set(THEME_KEY, &json)
    }
}
