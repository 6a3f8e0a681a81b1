//! Typed access to free-form application settings.
//!
//! Values come from the `[settings]` table of the config file; keys that are
//! absent there fall back to an environment variable derived from the key
//! (`Features:Upload` → `FEATURES_UPLOAD`). Empty values count as unset.

use std::collections::HashMap;

use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct SettingsService {
    values: HashMap<String, String>,
    env_fallback: bool,
}

impl SettingsService {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values, env_fallback: true }
    }

    /// Only the given values, no environment lookups.
    pub fn isolated(values: HashMap<String, String>) -> Self {
        Self { values, env_fallback: false }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        let value = self
            .values
            .get(key)
            .cloned()
            .or_else(|| if self.env_fallback { std::env::var(env_key(key)).ok() } else { None })
            .filter(|v| !v.is_empty());
        debug!(%key, found = value.is_some(), "setting lookup");
        value
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    /// Unset or unparsable values yield `default`.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_string(key)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(default)
    }

    /// Accepts `true`/`false` in any case; anything else yields `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_string(key).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            _ => default,
        }
    }
}

fn env_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | ':' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SettingsService {
        let mut m = HashMap::new();
        m.insert("Greeting".to_string(), "hello".to_string());
        m.insert("MaxCharacters".to_string(), "50".to_string());
        m.insert("Features:Upload".to_string(), "True".to_string());
        m.insert("Broken".to_string(), "fifty".to_string());
        m.insert("Empty".to_string(), String::new());
        SettingsService::isolated(m)
    }

    #[test]
    fn typed_accessors() {
        let s = settings();
        assert_eq!(s.get_string("Greeting").as_deref(), Some("hello"));
        assert_eq!(s.get_string("Missing"), None);
        assert_eq!(s.get_string_or("Empty", "fallback"), "fallback");
        assert_eq!(s.get_int("MaxCharacters", 0), 50);
        assert_eq!(s.get_int("Broken", 7), 7);
        assert!(s.get_bool("Features:Upload", false));
        assert!(s.get_bool("Greeting", true));
        assert!(!s.get_bool("Missing", false));
    }

    #[test]
    fn env_key_mapping() {
        assert_eq!(env_key("Features:Upload"), "FEATURES_UPLOAD");
        assert_eq!(env_key("dapr.storage-account"), "DAPR_STORAGE_ACCOUNT");
    }

    #[test]
    fn falls_back_to_environment() {
        std::env::set_var("CATALOG_SETTINGS_TEST_LIMIT", "12");
        let s = SettingsService::new(HashMap::new());
        assert_eq!(s.get_int("catalog.settings-test:limit", 0), 12);
        std::env::remove_var("CATALOG_SETTINGS_TEST_LIMIT");
    }
}
