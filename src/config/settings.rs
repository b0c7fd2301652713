//! Process-level settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;

/// Settings for the AI collaborator and startup preset.
#[derive(Resource, Clone, Debug)]
pub struct StudioSettings {
    /// Gemini API key. Requests fail fast when absent.
    pub api_key: Option<String>,
    /// REST root, without trailing `/models`.
    pub base_url: String,
    /// Model used for the structured design critique.
    pub review_model: String,
    /// Model used for image renders.
    pub render_model: String,
    pub render_aspect_ratio: String,
    pub request_timeout: Duration,
    /// JSON preset applied on startup.
    pub preset_path: Option<PathBuf>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            review_model: "gemini-3-flash-preview".to_string(),
            render_model: "gemini-2.5-flash-image".to_string(),
            render_aspect_ratio: "16:9".to_string(),
            request_timeout: Duration::from_secs(90),
            preset_path: None,
        }
    }
}

impl StudioSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            base_url: get("APEX_GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            review_model: get("APEX_REVIEW_MODEL").unwrap_or(defaults.review_model),
            render_model: get("APEX_RENDER_MODEL").unwrap_or(defaults.render_model),
            render_aspect_ratio: defaults.render_aspect_ratio,
            request_timeout: get("APEX_REQUEST_TIMEOUT_SECS")
                .and_then(|secs| secs.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            preset_path: get("APEX_PRESET").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let settings = StudioSettings::from_lookup(lookup(&[]));
        assert!(settings.api_key.is_none());
        assert_eq!(settings.review_model, "gemini-3-flash-preview");
        assert_eq!(settings.render_model, "gemini-2.5-flash-image");
        assert!(settings.preset_path.is_none());
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        let settings =
            StudioSettings::from_lookup(lookup(&[("API_KEY", "generic"), ("GEMINI_API_KEY", "g")]));
        assert_eq!(settings.api_key.as_deref(), Some("g"));

        let settings = StudioSettings::from_lookup(lookup(&[("API_KEY", "generic")]));
        assert_eq!(settings.api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings = StudioSettings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "  "),
            ("APEX_REQUEST_TIMEOUT_SECS", "abc"),
        ]));
        assert!(settings.api_key.is_none());
        assert_eq!(settings.request_timeout, Duration::from_secs(90));
    }
}
