//! Car configuration model.
//!
//! [`CarConfig`] is an immutable value: every edit arrives as a [`ConfigEdit`]
//! event and produces a fresh copy which then replaces the resource wholesale.
//! Readers of the resource therefore only ever see a complete configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

pub mod palette;
pub mod settings;

pub use settings::StudioSettings;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<StudioSettings>() {
            app.insert_resource(StudioSettings::from_env());
        }

        app.init_resource::<CarConfig>()
            .add_event::<ConfigEdit>()
            .add_systems(Startup, load_preset)
            .add_systems(PreUpdate, apply_config_edits);
    }
}

/// Errors raised while turning external input into a [`CarConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: unknown body type `{0}` (expected sedan, sport, truck or cyber)")]
    InvalidConfig(String),
    #[error("failed to read preset {path}: {source}")]
    PresetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed preset: {0}")]
    PresetFormat(#[from] serde_json::Error),
}

/// Chassis family. Every geometry table matches on this exhaustively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyType {
    Sedan,
    #[default]
    Sport,
    Truck,
    Cyber,
}

impl BodyType {
    pub const ALL: [BodyType; 4] = [
        BodyType::Sedan,
        BodyType::Sport,
        BodyType::Truck,
        BodyType::Cyber,
    ];

    /// Identifier used in presets and prompts.
    pub fn as_str(self) -> &'static str {
        match self {
            BodyType::Sedan => "sedan",
            BodyType::Sport => "sport",
            BodyType::Truck => "truck",
            BodyType::Cyber => "cyber",
        }
    }

    /// Showroom name displayed on the customizer buttons.
    pub fn label(self) -> &'static str {
        match self {
            BodyType::Sedan => "Executive",
            BodyType::Sport => "Velocity",
            BodyType::Truck => "Colossus",
            BodyType::Cyber => "Epoch",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedan" => Ok(BodyType::Sedan),
            "sport" => Ok(BodyType::Sport),
            "truck" => Ok(BodyType::Truck),
            "cyber" => Ok(BodyType::Cyber),
            other => Err(ConfigError::InvalidConfig(other.to_string())),
        }
    }
}

/// A color as the user supplied it. Not validated; conversion to a render
/// color happens where a renderer needs one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintColor(String);

impl PaintColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse hex notation (`#rgb`, `#rrggbb`, with optional alpha).
    pub fn to_color(&self) -> Option<Color> {
        Srgba::hex(self.0.trim()).ok().map(Color::from)
    }
}

impl From<&str> for PaintColor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PaintColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The current car design.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct CarConfig {
    pub body_type: BodyType,
    pub body_color: PaintColor,
    pub rim_color: PaintColor,
    /// Cabin glass tint. Carried with the design but not used for rendering.
    pub window_tint: PaintColor,
    pub spoiler: bool,
    pub neon_underglow: bool,
    pub neon_color: PaintColor,
    pub brand_name: String,
    pub model_name: String,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            body_type: BodyType::Sport,
            body_color: PaintColor::from("#ff0000"),
            rim_color: PaintColor::from("#1a1a1a"),
            window_tint: PaintColor::from("rgba(0,0,0,0.8)"),
            spoiler: true,
            neon_underglow: false,
            neon_color: PaintColor::from("#00ffff"),
            brand_name: "APEX".to_string(),
            model_name: "RS-1".to_string(),
        }
    }
}

/// A single user edit. Each variant overrides one field.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum ConfigEdit {
    BodyType(BodyType),
    BodyColor(PaintColor),
    RimColor(PaintColor),
    WindowTint(PaintColor),
    NeonColor(PaintColor),
    Spoiler(bool),
    NeonUnderglow(bool),
    BrandName(String),
    ModelName(String),
}

impl CarConfig {
    /// Copy of `self` with one field overridden.
    pub fn with_edit(&self, edit: &ConfigEdit) -> CarConfig {
        let mut next = self.clone();
        match edit {
            ConfigEdit::BodyType(body_type) => next.body_type = *body_type,
            ConfigEdit::BodyColor(color) => next.body_color = color.clone(),
            ConfigEdit::RimColor(color) => next.rim_color = color.clone(),
            ConfigEdit::WindowTint(color) => next.window_tint = color.clone(),
            ConfigEdit::NeonColor(color) => next.neon_color = color.clone(),
            ConfigEdit::Spoiler(enabled) => next.spoiler = *enabled,
            ConfigEdit::NeonUnderglow(enabled) => next.neon_underglow = *enabled,
            ConfigEdit::BrandName(name) => next.brand_name = name.clone(),
            ConfigEdit::ModelName(name) => next.model_name = name.clone(),
        }
        next
    }

    /// Copy of `self` with every field present in `preset` overridden.
    pub fn with_preset(&self, preset: ConfigPreset) -> Result<CarConfig, ConfigError> {
        let mut next = self.clone();
        if let Some(body_type) = preset.body_type {
            next.body_type = body_type.parse()?;
        }
        if let Some(color) = preset.body_color {
            next.body_color = PaintColor::new(color);
        }
        if let Some(color) = preset.rim_color {
            next.rim_color = PaintColor::new(color);
        }
        if let Some(color) = preset.window_tint {
            next.window_tint = PaintColor::new(color);
        }
        if let Some(color) = preset.neon_color {
            next.neon_color = PaintColor::new(color);
        }
        if let Some(enabled) = preset.spoiler {
            next.spoiler = enabled;
        }
        if let Some(enabled) = preset.neon_underglow {
            next.neon_underglow = enabled;
        }
        if let Some(name) = preset.brand_name {
            next.brand_name = name;
        }
        if let Some(name) = preset.model_name {
            next.model_name = name;
        }
        Ok(next)
    }

    /// Parse a JSON preset layered over the default design.
    pub fn from_json(json: &str) -> Result<CarConfig, ConfigError> {
        let preset: ConfigPreset = serde_json::from_str(json)?;
        CarConfig::default().with_preset(preset)
    }

    pub fn from_preset_file(path: &Path) -> Result<CarConfig, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::PresetIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// On-disk preset. Missing fields keep their default values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigPreset {
    pub body_type: Option<String>,
    pub body_color: Option<String>,
    pub rim_color: Option<String>,
    pub window_tint: Option<String>,
    pub spoiler: Option<bool>,
    pub neon_underglow: Option<bool>,
    pub neon_color: Option<String>,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
}

fn load_preset(settings: Res<StudioSettings>, mut config: ResMut<CarConfig>) {
    let Some(path) = settings.preset_path.as_deref() else {
        return;
    };

    match CarConfig::from_preset_file(path) {
        Ok(preset) => {
            info!("Loaded car preset from {}", path.display());
            config.set_if_neq(preset);
        }
        Err(err) => warn!("Ignoring preset: {err}"),
    }
}

fn apply_config_edits(mut edits: EventReader<ConfigEdit>, mut config: ResMut<CarConfig>) {
    let mut next: Option<CarConfig> = None;
    for edit in edits.read() {
        let current = next.take().unwrap_or_else(|| config.clone());
        next = Some(current.with_edit(edit));
    }

    if let Some(next) = next {
        if config.set_if_neq(next) {
            debug!("Config updated: {:?}", *config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_design_matches_showroom_car() {
        let config = CarConfig::default();
        assert_eq!(config.body_type, BodyType::Sport);
        assert_eq!(config.body_color.as_str(), "#ff0000");
        assert_eq!(config.rim_color.as_str(), "#1a1a1a");
        assert!(config.spoiler);
        assert!(!config.neon_underglow);
        assert_eq!(config.brand_name, "APEX");
        assert_eq!(config.model_name, "RS-1");
    }

    #[test]
    fn body_type_parses_known_names() {
        for body_type in BodyType::ALL {
            assert_eq!(body_type.as_str().parse::<BodyType>().unwrap(), body_type);
        }
    }

    #[test]
    fn unknown_body_type_is_invalid_config() {
        let err = "van".parse::<BodyType>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(ref name) if name == "van"));

        // Case matters; presets use the lowercase identifiers.
        assert!("Sport".parse::<BodyType>().is_err());
    }

    #[test]
    fn with_edit_leaves_source_untouched() {
        let original = CarConfig::default();
        let edited = original.with_edit(&ConfigEdit::NeonUnderglow(true));

        assert!(!original.neon_underglow);
        assert!(edited.neon_underglow);
        assert_eq!(
            CarConfig {
                neon_underglow: false,
                ..edited
            },
            original
        );
    }

    #[test]
    fn preset_overrides_only_given_fields() {
        let config =
            CarConfig::from_json(r#"{ "bodyType": "truck", "neonUnderglow": true }"#).unwrap();
        assert_eq!(config.body_type, BodyType::Truck);
        assert!(config.neon_underglow);
        assert_eq!(config.body_color, CarConfig::default().body_color);
    }

    #[test]
    fn preset_with_unknown_body_type_is_rejected() {
        let err = CarConfig::from_json(r#"{ "bodyType": "hovercraft" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn paint_color_parses_hex_only() {
        assert!(PaintColor::from("#ff0000").to_color().is_some());
        assert!(PaintColor::from("#111").to_color().is_some());
        assert!(PaintColor::from("rgba(0,0,0,0.8)").to_color().is_none());
    }

    #[test]
    fn edits_replace_resource_in_order() {
        let mut app = App::new();
        app.add_event::<ConfigEdit>()
            .init_resource::<CarConfig>()
            .add_systems(Update, apply_config_edits);

        app.world_mut().send_event(ConfigEdit::BodyType(BodyType::Cyber));
        app.world_mut().send_event(ConfigEdit::BodyColor("#0066ff".into()));
        app.world_mut().send_event(ConfigEdit::BodyColor("#ffd700".into()));
        app.update();

        let config = app.world().resource::<CarConfig>();
        assert_eq!(config.body_type, BodyType::Cyber);
        assert_eq!(config.body_color.as_str(), "#ffd700");
    }
}
