//! APEX Customs - interactive 3D car customization studio.
//!
//! A Bevy app that composes a stylized car from a small configuration,
//! shows it on a lit studio stage with an orbit camera, and asks a
//! generative AI service for design critiques and photoreal renders.

use bevy::prelude::*;

pub mod ai;
pub mod camera;
pub mod config;
pub mod procgen;
pub mod render;
pub mod studio_state;
pub mod ui;

/// Everything except the window and default plugins.
pub struct ApexStudioPlugin;

impl Plugin for ApexStudioPlugin {
    fn build(&self, app: &mut App) {
        app
            // Studio state management
            .add_plugins(studio_state::StudioStatePlugin)
            // Configuration and presets
            .add_plugins(config::ConfigPlugin)
            // Procedural composition
            .add_plugins(procgen::ProcgenPlugin)
            // Viewport
            .add_plugins(camera::CameraPlugin)
            .add_plugins(render::RenderPlugin)
            // AI collaborator
            .add_plugins(ai::AiPlugin)
            // Customizer and overlays
            .add_plugins(ui::UiPlugin);
    }
}
