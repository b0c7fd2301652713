//! Studio activity state.
//!
//! Tracks whether an AI request is in flight so the customizer can disable its
//! action buttons and so only one request runs at a time.

use bevy::prelude::*;

pub struct StudioStatePlugin;

impl Plugin for StudioStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<StudioActivity>();
    }
}

/// What the studio is waiting on.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum StudioActivity {
    /// Free for a new request.
    #[default]
    Idle,
    /// Waiting for the design critique.
    Reviewing,
    /// Waiting for the photoreal render.
    Rendering,
}

impl StudioActivity {
    pub fn is_busy(self) -> bool {
        self != StudioActivity::Idle
    }
}
