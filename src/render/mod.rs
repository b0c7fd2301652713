//! Viewport rendering: the studio stage and the spawned car.

use bevy::prelude::*;

pub mod car_spawner;
pub mod stage;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(stage::StagePlugin)
            .add_plugins(car_spawner::CarSpawnerPlugin);
    }
}
