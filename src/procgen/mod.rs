//! Procedural composition of the car from its configuration.
//!
//! - Scene description types (parts, primitives, materials)
//! - Car factory mapping a configuration onto a scene

use bevy::prelude::*;

pub mod car_factory;
pub mod scene;

pub use car_factory::{compose, CarBlueprint, CarPlanning};

pub struct ProcgenPlugin;

impl Plugin for ProcgenPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(car_factory::CarFactoryPlugin);
    }
}
