//! Car factory that turns a [`CarConfig`] into a deterministic [`CarScene`].
//!
//! Composition is a pure function of the configuration: the always-present
//! parts come first in a fixed order, optional parts are appended behind their
//! flags. The render layer rebuilds the spawned car whenever the blueprint
//! changes, so nothing here is ever patched in place.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use smallvec::smallvec;

use crate::config::{BodyType, CarConfig, PaintColor};
use crate::procgen::scene::{
    CarScene, MaterialDesc, PartKind, Primitive, ScenePart, Shape, Side, WheelSlot,
};

pub struct CarFactoryPlugin;

impl Plugin for CarFactoryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CarBlueprint>()
            .add_systems(
                Update,
                plan_car
                    .in_set(CarPlanning)
                    .run_if(resource_changed::<CarConfig>),
            );
    }
}

/// Systems that refresh [`CarBlueprint`]. Consumers order themselves after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CarPlanning;

/// Latest composed scene, recomputed whenever the configuration changes.
#[derive(Resource, Default)]
pub struct CarBlueprint {
    pub scene: CarScene,
}

pub const CHASSIS_HEIGHT_Y: f32 = 0.4;
pub const CABIN_HEIGHT_Y: f32 = 0.9;

/// Wheel hub positions relative to the chassis centre. +X is the nose, -Z is
/// the driver's left.
pub const WHEEL_POSITIONS: [(WheelSlot, Vec3); 4] = [
    (WheelSlot::FrontLeft, Vec3::new(1.2, 0.2, -0.9)),
    (WheelSlot::FrontRight, Vec3::new(1.2, 0.2, 0.9)),
    (WheelSlot::RearLeft, Vec3::new(-1.2, 0.2, -0.9)),
    (WheelSlot::RearRight, Vec3::new(-1.2, 0.2, 0.9)),
];

const TIRE_RADIUS: f32 = 0.36;
const TIRE_WIDTH: f32 = 0.3;
const RIM_RADIUS: f32 = 0.25;
const RIM_WIDTH: f32 = 0.32;

const TIRE_COLOR: &str = "#222222";
const GLASS_COLOR: &str = "#111111";
const HEADLIGHT_COLOR: &str = "#ffffff";
const TAIL_LIGHT_COLOR: &str = "#ff0000";

/// Chassis box (length, height, width) per body type.
pub fn chassis_size(body_type: BodyType) -> Vec3 {
    match body_type {
        BodyType::Sedan => Vec3::new(4.0, 0.8, 1.8),
        BodyType::Sport => Vec3::new(4.2, 0.6, 2.0),
        BodyType::Truck => Vec3::new(4.5, 1.2, 2.0),
        BodyType::Cyber => Vec3::new(4.0, 1.0, 1.9),
    }
}

/// Cabin box (length, height, width) per body type.
pub fn cabin_size(body_type: BodyType) -> Vec3 {
    match body_type {
        BodyType::Sedan => Vec3::new(2.0, 0.6, 1.6),
        BodyType::Sport => Vec3::new(1.8, 0.5, 1.5),
        BodyType::Truck => Vec3::new(1.5, 0.8, 1.6),
        BodyType::Cyber => Vec3::new(2.2, 0.6, 1.7),
    }
}

/// The truck cab sits rearward to leave room for the bed.
pub fn cabin_offset_x(body_type: BodyType) -> f32 {
    match body_type {
        BodyType::Truck => -0.5,
        BodyType::Sedan | BodyType::Sport | BodyType::Cyber => 0.0,
    }
}

/// Compose the full car for `config`.
pub fn compose(config: &CarConfig) -> CarScene {
    let mut parts = Vec::with_capacity(11);

    parts.push(chassis(config.body_type, &config.body_color));
    parts.push(cabin(config.body_type));
    parts.extend(
        WHEEL_POSITIONS
            .iter()
            .map(|(slot, position)| wheel(*slot, *position, &config.rim_color)),
    );
    parts.push(headlight(Side::Left));
    parts.push(headlight(Side::Right));
    parts.push(tail_light());

    if config.spoiler {
        parts.push(spoiler(&config.body_color));
    }
    if config.neon_underglow {
        parts.push(underglow(&config.neon_color));
    }

    CarScene { parts }
}

fn plan_car(config: Res<CarConfig>, mut blueprint: ResMut<CarBlueprint>) {
    blueprint.scene = compose(&config);
    info!(
        "Composed {} car: {} parts, {} primitives",
        config.body_type,
        blueprint.scene.parts.len(),
        blueprint.scene.primitive_count()
    );
}

fn box_primitive(size: Vec3, material: MaterialDesc) -> Primitive {
    Primitive {
        shape: Shape::Box { size },
        transform: Transform::IDENTITY,
        material,
        casts_shadow: true,
    }
}

fn chassis(body_type: BodyType, paint: &PaintColor) -> ScenePart {
    // Glossy automotive paint.
    let material = MaterialDesc::matte(paint.clone()).with_surface(0.8, 0.1);
    ScenePart::single(
        PartKind::Chassis,
        Vec3::new(0.0, CHASSIS_HEIGHT_Y, 0.0),
        box_primitive(chassis_size(body_type), material),
    )
}

fn cabin(body_type: BodyType) -> ScenePart {
    let glass = MaterialDesc::matte(PaintColor::from(GLASS_COLOR))
        .with_surface(0.0, 0.0)
        .with_opacity(0.9);
    ScenePart::single(
        PartKind::Cabin,
        Vec3::new(cabin_offset_x(body_type), CABIN_HEIGHT_Y, 0.0),
        box_primitive(cabin_size(body_type), glass),
    )
}

fn wheel(slot: WheelSlot, position: Vec3, rim_color: &PaintColor) -> ScenePart {
    let tire = Primitive {
        shape: Shape::Cylinder {
            radius: TIRE_RADIUS,
            height: TIRE_WIDTH,
        },
        transform: Transform::IDENTITY,
        material: MaterialDesc::matte(PaintColor::from(TIRE_COLOR)),
        casts_shadow: true,
    };
    // Slightly wider than the tire so the cap shows on both faces.
    let rim = Primitive {
        shape: Shape::Cylinder {
            radius: RIM_RADIUS,
            height: RIM_WIDTH,
        },
        transform: Transform::IDENTITY,
        material: MaterialDesc::matte(rim_color.clone()).with_surface(1.0, 0.2),
        casts_shadow: false,
    };

    ScenePart {
        kind: PartKind::Wheel(slot),
        // Lay the cylinder axis along the axle (Z).
        transform: Transform::from_translation(position)
            .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
        primitives: smallvec![tire, rim],
    }
}

fn spoiler(paint: &PaintColor) -> ScenePart {
    let material = MaterialDesc::matte(paint.clone());
    let strut = box_primitive(Vec3::new(0.1, 0.4, 1.6), material.clone());
    let wing = Primitive {
        transform: Transform::from_xyz(0.0, 0.2, 0.0).with_rotation(Quat::from_rotation_x(0.1)),
        ..box_primitive(Vec3::new(0.5, 0.05, 1.8), material)
    };

    ScenePart {
        kind: PartKind::Spoiler,
        transform: Transform::from_xyz(-1.8, 0.8, 0.0),
        primitives: smallvec![strut, wing],
    }
}

fn headlight(side: Side) -> ScenePart {
    let z = match side {
        Side::Left => -0.6,
        Side::Right => 0.6,
    };
    let white = PaintColor::from(HEADLIGHT_COLOR);
    let material = MaterialDesc::matte(white.clone()).with_emission(white, 2.0);
    ScenePart::single(
        PartKind::Headlight(side),
        Vec3::new(2.0, 0.5, z),
        Primitive {
            casts_shadow: false,
            ..box_primitive(Vec3::new(0.1, 0.2, 0.4), material)
        },
    )
}

fn tail_light() -> ScenePart {
    let red = PaintColor::from(TAIL_LIGHT_COLOR);
    let material = MaterialDesc::matte(red.clone()).with_emission(red, 1.5);
    ScenePart::single(
        PartKind::TailLight,
        Vec3::new(-2.1, 0.5, 0.0),
        Primitive {
            casts_shadow: false,
            ..box_primitive(Vec3::new(0.05, 0.1, 1.6), material)
        },
    )
}

fn underglow(neon: &PaintColor) -> ScenePart {
    let material = MaterialDesc::matte(neon.clone())
        .with_emission(neon.clone(), 5.0)
        .with_opacity(0.4);
    ScenePart::single(
        PartKind::Underglow,
        Vec3::new(0.0, 0.01, 0.0),
        Primitive {
            shape: Shape::Plane {
                width: 4.0,
                depth: 2.0,
            },
            transform: Transform::IDENTITY,
            material,
            casts_shadow: false,
        },
    )
}
