//! Spawns the composed car under a persistent rig entity and animates the rig.
//!
//! The rig lives for the whole session. Its children are torn down and rebuilt
//! from the [`CarBlueprint`] every time the blueprint changes; the rig's own
//! idle-bob clock survives those rebuilds.

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;

use crate::procgen::scene::{MaterialDesc, PartKind, Shape};
use crate::procgen::{CarBlueprint, CarPlanning};

pub struct CarSpawnerPlugin;

impl Plugin for CarSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BobConfig>()
            .add_systems(Startup, spawn_car_rig)
            .add_systems(
                Update,
                (
                    spawn_car
                        .after(CarPlanning)
                        .run_if(resource_changed::<CarBlueprint>),
                    bob_car_rig,
                ),
            );
    }
}

/// Idle bobbing of the whole car.
#[derive(Resource)]
pub struct BobConfig {
    /// Peak vertical displacement in metres.
    pub amplitude: f32,
    /// Angular speed in radians per second.
    pub speed: f32,
}

impl Default for BobConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.05,
            speed: 1.0,
        }
    }
}

/// Root of the spawned car. Owns the idle animation clock.
#[derive(Component, Default)]
pub struct CarRig {
    /// Seconds since this rig was spawned.
    pub elapsed: f32,
}

/// Marker for one spawned part of the car.
#[derive(Component, Debug)]
pub struct CarPart(pub PartKind);

pub fn bob_offset(elapsed: f32, config: &BobConfig) -> f32 {
    (elapsed * config.speed).sin() * config.amplitude
}

fn spawn_car_rig(mut commands: Commands) {
    commands.spawn((
        CarRig::default(),
        Transform::default(),
        Visibility::default(),
        Name::new("CarRig"),
    ));
}

fn spawn_car(
    mut commands: Commands,
    blueprint: Res<CarBlueprint>,
    rigs: Query<Entity, With<CarRig>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Ok(rig) = rigs.get_single() else {
        warn!("No car rig to spawn into");
        return;
    };

    commands.entity(rig).despawn_descendants();
    commands.entity(rig).with_children(|car| {
        for part in &blueprint.scene.parts {
            car.spawn((
                part.transform,
                Visibility::default(),
                CarPart(part.kind),
                Name::new(format!("{:?}", part.kind)),
            ))
            .with_children(|assembly| {
                for primitive in &part.primitives {
                    let mut entity = assembly.spawn((
                        Mesh3d(meshes.add(mesh_for(primitive.shape))),
                        MeshMaterial3d(materials.add(material_for(&primitive.material))),
                        primitive.transform,
                    ));
                    if !primitive.casts_shadow {
                        entity.insert(NotShadowCaster);
                    }
                }
            });
        }
    });

    debug!("Spawned {} car parts", blueprint.scene.parts.len());
}

fn bob_car_rig(
    time: Res<Time>,
    config: Res<BobConfig>,
    mut rigs: Query<(&mut CarRig, &mut Transform)>,
) {
    for (mut rig, mut transform) in &mut rigs {
        rig.elapsed += time.delta_secs();
        transform.translation.y = bob_offset(rig.elapsed, &config);
    }
}

pub fn mesh_for(shape: Shape) -> Mesh {
    match shape {
        Shape::Box { size } => Mesh::from(Cuboid::from_size(size)),
        Shape::Cylinder { radius, height } => Mesh::from(Cylinder::new(radius, height)),
        Shape::Plane { width, depth } => Mesh::from(Plane3d::default().mesh().size(width, depth)),
    }
}

pub fn material_for(desc: &MaterialDesc) -> StandardMaterial {
    let base_color = desc.base_color.to_color().unwrap_or_else(|| {
        warn!("Unparsable color {:?}, rendering white", desc.base_color.as_str());
        Color::WHITE
    });

    let mut material = StandardMaterial {
        base_color,
        metallic: desc.metallic,
        perceptual_roughness: desc.roughness,
        ..default()
    };

    if let Some(opacity) = desc.opacity {
        material.base_color = base_color.with_alpha(opacity);
        material.alpha_mode = AlphaMode::Blend;
    }

    if let Some(emission) = &desc.emissive {
        let glow = emission
            .color
            .to_color()
            .unwrap_or(base_color)
            .to_linear();
        material.emissive = LinearRgba::new(
            glow.red * emission.intensity,
            glow.green * emission.intensity,
            glow.blue * emission.intensity,
            1.0,
        );
    }

    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarConfig;
    use crate::procgen::car_factory::CarFactoryPlugin;

    fn spawner_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<CarConfig>()
            .add_plugins((CarFactoryPlugin, CarSpawnerPlugin));
        app
    }

    fn part_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query::<&CarPart>().iter(world).count()
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let config = BobConfig::default();
        assert_eq!(bob_offset(0.0, &config), 0.0);
        for step in 0..100 {
            let offset = bob_offset(step as f32 * 0.37, &config);
            assert!(offset.abs() <= config.amplitude + f32::EPSILON);
        }
    }

    #[test]
    fn emissive_material_scales_by_intensity() {
        let desc = MaterialDesc::matte("#ff0000".into()).with_emission("#ff0000".into(), 1.5);
        let material = material_for(&desc);
        assert!((material.emissive.red - 1.5).abs() < 1e-4);
        assert_eq!(material.emissive.green, 0.0);
    }

    #[test]
    fn translucent_material_blends() {
        let desc = MaterialDesc::matte("#111111".into()).with_opacity(0.9);
        let material = material_for(&desc);
        assert!(matches!(material.alpha_mode, AlphaMode::Blend));
        assert!((material.base_color.alpha() - 0.9).abs() < 1e-4);
    }

    #[test]
    fn car_is_rebuilt_when_config_changes() {
        let mut app = spawner_app();
        app.update();
        // Default showroom car: chassis, cabin, 4 wheels, 3 lights, spoiler.
        assert_eq!(part_count(&mut app), 10);

        app.world_mut().resource_mut::<CarConfig>().neon_underglow = true;
        app.update();
        assert_eq!(part_count(&mut app), 11);

        app.world_mut().resource_mut::<CarConfig>().spoiler = false;
        app.update();
        assert_eq!(part_count(&mut app), 10);

        let world = app.world_mut();
        let rigs = world.query::<&CarRig>().iter(world).count();
        assert_eq!(rigs, 1);
    }
}
