//! Studio stage: lighting rig, floor and a fake contact shadow under the car.

use bevy::{
    pbr::{CascadeShadowConfigBuilder, DirectionalLightShadowMap, NotShadowCaster},
    prelude::*,
};

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StageConfig>()
            .insert_resource(DirectionalLightShadowMap { size: 2048 })
            .add_systems(Startup, setup_stage);
    }
}

#[derive(Resource)]
pub struct StageConfig {
    pub backdrop: Color,
    pub ambient: Color,
    pub ambient_brightness: f32,
    pub key_illuminance: f32,
    pub fill_illuminance: f32,
    /// Floor height; sits just under the tire contact patch.
    pub floor_y: f32,
    pub floor_color: Color,
    /// Radius of the soft shadow blob around the car origin.
    pub shadow_radius: f32,
    /// Peak opacity at the centre of the shadow blob.
    pub shadow_opacity: f32,
    /// Concentric rings used to fake the blur falloff.
    pub shadow_rings: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            backdrop: Color::srgb(0.02, 0.02, 0.02),
            ambient: Color::srgb(0.85, 0.9, 1.0),
            ambient_brightness: 400.0,
            key_illuminance: 8000.0,
            fill_illuminance: 2500.0,
            floor_y: -0.2,
            floor_color: Color::srgb(0.03, 0.03, 0.035),
            shadow_radius: 3.2,
            shadow_opacity: 0.6,
            shadow_rings: 4,
        }
    }
}

/// Marker for the contact shadow rings.
#[derive(Component)]
pub struct ContactShadow;

fn setup_stage(
    mut commands: Commands,
    config: Res<StageConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ClearColor(config.backdrop));
    commands.insert_resource(AmbientLight {
        color: config.ambient,
        brightness: config.ambient_brightness,
    });

    // Key light, high and in front of the nose.
    commands.spawn((
        DirectionalLight {
            illuminance: config.key_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(6.0, 10.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
        CascadeShadowConfigBuilder {
            num_cascades: 2,
            minimum_distance: 0.1,
            maximum_distance: 30.0,
            first_cascade_far_bound: 8.0,
            overlap_proportion: 0.3,
        }
        .build(),
    ));

    // Cool rim/fill from behind, no shadows.
    commands.spawn((
        DirectionalLight {
            illuminance: config.fill_illuminance,
            color: Color::srgb(0.7, 0.8, 1.0),
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-6.0, 4.0, -5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Circle::new(40.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: config.floor_color,
            perceptual_roughness: 0.6,
            metallic: 0.2,
            ..default()
        })),
        Transform::from_xyz(0.0, config.floor_y, 0.0)
            .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        NotShadowCaster,
    ));

    // Stacked translucent ellipses darken towards the centre.
    for (index, (radius, alpha)) in
        shadow_rings(config.shadow_radius, config.shadow_opacity, config.shadow_rings)
            .into_iter()
            .enumerate()
    {
        commands.spawn((
            Mesh3d(meshes.add(Ellipse::new(radius, radius * 0.55))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgba(0.0, 0.0, 0.0, alpha),
                alpha_mode: AlphaMode::Blend,
                unlit: true,
                ..default()
            })),
            Transform::from_xyz(0.0, config.floor_y + 0.002 * (index as f32 + 1.0), 0.0)
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
            NotShadowCaster,
            ContactShadow,
        ));
    }

    info!("Stage ready");
}

/// Radii and per-ring alpha for the contact shadow, outermost first. The
/// alphas compose so the centre reaches `peak_opacity`.
pub fn shadow_rings(outer_radius: f32, peak_opacity: f32, rings: u32) -> Vec<(f32, f32)> {
    if rings == 0 {
        return Vec::new();
    }
    // 1 - (1 - a)^n = peak  =>  a = 1 - (1 - peak)^(1/n)
    let per_ring = 1.0 - (1.0 - peak_opacity.clamp(0.0, 0.99)).powf(1.0 / rings as f32);
    (0..rings)
        .map(|i| {
            let radius = outer_radius * (1.0 - i as f32 / rings as f32 * 0.6);
            (radius, per_ring)
        })
        .collect()
}
