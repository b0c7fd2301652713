//! Orbit camera with zoom and clamped tilt; no panning.
//!
//! Slowly circles the car while the user is not dragging. HDR bloom makes the
//! emissive lights and underglow read as glowing.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use bevy::{
    core_pipeline::{bloom::Bloom, tonemapping::Tonemapping},
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    window::PrimaryWindow,
};

use crate::ui::customizer::PANEL_WIDTH;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitConfig>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (orbit_drag, orbit_zoom, auto_rotate, apply_orbit).chain(),
            );
    }
}

#[derive(Resource)]
pub struct OrbitConfig {
    /// Initial eye position.
    pub start_position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    /// Tilt limits, measured from straight up.
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Radians per pixel of mouse drag.
    pub drag_sensitivity: f32,
    /// Fraction of the radius per scroll line.
    pub zoom_step: f32,
    /// Radians per second while idle.
    pub auto_rotate_speed: f32,
    /// Width of the customizer panel docked on the right; input over it is
    /// left to the UI.
    pub ui_panel_width: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(5.0, 3.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 50.0,
            min_polar: FRAC_PI_4,
            max_polar: FRAC_PI_2,
            min_radius: 3.5,
            max_radius: 16.0,
            drag_sensitivity: 0.006,
            zoom_step: 0.1,
            // One revolution every two minutes.
            auto_rotate_speed: TAU / 120.0,
            ui_panel_width: PANEL_WIDTH,
        }
    }
}

/// Spherical camera state around `target`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Rotation around +Y, zero looking down -Z from +Z.
    pub azimuth: f32,
    /// Angle from +Y.
    pub polar: f32,
    pub dragging: bool,
}

impl OrbitCamera {
    pub fn looking_from(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            dragging: false,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + self.radius * Vec3::new(sin_polar * sin_az, cos_polar, sin_polar * cos_az)
    }

    /// Apply a drag delta in screen pixels, keeping the tilt in range.
    pub fn drag(&mut self, delta: Vec2, config: &OrbitConfig) {
        self.azimuth = (self.azimuth - delta.x * config.drag_sensitivity).rem_euclid(TAU);
        self.polar = (self.polar - delta.y * config.drag_sensitivity)
            .clamp(config.min_polar, config.max_polar);
    }

    /// Zoom by scroll lines; positive zooms in.
    pub fn zoom(&mut self, lines: f32, config: &OrbitConfig) {
        let factor = (1.0 - lines * config.zoom_step).max(0.1);
        self.radius = (self.radius * factor).clamp(config.min_radius, config.max_radius);
    }
}

fn setup_camera(mut commands: Commands, config: Res<OrbitConfig>) {
    let mut orbit = OrbitCamera::looking_from(config.start_position, config.target);
    orbit.polar = orbit.polar.clamp(config.min_polar, config.max_polar);

    commands.spawn((
        Camera3d::default(),
        Camera {
            hdr: true,
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            ..default()
        }),
        Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y),
        Tonemapping::TonyMcMapface,
        Bloom::NATURAL,
        orbit,
    ));
}

fn cursor_over_ui(
    window: &Window,
    config: &OrbitConfig,
    interactions: &Query<&Interaction>,
) -> bool {
    let over_panel = window
        .cursor_position()
        .is_some_and(|cursor| cursor.x > window.width() - config.ui_panel_width);
    over_panel || interactions.iter().any(|i| *i != Interaction::None)
}

fn orbit_drag(
    config: Res<OrbitConfig>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
    interactions: Query<&Interaction>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let delta: Vec2 = mouse_motion.read().map(|event| event.delta).sum();

    for mut orbit in &mut cameras {
        if mouse_buttons.just_pressed(MouseButton::Left) {
            let blocked = windows
                .get_single()
                .map(|window| cursor_over_ui(window, &config, &interactions))
                .unwrap_or(false);
            orbit.dragging = !blocked;
        }
        if !mouse_buttons.pressed(MouseButton::Left) {
            orbit.dragging = false;
        }

        if orbit.dragging && delta != Vec2::ZERO {
            orbit.drag(delta, &config);
        }
    }
}

fn orbit_zoom(
    config: Res<OrbitConfig>,
    mut scroll_events: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    interactions: Query<&Interaction>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let lines: f32 = scroll_events
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 40.0,
        })
        .sum();
    if lines == 0.0 {
        return;
    }

    let blocked = windows
        .get_single()
        .map(|window| cursor_over_ui(window, &config, &interactions))
        .unwrap_or(false);
    if blocked {
        return;
    }

    for mut orbit in &mut cameras {
        orbit.zoom(lines, &config);
    }
}

fn auto_rotate(config: Res<OrbitConfig>, time: Res<Time>, mut cameras: Query<&mut OrbitCamera>) {
    for mut orbit in &mut cameras {
        if !orbit.dragging {
            let step = config.auto_rotate_speed * time.delta_secs();
            orbit.azimuth = (orbit.azimuth + step).rem_euclid(TAU);
        }
    }
}

fn apply_orbit(mut cameras: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut cameras {
        *transform = Transform::from_translation(orbit.eye()).looking_at(orbit.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_round_trip_recovers_eye() {
        let eye = Vec3::new(5.0, 3.0, 5.0);
        let orbit = OrbitCamera::looking_from(eye, Vec3::ZERO);
        assert!(orbit.eye().distance(eye) < 1e-4);
        assert!((orbit.azimuth - FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn drag_clamps_tilt() {
        let config = OrbitConfig::default();
        let mut orbit = OrbitCamera::looking_from(config.start_position, Vec3::ZERO);

        // Dragging far downwards would look from directly above.
        orbit.drag(Vec2::new(0.0, 10_000.0), &config);
        assert_eq!(orbit.polar, config.min_polar);

        // Dragging far upwards would look from below the floor.
        orbit.drag(Vec2::new(0.0, -10_000.0), &config);
        assert_eq!(orbit.polar, config.max_polar);
        assert!(orbit.eye().y >= orbit.target.y - 1e-4);
    }

    #[test]
    fn orbit_dead_zone_matches_customizer_panel() {
        assert_eq!(OrbitConfig::default().ui_panel_width, PANEL_WIDTH);
    }

    #[test]
    fn zoom_respects_limits() {
        let config = OrbitConfig::default();
        let mut orbit = OrbitCamera::looking_from(config.start_position, Vec3::ZERO);

        for _ in 0..100 {
            orbit.zoom(3.0, &config);
        }
        assert_eq!(orbit.radius, config.min_radius);

        for _ in 0..100 {
            orbit.zoom(-3.0, &config);
        }
        assert_eq!(orbit.radius, config.max_radius);
    }

    #[test]
    fn idle_camera_drifts_around_target() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<OrbitConfig>()
            .add_systems(Update, (auto_rotate, apply_orbit).chain());

        let orbit = OrbitCamera::looking_from(Vec3::new(5.0, 3.0, 5.0), Vec3::ZERO);
        let radius = orbit.radius;
        let start = orbit.azimuth;
        let camera = app.world_mut().spawn((orbit, Transform::default())).id();

        app.update();
        std::thread::sleep(std::time::Duration::from_millis(20));
        app.update();

        let orbit = app.world().get::<OrbitCamera>(camera).unwrap();
        assert!(orbit.azimuth > start);
        let transform = app.world().get::<Transform>(camera).unwrap();
        assert!((transform.translation.length() - radius).abs() < 1e-3);
    }
}
