//! APEX Customs desktop studio.

use bevy::{log::LogPlugin, prelude::*};

use apex_customs::ApexStudioPlugin;

fn main() {
    // Force Vulkan backend on Windows (DX12 causes crashes on some systems)
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "APEX Customs".into(),
                        resolution: (1280., 720.).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level: bevy::log::Level::INFO,
                    filter: "wgpu=error,naga=warn,apex_customs=info".into(),
                    ..default()
                }),
        )
        .add_plugins(ApexStudioPlugin)
        .run();
}
