//! Studio UI: HUD, customizer panel, AI overlays and the error notice.

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::ai::{AiError, AiOutcome, AiRequest};
use crate::config::CarConfig;
use crate::studio_state::StudioActivity;

pub mod customizer;
pub mod overlays;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(customizer::CustomizerPlugin)
            .add_plugins(overlays::OverlaysPlugin)
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .init_resource::<Notice>()
            .add_systems(Startup, (setup_hud, setup_notice))
            .add_systems(
                Update,
                (
                    update_fps_chip,
                    update_activity_chip,
                    update_wordmark,
                    (
                        clear_notice_on_request,
                        raise_notices,
                        dismiss_notice,
                        expire_notice,
                        sync_notice,
                    )
                        .chain(),
                ),
            );
    }
}

pub(crate) const PANEL_BG: Color = Color::srgba(0.04, 0.045, 0.06, 0.92);
pub(crate) const BORDER: Color = Color::srgba(1.0, 1.0, 1.0, 0.1);
pub(crate) const TEXT_PRIMARY: Color = Color::srgb(0.95, 0.95, 0.97);
pub(crate) const TEXT_MUTED: Color = Color::srgb(0.55, 0.57, 0.62);
pub(crate) const ACCENT: Color = Color::srgb(0.15, 0.39, 0.92);
const ERROR_BG: Color = Color::srgba(0.86, 0.15, 0.15, 0.9);

const REVIEW_FAILED: &str = "Failed to get AI review. Please check your connection.";
const RENDER_FAILED: &str = "AI generation failed. The model might be busy.";
const RENDER_EMPTY: &str = "Failed to generate render.";
const MISSING_KEY: &str = "Set GEMINI_API_KEY to use the AI studio.";

/// Transient, dismissible error notice.
#[derive(Resource)]
pub struct Notice {
    pub message: Option<String>,
    pub timer: Timer,
}

impl Default for Notice {
    fn default() -> Self {
        Self {
            message: None,
            timer: Timer::from_seconds(6.0, TimerMode::Once),
        }
    }
}

impl Notice {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.timer.reset();
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }
}

/// User-facing notice text for an AI outcome, if it warrants one.
pub fn notice_for(outcome: &AiOutcome) -> Option<&'static str> {
    match outcome {
        AiOutcome::Failed {
            error: AiError::MissingApiKey,
            ..
        } => Some(MISSING_KEY),
        AiOutcome::Failed {
            request: AiRequest::Review,
            ..
        } => Some(REVIEW_FAILED),
        AiOutcome::Failed {
            request: AiRequest::Render,
            ..
        } => Some(RENDER_FAILED),
        AiOutcome::RenderEmpty => Some(RENDER_EMPTY),
        AiOutcome::Reviewed(_) | AiOutcome::Rendered(_) => None,
    }
}

#[derive(Component)]
struct FpsChip;

#[derive(Component)]
struct ActivityChip;

#[derive(Component)]
struct Wordmark;

#[derive(Component)]
struct NoticeToast;

#[derive(Component)]
struct NoticeText;

fn chip(parent: &mut ChildBuilder, label: &str, color: Color, marker: impl Bundle) {
    parent
        .spawn((
            Node {
                padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER),
            BorderRadius::all(Val::Px(2.0)),
        ))
        .with_children(|chip| {
            chip.spawn((
                Text::new(label),
                TextFont {
                    font_size: 11.0,
                    ..default()
                },
                TextColor(color),
                marker,
            ));
        });
}

fn setup_hud(mut commands: Commands, config: Res<CarConfig>) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(24.0),
            left: Val::Px(24.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(14.0),
            ..default()
        })
        .with_children(|hud| {
            hud.spawn((
                Text::new(config.brand_name.clone()),
                TextFont {
                    font_size: 40.0,
                    ..default()
                },
                TextColor(TEXT_PRIMARY.with_alpha(0.2)),
                Wordmark,
            ));

            hud.spawn(Node {
                column_gap: Val::Px(12.0),
                ..default()
            })
            .with_children(|row| {
                chip(row, "FPS: --", Color::srgb(0.3, 0.85, 0.45), FpsChip);
                chip(row, "AI: READY", Color::srgb(0.38, 0.65, 0.98), ActivityChip);
            });
        });

    commands.spawn((
        Text::new("Drag: Orbit | Scroll: Zoom | Esc: Cancel AI request"),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(TEXT_MUTED),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(24.0),
            ..default()
        },
    ));
}

fn setup_notice(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(24.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                display: Display::None,
                ..default()
            },
            GlobalZIndex(30),
            NoticeToast,
        ))
        .with_children(|row| {
            row.spawn((
                Button,
                Node {
                    padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                    ..default()
                },
                BackgroundColor(ERROR_BG),
                BorderRadius::MAX,
                NoticeToast,
            ))
            .with_children(|toast| {
                toast.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: 13.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                    NoticeText,
                ));
            });
        });
}

fn update_fps_chip(diagnostics: Res<DiagnosticsStore>, mut query: Query<&mut Text, With<FpsChip>>) {
    let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
    else {
        return;
    };

    for mut text in &mut query {
        **text = format!("FPS: {:.0}", fps);
    }
}

fn update_activity_chip(
    activity: Res<State<StudioActivity>>,
    mut query: Query<&mut Text, With<ActivityChip>>,
) {
    if !activity.is_changed() {
        return;
    }

    let label = match activity.get() {
        StudioActivity::Idle => "AI: READY",
        StudioActivity::Reviewing => "AI: ANALYZING",
        StudioActivity::Rendering => "AI: RENDERING",
    };
    for mut text in &mut query {
        **text = label.to_string();
    }
}

fn update_wordmark(config: Res<CarConfig>, mut query: Query<&mut Text, With<Wordmark>>) {
    if !config.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = config.brand_name.clone();
    }
}

fn clear_notice_on_request(mut requests: EventReader<AiRequest>, mut notice: ResMut<Notice>) {
    if requests.read().count() > 0 && notice.message.is_some() {
        notice.dismiss();
    }
}

fn raise_notices(mut outcomes: EventReader<AiOutcome>, mut notice: ResMut<Notice>) {
    for outcome in outcomes.read() {
        if let Some(message) = notice_for(outcome) {
            notice.show(message);
        }
    }
}

fn dismiss_notice(
    interactions: Query<&Interaction, (Changed<Interaction>, With<NoticeToast>)>,
    mut notice: ResMut<Notice>,
) {
    if interactions.iter().any(|i| *i == Interaction::Pressed) {
        notice.dismiss();
    }
}

fn expire_notice(time: Res<Time>, mut notice: ResMut<Notice>) {
    if notice.message.is_none() {
        return;
    }
    notice.timer.tick(time.delta());
    if notice.timer.finished() {
        notice.dismiss();
    }
}

fn sync_notice(
    notice: Res<Notice>,
    mut toasts: Query<&mut Node, (With<NoticeToast>, Without<Button>)>,
    mut texts: Query<&mut Text, With<NoticeText>>,
) {
    if !notice.is_changed() {
        return;
    }

    for mut node in &mut toasts {
        node.display = if notice.message.is_some() {
            Display::Flex
        } else {
            Display::None
        };
    }
    if let Some(message) = &notice.message {
        for mut text in &mut texts {
            **text = message.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_map_to_original_notices() {
        let review = AiOutcome::Failed {
            request: AiRequest::Review,
            error: AiError::ReviewUnavailable("timeout".into()),
        };
        let render = AiOutcome::Failed {
            request: AiRequest::Render,
            error: AiError::RenderUnavailable("503".into()),
        };
        assert_eq!(notice_for(&review), Some(REVIEW_FAILED));
        assert_eq!(notice_for(&render), Some(RENDER_FAILED));
        assert_eq!(notice_for(&AiOutcome::RenderEmpty), Some(RENDER_EMPTY));
    }

    #[test]
    fn missing_key_gets_its_own_notice() {
        let outcome = AiOutcome::Failed {
            request: AiRequest::Render,
            error: AiError::MissingApiKey,
        };
        assert_eq!(notice_for(&outcome), Some(MISSING_KEY));
    }

    #[test]
    fn notice_expires() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Notice>()
            .add_systems(Update, expire_notice);

        app.world_mut().resource_mut::<Notice>().show("boom");
        app.world_mut()
            .resource_mut::<Notice>()
            .timer
            .set_duration(std::time::Duration::ZERO);
        app.update();

        assert!(app.world().resource::<Notice>().message.is_none());
    }
}
