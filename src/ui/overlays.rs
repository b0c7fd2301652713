//! Review card and full-screen render overlay.

use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssetUsages,
        render_resource::{Extent3d, TextureDimension, TextureFormat},
    },
};

use super::{ACCENT, BORDER, PANEL_BG, TEXT_MUTED, TEXT_PRIMARY};
use crate::ai::{AiOutcome, AiRequest, DesignReview, RenderedImage};
use crate::config::CarConfig;

pub struct OverlaysPlugin;

impl Plugin for OverlaysPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Overlays>()
            .add_systems(Startup, (setup_review_card, setup_render_overlay))
            .add_systems(
                Update,
                (
                    (clear_on_request, collect_outcomes, handle_close_buttons).chain(),
                    (sync_review_card, sync_render_overlay)
                        .run_if(resource_changed::<Overlays>),
                )
                    .chain(),
            );
    }
}

/// What the overlays currently show.
#[derive(Resource, Default)]
pub struct Overlays {
    pub review: Option<DesignReview>,
    pub render: Option<Handle<Image>>,
}

#[derive(Component)]
struct ReviewCard;

#[derive(Component)]
enum ReviewText {
    Rating,
    Segment,
    Critique,
}

#[derive(Component)]
struct SuggestionList;

#[derive(Component)]
struct RenderOverlay;

#[derive(Component)]
struct RenderView;

#[derive(Component)]
struct RenderCaption;

#[derive(Component, Clone, Copy)]
enum CloseButton {
    Review,
    Render,
}

/// Upload-ready texture for a decoded render.
pub fn to_ui_image(rendered: &RenderedImage) -> Image {
    Image::new(
        Extent3d {
            width: rendered.width,
            height: rendered.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        rendered.rgba.clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

fn text(value: impl Into<String>, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(value),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn spawn_close_button(parent: &mut ChildBuilder, which: CloseButton) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.05)),
            BorderColor(BORDER),
            BorderRadius::all(Val::Px(4.0)),
            which,
        ))
        .with_children(|button| {
            button.spawn(text("CLOSE", 11.0, TEXT_PRIMARY));
        });
}

fn setup_review_card(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(24.0),
                bottom: Val::Px(48.0),
                width: Val::Px(420.0),
                padding: UiRect::all(Val::Px(20.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                border: UiRect::all(Val::Px(1.0)),
                display: Display::None,
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER),
            BorderRadius::all(Val::Px(8.0)),
            GlobalZIndex(10),
            ReviewCard,
        ))
        .with_children(|card| {
            card.spawn(Node {
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                ..default()
            })
            .with_children(|header| {
                header.spawn(text("DESIGN REVIEW", 11.0, TEXT_MUTED));
                spawn_close_button(header, CloseButton::Review);
            });

            card.spawn(Node {
                align_items: AlignItems::FlexEnd,
                column_gap: Val::Px(12.0),
                ..default()
            })
            .with_children(|row| {
                row.spawn((text("", 44.0, TEXT_PRIMARY), ReviewText::Rating));
                row.spawn((text("", 13.0, ACCENT), ReviewText::Segment));
            });

            card.spawn((text("", 14.0, TEXT_PRIMARY), ReviewText::Critique));
            card.spawn(text("SUGGESTED ENHANCEMENTS", 10.0, TEXT_MUTED));
            card.spawn((
                Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(4.0),
                    ..default()
                },
                SuggestionList,
            ));
        });
}

fn setup_render_overlay(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                padding: UiRect::all(Val::Px(32.0)),
                display: Display::None,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.9)),
            GlobalZIndex(20),
            RenderOverlay,
        ))
        .with_children(|overlay| {
            overlay.spawn((
                ImageNode::default(),
                Node {
                    max_width: Val::Percent(90.0),
                    max_height: Val::Percent(80.0),
                    ..default()
                },
                RenderView,
            ));
            overlay
                .spawn(Node {
                    column_gap: Val::Px(16.0),
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|footer| {
                    footer.spawn((text("", 20.0, TEXT_PRIMARY), RenderCaption));
                    spawn_close_button(footer, CloseButton::Render);
                });
        });
}

fn clear_on_request(mut requests: EventReader<AiRequest>, mut overlays: ResMut<Overlays>) {
    for request in requests.read() {
        match request {
            AiRequest::Review => overlays.review = None,
            AiRequest::Render => overlays.render = None,
        }
    }
}

fn collect_outcomes(
    mut outcomes: EventReader<AiOutcome>,
    mut overlays: ResMut<Overlays>,
    mut images: ResMut<Assets<Image>>,
) {
    for outcome in outcomes.read() {
        match outcome {
            AiOutcome::Reviewed(review) => overlays.review = Some(review.clone()),
            AiOutcome::Rendered(rendered) => {
                overlays.render = Some(images.add(to_ui_image(rendered)));
            }
            AiOutcome::RenderEmpty | AiOutcome::Failed { .. } => {}
        }
    }
}

fn handle_close_buttons(
    interactions: Query<(&Interaction, &CloseButton), Changed<Interaction>>,
    mut overlays: ResMut<Overlays>,
) {
    for (interaction, which) in &interactions {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match which {
            CloseButton::Review => overlays.review = None,
            CloseButton::Render => overlays.render = None,
        }
    }
}

fn visible(shown: bool) -> Display {
    if shown {
        Display::Flex
    } else {
        Display::None
    }
}

fn sync_review_card(
    mut commands: Commands,
    overlays: Res<Overlays>,
    mut cards: Query<&mut Node, With<ReviewCard>>,
    mut texts: Query<(&ReviewText, &mut Text)>,
    lists: Query<Entity, With<SuggestionList>>,
) {
    for mut node in &mut cards {
        node.display = visible(overlays.review.is_some());
    }
    let Some(review) = &overlays.review else {
        return;
    };

    for (kind, mut value) in &mut texts {
        **value = match kind {
            ReviewText::Rating => format!("{:.1}/10", review.rating),
            ReviewText::Segment => review.market_segment.to_uppercase(),
            ReviewText::Critique => format!("\"{}\"", review.critique),
        };
    }

    for list in &lists {
        commands
            .entity(list)
            .despawn_descendants()
            .with_children(|list| {
                for suggestion in &review.suggested_enhancements {
                    list.spawn(text(format!("+ {suggestion}"), 13.0, TEXT_PRIMARY));
                }
            });
    }
}

fn sync_render_overlay(
    overlays: Res<Overlays>,
    config: Res<CarConfig>,
    mut overlay: Query<&mut Node, With<RenderOverlay>>,
    mut views: Query<&mut ImageNode, With<RenderView>>,
    mut captions: Query<&mut Text, With<RenderCaption>>,
) {
    for mut node in &mut overlay {
        node.display = visible(overlays.render.is_some());
    }
    let Some(handle) = &overlays.render else {
        return;
    };

    for mut view in &mut views {
        view.image = handle.clone();
    }
    for mut caption in &mut captions {
        **caption = format!("{} {}", config.brand_name, config.model_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> DesignReview {
        DesignReview {
            rating: 9.0,
            critique: "Clean lines.".into(),
            suggested_enhancements: vec!["Ceramic brakes".into()],
            market_segment: "Hypercar".into(),
        }
    }

    fn overlay_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Assets<Image>>()
            .init_resource::<Overlays>()
            .add_event::<AiRequest>()
            .add_event::<AiOutcome>()
            .add_systems(Update, (clear_on_request, collect_outcomes).chain());
        app
    }

    #[test]
    fn ui_image_matches_render_size() {
        let image = to_ui_image(&RenderedImage {
            width: 2,
            height: 1,
            rgba: vec![255; 8],
            mime_type: "image/png".into(),
        });
        assert_eq!((image.width(), image.height()), (2, 1));
    }

    #[test]
    fn outcomes_fill_overlays() {
        let mut app = overlay_app();
        app.world_mut().send_event(AiOutcome::Reviewed(review()));
        app.world_mut().send_event(AiOutcome::Rendered(RenderedImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
            mime_type: "image/png".into(),
        }));
        app.update();

        let overlays = app.world().resource::<Overlays>();
        assert_eq!(overlays.review.as_ref().map(|r| r.rating), Some(9.0));
        assert!(overlays.render.is_some());
    }

    #[test]
    fn new_request_clears_only_its_overlay() {
        let mut app = overlay_app();
        app.world_mut().send_event(AiOutcome::Reviewed(review()));
        app.update();

        app.world_mut().send_event(AiRequest::Render);
        app.update();
        assert!(app.world().resource::<Overlays>().review.is_some());

        app.world_mut().send_event(AiRequest::Review);
        app.update();
        assert!(app.world().resource::<Overlays>().review.is_none());
    }
}
