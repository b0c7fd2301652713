//! Customizer panel docked on the right edge.

use bevy::{
    input::{
        keyboard::{Key, KeyboardInput},
        ButtonState,
    },
    prelude::*,
};

use super::{ACCENT, BORDER, PANEL_BG, TEXT_MUTED, TEXT_PRIMARY};
use crate::ai::{AiRequest, CancelAiRequest};
use crate::config::palette::{Swatch, NEON_SWATCHES, PAINT_SWATCHES};
use crate::config::{BodyType, CarConfig, ConfigEdit, PaintColor};
use crate::studio_state::StudioActivity;

pub struct CustomizerPlugin;

impl Plugin for CustomizerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FieldFocus>()
            .add_systems(Startup, setup_customizer)
            .add_systems(
                Update,
                (
                    handle_body_type_buttons,
                    handle_swatch_buttons,
                    handle_toggles,
                    handle_action_buttons,
                    (cancel_hotkey, focus_fields, type_into_field).chain(),
                ),
            )
            .add_systems(
                Update,
                (
                    style_body_type_buttons,
                    style_swatches,
                    sync_neon_row,
                    sync_toggle_labels,
                    sync_fields,
                    sync_action_buttons,
                ),
            );
    }
}

pub const PANEL_WIDTH: f32 = 360.0;
pub const MAX_NAME_LEN: usize = 24;

const BUTTON_IDLE: Color = Color::srgba(1.0, 1.0, 1.0, 0.05);
const BUTTON_HOVER: Color = Color::srgba(1.0, 1.0, 1.0, 0.1);
const BUTTON_SELECTED: Color = Color::srgb(0.15, 0.39, 0.92);
const BUTTON_DISABLED: Color = Color::srgba(1.0, 1.0, 1.0, 0.03);
const SWATCH_RING: Color = Color::WHITE;

/// Which identity field is receiving keystrokes.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFocus(pub Option<IdentityField>);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Brand,
    Model,
}

impl IdentityField {
    pub fn current(self, config: &CarConfig) -> &str {
        match self {
            IdentityField::Brand => &config.brand_name,
            IdentityField::Model => &config.model_name,
        }
    }

    pub fn edit(self, value: String) -> ConfigEdit {
        match self {
            IdentityField::Brand => ConfigEdit::BrandName(value),
            IdentityField::Model => ConfigEdit::ModelName(value),
        }
    }

    fn caption(self) -> &'static str {
        match self {
            IdentityField::Brand => "BRAND",
            IdentityField::Model => "MODEL",
        }
    }
}

#[derive(Component)]
struct FieldText(IdentityField);

#[derive(Component)]
struct BodyTypeButton(BodyType);

#[derive(Component)]
struct PaintSwatchButton(PaintColor);

#[derive(Component)]
struct NeonSwatchButton(PaintColor);

#[derive(Component)]
struct NeonRow;

#[derive(Component)]
struct UnderglowToggle;

#[derive(Component)]
struct UnderglowToggleText;

#[derive(Component)]
struct SpoilerToggle;

#[derive(Component)]
struct SpoilerToggleText;

/// Button that starts an AI request.
#[derive(Component)]
struct ActionButton(AiRequest);

#[derive(Component)]
struct ActionLabel(AiRequest);

fn label(text: impl Into<String>, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn spawn_section_title(parent: &mut ChildBuilder, title: &str) {
    parent.spawn((
        label(title, 11.0, TEXT_MUTED),
        Node {
            margin: UiRect::top(Val::Px(6.0)),
            ..default()
        },
    ));
}

fn setup_customizer(mut commands: Commands, config: Res<CarConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(0.0),
                top: Val::Px(0.0),
                width: Val::Px(PANEL_WIDTH),
                height: Val::Percent(100.0),
                padding: UiRect::all(Val::Px(24.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(10.0),
                border: UiRect::left(Val::Px(1.0)),
                overflow: Overflow::clip(),
                ..default()
            },
            BackgroundColor(PANEL_BG),
            BorderColor(BORDER),
        ))
        .with_children(|panel| {
            panel.spawn(label("DESIGN STUDIO", 22.0, TEXT_PRIMARY));
            panel.spawn(label("APEX CUSTOMS v2.0", 11.0, TEXT_MUTED));

            spawn_section_title(panel, "IDENTITY");
            panel
                .spawn(Node {
                    column_gap: Val::Px(8.0),
                    ..default()
                })
                .with_children(|row| {
                    spawn_identity_field(row, IdentityField::Brand, &config);
                    spawn_identity_field(row, IdentityField::Model, &config);
                });

            spawn_section_title(panel, "CHASSIS ARCHITECTURE");
            panel
                .spawn(Node {
                    flex_wrap: FlexWrap::Wrap,
                    column_gap: Val::Px(8.0),
                    row_gap: Val::Px(8.0),
                    ..default()
                })
                .with_children(|grid| {
                    for body_type in BodyType::ALL {
                        spawn_body_type_button(grid, body_type);
                    }
                });

            spawn_section_title(panel, "FINISH");
            panel
                .spawn(Node {
                    flex_wrap: FlexWrap::Wrap,
                    column_gap: Val::Px(10.0),
                    row_gap: Val::Px(10.0),
                    ..default()
                })
                .with_children(|grid| {
                    for swatch in PAINT_SWATCHES {
                        spawn_swatch(grid, swatch, 36.0, PaintSwatchButton(swatch.hex.into()));
                    }
                });

            panel
                .spawn(Node {
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    margin: UiRect::top(Val::Px(6.0)),
                    ..default()
                })
                .with_children(|row| {
                    row.spawn(label("NEON UNDERGLOW", 11.0, TEXT_MUTED));
                    row.spawn((
                        Button,
                        Node {
                            padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                            border: UiRect::all(Val::Px(1.0)),
                            ..default()
                        },
                        BackgroundColor(BUTTON_IDLE),
                        BorderColor(BORDER),
                        BorderRadius::MAX,
                        UnderglowToggle,
                    ))
                    .with_children(|button| {
                        button.spawn((label("OFF", 11.0, TEXT_PRIMARY), UnderglowToggleText));
                    });
                });

            panel
                .spawn((
                    Node {
                        column_gap: Val::Px(10.0),
                        display: Display::None,
                        ..default()
                    },
                    NeonRow,
                ))
                .with_children(|row| {
                    for swatch in NEON_SWATCHES {
                        spawn_swatch(row, swatch, 28.0, NeonSwatchButton(swatch.hex.into()));
                    }
                });

            spawn_section_title(panel, "AERODYNAMICS");
            panel
                .spawn((
                    Button,
                    Node {
                        padding: UiRect::all(Val::Px(10.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BackgroundColor(BUTTON_IDLE),
                    BorderColor(BORDER),
                    BorderRadius::all(Val::Px(4.0)),
                    SpoilerToggle,
                ))
                .with_children(|button| {
                    button.spawn((label("", 13.0, TEXT_PRIMARY), SpoilerToggleText));
                });

            // Actions sit at the bottom of the panel.
            panel
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(8.0),
                    margin: UiRect::top(Val::Auto),
                    ..default()
                })
                .with_children(|actions| {
                    spawn_action_button(actions, AiRequest::Review, Color::srgb(0.11, 0.11, 0.13));
                    spawn_action_button(actions, AiRequest::Render, ACCENT);
                });
        });
}

fn spawn_identity_field(parent: &mut ChildBuilder, field: IdentityField, config: &CarConfig) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            flex_grow: 1.0,
            flex_basis: Val::Px(0.0),
            ..default()
        })
        .with_children(|column| {
            column.spawn(label(field.caption(), 9.0, TEXT_MUTED));
            column
                .spawn((
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(8.0), Val::Px(6.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        min_height: Val::Px(30.0),
                        ..default()
                    },
                    BackgroundColor(BUTTON_IDLE),
                    BorderColor(BORDER),
                    BorderRadius::all(Val::Px(4.0)),
                    field,
                ))
                .with_children(|input| {
                    input.spawn((
                        label(field.current(config), 14.0, TEXT_PRIMARY),
                        FieldText(field),
                    ));
                });
        });
}

fn spawn_body_type_button(parent: &mut ChildBuilder, body_type: BodyType) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(150.0),
                padding: UiRect::all(Val::Px(10.0)),
                flex_direction: FlexDirection::Column,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(BUTTON_IDLE),
            BorderColor(BORDER),
            BorderRadius::all(Val::Px(4.0)),
            BodyTypeButton(body_type),
        ))
        .with_children(|button| {
            button.spawn(label(body_type.label().to_uppercase(), 13.0, TEXT_PRIMARY));
            button.spawn(label(body_type.as_str(), 10.0, TEXT_MUTED));
        });
}

fn spawn_swatch(parent: &mut ChildBuilder, swatch: Swatch, size: f32, marker: impl Bundle) {
    let color = PaintColor::from(swatch.hex)
        .to_color()
        .unwrap_or(Color::WHITE);
    parent.spawn((
        Button,
        Node {
            width: Val::Px(size),
            height: Val::Px(size),
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BackgroundColor(color),
        BorderColor(Color::NONE),
        BorderRadius::MAX,
        marker,
    ));
}

fn spawn_action_button(parent: &mut ChildBuilder, request: AiRequest, color: Color) {
    parent
        .spawn((
            Button,
            Node {
                padding: UiRect::all(Val::Px(14.0)),
                justify_content: JustifyContent::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(color),
            BorderColor(BORDER),
            BorderRadius::all(Val::Px(4.0)),
            ActionButton(request),
        ))
        .with_children(|button| {
            button.spawn((
                label(action_label(request, false), 13.0, TEXT_PRIMARY),
                ActionLabel(request),
            ));
        });
}

fn action_label(request: AiRequest, in_progress: bool) -> &'static str {
    match (request, in_progress) {
        (AiRequest::Review, false) => "AI DESIGN REVIEW",
        (AiRequest::Review, true) => "ANALYZING...",
        (AiRequest::Render, false) => "GENERATE RENDER",
        (AiRequest::Render, true) => "RENDERING...",
    }
}

fn spoiler_label(spoiler: bool) -> &'static str {
    if spoiler {
        "[x] Racing Rear Wing"
    } else {
        "[ ] Racing Rear Wing"
    }
}

fn handle_body_type_buttons(
    interactions: Query<(&Interaction, &BodyTypeButton), (Changed<Interaction>, With<Button>)>,
    mut edits: EventWriter<ConfigEdit>,
) {
    for (interaction, BodyTypeButton(body_type)) in &interactions {
        if *interaction == Interaction::Pressed {
            edits.send(ConfigEdit::BodyType(*body_type));
        }
    }
}

fn handle_swatch_buttons(
    paints: Query<(&Interaction, &PaintSwatchButton), Changed<Interaction>>,
    neons: Query<(&Interaction, &NeonSwatchButton), Changed<Interaction>>,
    mut edits: EventWriter<ConfigEdit>,
) {
    for (interaction, PaintSwatchButton(color)) in &paints {
        if *interaction == Interaction::Pressed {
            edits.send(ConfigEdit::BodyColor(color.clone()));
        }
    }
    for (interaction, NeonSwatchButton(color)) in &neons {
        if *interaction == Interaction::Pressed {
            edits.send(ConfigEdit::NeonColor(color.clone()));
        }
    }
}

fn handle_toggles(
    underglow: Query<&Interaction, (Changed<Interaction>, With<UnderglowToggle>)>,
    spoiler: Query<&Interaction, (Changed<Interaction>, With<SpoilerToggle>)>,
    config: Res<CarConfig>,
    mut edits: EventWriter<ConfigEdit>,
) {
    if underglow.iter().any(|i| *i == Interaction::Pressed) {
        edits.send(ConfigEdit::NeonUnderglow(!config.neon_underglow));
    }
    if spoiler.iter().any(|i| *i == Interaction::Pressed) {
        edits.send(ConfigEdit::Spoiler(!config.spoiler));
    }
}

fn handle_action_buttons(
    interactions: Query<(&Interaction, &ActionButton), Changed<Interaction>>,
    activity: Res<State<StudioActivity>>,
    mut requests: EventWriter<AiRequest>,
) {
    if activity.get().is_busy() {
        return;
    }
    for (interaction, ActionButton(request)) in &interactions {
        if *interaction == Interaction::Pressed {
            info!("Requested AI {:?}", request);
            requests.send(*request);
        }
    }
}

fn cancel_hotkey(
    keyboard: Res<ButtonInput<KeyCode>>,
    focus: Res<FieldFocus>,
    activity: Res<State<StudioActivity>>,
    mut cancels: EventWriter<CancelAiRequest>,
) {
    // Escape blurs a focused field instead.
    if keyboard.just_pressed(KeyCode::Escape) && focus.0.is_none() && activity.get().is_busy() {
        cancels.send(CancelAiRequest);
    }
}

fn focus_fields(
    fields: Query<(&Interaction, &IdentityField), Changed<Interaction>>,
    others: Query<&Interaction, (Changed<Interaction>, With<Button>, Without<IdentityField>)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut focus: ResMut<FieldFocus>,
) {
    if let Some((_, field)) = fields.iter().find(|(i, _)| **i == Interaction::Pressed) {
        focus.set_if_neq(FieldFocus(Some(*field)));
        return;
    }

    // Clicking anywhere else blurs.
    let clicked_elsewhere = others.iter().any(|i| *i == Interaction::Pressed)
        || (mouse_buttons.just_pressed(MouseButton::Left)
            && fields.is_empty()
            && focus.0.is_some());
    if clicked_elsewhere {
        focus.set_if_neq(FieldFocus(None));
    }
}

fn type_into_field(
    mut keys: EventReader<KeyboardInput>,
    mut focus: ResMut<FieldFocus>,
    config: Res<CarConfig>,
    mut edits: EventWriter<ConfigEdit>,
) {
    let Some(field) = focus.0 else {
        keys.clear();
        return;
    };

    let original = field.current(&config);
    let mut value = original.to_string();
    let mut blur = false;
    for event in keys.read() {
        if event.state != ButtonState::Pressed || blur {
            continue;
        }
        match &event.logical_key {
            Key::Character(text) => {
                for ch in text.chars().filter(|ch| !ch.is_control()) {
                    if value.chars().count() < MAX_NAME_LEN {
                        value.push(ch);
                    }
                }
            }
            Key::Space if value.chars().count() < MAX_NAME_LEN => value.push(' '),
            Key::Backspace => {
                value.pop();
            }
            Key::Enter | Key::Escape | Key::Tab => blur = true,
            _ => {}
        }
    }

    if value != original {
        edits.send(field.edit(value));
    }
    if blur {
        focus.0 = None;
    }
}

fn style_body_type_buttons(
    config: Res<CarConfig>,
    mut buttons: Query<(&Interaction, &BodyTypeButton, &mut BackgroundColor, &mut BorderColor)>,
) {
    for (interaction, BodyTypeButton(body_type), mut bg, mut border) in &mut buttons {
        let selected = config.body_type == *body_type;
        bg.0 = match (selected, interaction) {
            (true, _) => BUTTON_SELECTED.with_alpha(0.25),
            (false, Interaction::Hovered | Interaction::Pressed) => BUTTON_HOVER,
            (false, Interaction::None) => BUTTON_IDLE,
        };
        border.0 = if selected { BUTTON_SELECTED } else { BORDER };
    }
}

fn style_swatches(
    config: Res<CarConfig>,
    mut paints: Query<(&PaintSwatchButton, &mut BorderColor)>,
    mut neons: Query<(&NeonSwatchButton, &mut BorderColor), Without<PaintSwatchButton>>,
) {
    if !config.is_changed() {
        return;
    }
    for (PaintSwatchButton(color), mut border) in &mut paints {
        border.0 = ring(*color == config.body_color);
    }
    for (NeonSwatchButton(color), mut border) in &mut neons {
        border.0 = ring(*color == config.neon_color);
    }
}

fn ring(selected: bool) -> Color {
    if selected {
        SWATCH_RING
    } else {
        Color::NONE
    }
}

fn sync_neon_row(config: Res<CarConfig>, mut rows: Query<&mut Node, With<NeonRow>>) {
    if !config.is_changed() {
        return;
    }
    for mut node in &mut rows {
        node.display = if config.neon_underglow {
            Display::Flex
        } else {
            Display::None
        };
    }
}

fn sync_toggle_labels(
    config: Res<CarConfig>,
    mut underglow: Query<&mut Text, With<UnderglowToggleText>>,
    mut spoiler: Query<&mut Text, (With<SpoilerToggleText>, Without<UnderglowToggleText>)>,
    mut toggles: Query<&mut BackgroundColor, With<UnderglowToggle>>,
) {
    if !config.is_changed() {
        return;
    }
    for mut text in &mut underglow {
        **text = if config.neon_underglow { "ON" } else { "OFF" }.to_string();
    }
    for mut bg in &mut toggles {
        bg.0 = if config.neon_underglow {
            BUTTON_SELECTED
        } else {
            BUTTON_IDLE
        };
    }
    for mut text in &mut spoiler {
        **text = spoiler_label(config.spoiler).to_string();
    }
}

fn sync_fields(
    config: Res<CarConfig>,
    focus: Res<FieldFocus>,
    mut texts: Query<(&FieldText, &mut Text)>,
    mut fields: Query<(&IdentityField, &mut BorderColor)>,
) {
    if !config.is_changed() && !focus.is_changed() {
        return;
    }
    for (FieldText(field), mut text) in &mut texts {
        let mut value = field.current(&config).to_string();
        if focus.0 == Some(*field) {
            value.push('|');
        }
        **text = value;
    }
    for (field, mut border) in &mut fields {
        border.0 = if focus.0 == Some(*field) {
            ACCENT
        } else {
            BORDER
        };
    }
}

fn sync_action_buttons(
    activity: Res<State<StudioActivity>>,
    mut buttons: Query<(&ActionButton, &mut BackgroundColor)>,
    mut labels: Query<(&ActionLabel, &mut Text, &mut TextColor)>,
) {
    if !activity.is_changed() {
        return;
    }
    let busy = activity.get().is_busy();
    let running = match activity.get() {
        StudioActivity::Reviewing => Some(AiRequest::Review),
        StudioActivity::Rendering => Some(AiRequest::Render),
        StudioActivity::Idle => None,
    };

    for (ActionButton(request), mut bg) in &mut buttons {
        bg.0 = match (busy, request) {
            (true, _) => BUTTON_DISABLED,
            (false, AiRequest::Review) => Color::srgb(0.11, 0.11, 0.13),
            (false, AiRequest::Render) => ACCENT,
        };
    }
    for (ActionLabel(request), mut text, mut color) in &mut labels {
        **text = action_label(*request, running == Some(*request)).to_string();
        color.0 = if busy { TEXT_MUTED } else { TEXT_PRIMARY };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::keyboard::NativeKey;
    use bevy::state::app::StatesPlugin;

    fn key_event(logical_key: Key) -> KeyboardInput {
        KeyboardInput {
            key_code: KeyCode::KeyA,
            logical_key,
            state: ButtonState::Pressed,
            repeat: false,
            window: Entity::PLACEHOLDER,
        }
    }

    fn typing_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<CarConfig>()
            .init_resource::<FieldFocus>()
            .add_event::<KeyboardInput>()
            .add_event::<ConfigEdit>()
            .add_systems(Update, type_into_field);
        app
    }

    fn sent_edits(app: &mut App) -> Vec<ConfigEdit> {
        app.world_mut()
            .resource_mut::<Events<ConfigEdit>>()
            .drain()
            .collect()
    }

    #[test]
    fn typing_edits_focused_field() {
        let mut app = typing_app();
        app.insert_resource(FieldFocus(Some(IdentityField::Model)));
        app.world_mut().send_event(key_event(Key::Backspace));
        app.world_mut().send_event(key_event(Key::Character("X".into())));
        app.update();

        assert_eq!(sent_edits(&mut app), vec![ConfigEdit::ModelName("RS-X".into())]);
    }

    #[test]
    fn unfocused_keys_are_ignored() {
        let mut app = typing_app();
        app.world_mut().send_event(key_event(Key::Character("Q".into())));
        app.update();

        assert!(sent_edits(&mut app).is_empty());
    }

    #[test]
    fn enter_blurs_and_length_is_capped() {
        let mut app = typing_app();
        app.insert_resource(FieldFocus(Some(IdentityField::Brand)));
        for _ in 0..40 {
            app.world_mut().send_event(key_event(Key::Character("Z".into())));
        }
        app.world_mut().send_event(key_event(Key::Enter));
        app.world_mut().send_event(key_event(Key::Character("late".into())));
        app.world_mut()
            .send_event(key_event(Key::Unidentified(NativeKey::Unidentified)));
        app.update();

        let edits = sent_edits(&mut app);
        let [ConfigEdit::BrandName(name)] = &edits[..] else {
            panic!("expected one brand edit, got {edits:?}");
        };
        assert_eq!(name.chars().count(), MAX_NAME_LEN);
        assert!(name.starts_with("APEXZ"));
        assert_eq!(app.world().resource::<FieldFocus>().0, None);
    }

    #[test]
    fn busy_studio_ignores_action_buttons() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<StudioActivity>()
            .add_event::<AiRequest>()
            .add_systems(Update, handle_action_buttons);
        app.world_mut()
            .insert_resource(NextState::Pending(StudioActivity::Rendering));
        app.update();

        app.world_mut()
            .spawn((Interaction::Pressed, ActionButton(AiRequest::Review)));
        app.update();

        let sent = app.world_mut().resource_mut::<Events<AiRequest>>().drain().count();
        assert_eq!(sent, 0);
    }

    #[test]
    fn labels_track_activity() {
        assert_eq!(action_label(AiRequest::Review, true), "ANALYZING...");
        assert_eq!(action_label(AiRequest::Render, false), "GENERATE RENDER");
        assert_eq!(spoiler_label(true), "[x] Racing Rear Wing");
    }
}
