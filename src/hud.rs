use bevy::prelude::*;

use crate::{
    components::ResultEvent,
    config::GameConfig,
    game_loop::{FrameSet, HudState},
    sim::{GameStatus, HudSnapshot},
};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (update_hud_system, on_add_hud_pop, hud_pop_system)
                    .chain()
                    .in_set(FrameSet::Present),
            )
            .add_observer(on_result);
    }
}

/// How long a label stays highlighted after its value changes.
const POP_SECS: f32 = 0.18;
const POP_COLOR: Color = Color::srgb(1.0, 0.85, 0.3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudField {
    Wood,
    Money,
    Time,
}

/// A live HUD label. `shown` is the last value written, so the text is only
/// touched when what the player sees would actually change.
#[derive(Component, Debug)]
pub struct HudLabel {
    pub field: HudField,
    pub shown: Option<i64>,
}

/// Insert to briefly highlight a label. Same flow as a damage flash: the
/// add hook sets the colour, the timer runs out, the colour goes back.
#[derive(Component)]
pub struct HudPop(pub Timer);

/// Inserted when the result overlay goes up. Later results are ignored.
#[derive(Resource)]
struct ResultShown;

#[derive(Component)]
pub struct ResultOverlay;

/// The number a label shows for the current snapshot. Money is rounded to
/// whole dollars and the clock counts whole seconds up, so 0.2s left still
/// reads 1.
pub fn displayed_value(field: HudField, snapshot: &HudSnapshot) -> i64 {
    match field {
        HudField::Wood => i64::from(snapshot.wood_count),
        HudField::Money => snapshot.money.round() as i64,
        HudField::Time => snapshot.time_left.ceil() as i64,
    }
}

pub fn label_text(field: HudField, value: i64) -> String {
    match field {
        HudField::Wood => format!("Wood: {}", value),
        HudField::Money => format!("Money: {} $", value),
        HudField::Time => format!("Time: {}", value),
    }
}

pub fn result_message(status: GameStatus) -> Option<&'static str> {
    match status {
        GameStatus::Won => Some("YOU WIN!"),
        GameStatus::Lost => Some("TIME'S UP!"),
        GameStatus::Playing => None,
    }
}

fn label_font() -> TextFont {
    TextFont {
        font_size: 28.0,
        ..default()
    }
}

fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                padding: UiRect::all(Val::Px(10.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.35)),
        ))
        .with_children(|parent| {
            for field in [HudField::Wood, HudField::Money, HudField::Time] {
                parent.spawn((
                    HudLabel { field, shown: None },
                    Text::new(""),
                    label_font(),
                    TextColor(Color::WHITE),
                ));
            }
            parent.spawn((
                Text::new(format!("Goal: {} $", config.money_goal.round())),
                label_font(),
                TextColor(Color::WHITE),
            ));
        });
}

fn update_hud_system(
    mut commands: Commands,
    hud: Res<HudState>,
    mut labels: Query<(Entity, &mut HudLabel, &mut Text)>,
) {
    for (entity, mut label, mut text) in &mut labels {
        let value = displayed_value(label.field, &hud.0);
        if label.shown == Some(value) {
            continue;
        }
        text.0 = label_text(label.field, value);
        // The first fill at startup isn't a change worth flashing.
        if label.shown.is_some() {
            commands
                .entity(entity)
                .insert(HudPop(Timer::from_seconds(POP_SECS, TimerMode::Once)));
        }
        label.shown = Some(value);
    }
}

fn on_add_hud_pop(mut query: Query<&mut TextColor, Added<HudPop>>) {
    for mut color in query.iter_mut() {
        color.0 = POP_COLOR;
    }
}

fn hud_pop_system(
    mut commands: Commands,
    mut query: Query<(Entity, &mut TextColor, &mut HudPop)>,
    time: Res<Time>,
) {
    for (entity, mut color, mut pop) in query.iter_mut() {
        pop.0.tick(time.delta());
        if pop.0.is_finished() {
            commands.entity(entity).remove::<HudPop>();
            color.0 = Color::WHITE;
        }
    }
}

fn on_result(trigger: On<ResultEvent>, mut commands: Commands, shown: Option<Res<ResultShown>>) {
    if shown.is_some() {
        return;
    }
    let Some(message) = result_message(trigger.status) else {
        return;
    };
    info!("Showing result: {}", message);
    commands.insert_resource(ResultShown);

    // Full-screen centered container with the result text
    commands
        .spawn((
            ResultOverlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(message),
                TextFont {
                    font_size: 96.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                TextLayout::new_with_justify(Justify::Center),
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(wood_count: u32, money: f32, time_left: f32) -> HudSnapshot {
        HudSnapshot {
            wood_count,
            money,
            time_left,
        }
    }

    #[test]
    fn money_rounds_and_time_rounds_up() {
        let s = snapshot(2, 14.5, 0.2);
        assert_eq!(displayed_value(HudField::Wood, &s), 2);
        assert_eq!(displayed_value(HudField::Money, &s), 15);
        assert_eq!(displayed_value(HudField::Time, &s), 1);

        let s = snapshot(0, 14.49, 0.0);
        assert_eq!(displayed_value(HudField::Money, &s), 14);
        assert_eq!(displayed_value(HudField::Time, &s), 0);
    }

    #[test]
    fn label_formats() {
        assert_eq!(label_text(HudField::Wood, 3), "Wood: 3");
        assert_eq!(label_text(HudField::Money, 42), "Money: 42 $");
        assert_eq!(label_text(HudField::Time, 7), "Time: 7");
    }

    #[test]
    fn playing_has_no_overlay() {
        assert_eq!(result_message(GameStatus::Playing), None);
        assert_eq!(result_message(GameStatus::Won), Some("YOU WIN!"));
        assert_eq!(result_message(GameStatus::Lost), Some("TIME'S UP!"));
    }

    fn hud_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<HudState>()
            .add_systems(
                Update,
                (update_hud_system, on_add_hud_pop, hud_pop_system).chain(),
            )
            .add_observer(on_result);
        app
    }

    #[test]
    fn label_pops_only_when_the_shown_value_changes() {
        let mut app = hud_app();
        let label = app
            .world_mut()
            .spawn((
                HudLabel {
                    field: HudField::Money,
                    shown: None,
                },
                Text::new(""),
                TextColor(Color::WHITE),
            ))
            .id();

        // First fill: text written, no pop.
        app.update();
        assert_eq!(app.world().get::<Text>(label).map(|t| t.0.clone()), Some("Money: 0 $".to_string()));
        assert!(app.world().get::<HudPop>(label).is_none());

        // Sub-dollar change: nothing visible changes.
        app.world_mut().resource_mut::<HudState>().0.money = 0.3;
        app.update();
        assert!(app.world().get::<HudPop>(label).is_none());

        app.world_mut().resource_mut::<HudState>().0.money = 12.0;
        app.update();
        assert_eq!(app.world().get::<Text>(label).map(|t| t.0.clone()), Some("Money: 12 $".to_string()));
        assert!(app.world().get::<HudPop>(label).is_some());
    }

    #[test]
    fn overlay_goes_up_once() {
        let mut app = hud_app();
        app.world_mut().trigger(ResultEvent {
            status: GameStatus::Won,
        });
        app.world_mut().trigger(ResultEvent {
            status: GameStatus::Lost,
        });
        app.update();

        let world = app.world_mut();
        let overlays = world
            .query_filtered::<Entity, With<ResultOverlay>>()
            .iter(world)
            .count();
        assert_eq!(overlays, 1);
    }
}
