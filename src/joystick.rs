use bevy::{input::touch::Touches, prelude::*, window::PrimaryWindow};

use crate::game_loop::FrameSet;

pub struct JoystickPlugin;

impl Plugin for JoystickPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<JoystickInput>()
            .add_systems(Startup, setup_joystick_widget)
            .add_systems(Update, read_joystick_system.in_set(FrameSet::Input))
            .add_systems(Update, draw_joystick_system.in_set(FrameSet::Present));
    }
}

/// Widget sizes in logical pixels.
pub const BASE_SIZE: f32 = 120.0;
pub const THUMB_SIZE: f32 = 54.0;
/// How far the thumb can travel from where the drag started. Keeps the thumb
/// inside the base.
pub const THUMB_TRAVEL: f32 = BASE_SIZE / 2.0 - THUMB_SIZE / 2.0;

const UP_KEYS: [KeyCode; 2] = [KeyCode::KeyW, KeyCode::ArrowUp];
const DOWN_KEYS: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];
const LEFT_KEYS: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];

/// Live joystick state, rewritten every frame before the simulation runs.
///
/// The joystick floats: wherever the mouse or finger goes down becomes the
/// centre, and dragging away from it steers. Keys work too.
#[derive(Resource, Default, Debug)]
pub struct JoystickInput {
    /// Screen-space direction, length at most 1. +y is down the screen.
    pub vector: Vec2,
    /// True only on the frame a press started.
    pub pressed: bool,
    /// Where the active drag started, if a finger or the mouse is down.
    pub anchor: Option<Vec2>,
    mouse_anchor: Option<Vec2>,
}

/// The ring drawn where a drag starts. Hidden while nothing is dragging.
#[derive(Component)]
pub struct JoystickBase;

#[derive(Component)]
pub struct JoystickThumb;

/// Thumb position inside the base node, as (left, top).
pub fn thumb_position(vector: Vec2) -> Vec2 {
    Vec2::splat(THUMB_TRAVEL) + vector * THUMB_TRAVEL
}

/// Turns a drag offset into a joystick vector by clamping it to the thumb's
/// travel and scaling into unit range.
pub fn joystick_vector(offset: Vec2, max_offset: f32) -> Vec2 {
    if max_offset <= 0.0 {
        return Vec2::ZERO;
    }
    offset.clamp_length_max(max_offset) / max_offset
}

pub fn keyboard_vector(keys: &ButtonInput<KeyCode>) -> Vec2 {
    let mut vector = Vec2::ZERO;
    if keys.any_pressed(LEFT_KEYS) {
        vector.x -= 1.0;
    }
    if keys.any_pressed(RIGHT_KEYS) {
        vector.x += 1.0;
    }
    if keys.any_pressed(UP_KEYS) {
        vector.y -= 1.0;
    }
    if keys.any_pressed(DOWN_KEYS) {
        vector.y += 1.0;
    }
    vector.normalize_or_zero()
}

fn read_joystick_system(
    mut joystick: ResMut<JoystickInput>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let cursor = windows.single().ok().and_then(|window| window.cursor_position());

    if mouse.just_pressed(MouseButton::Left) {
        joystick.mouse_anchor = cursor;
    }
    if !mouse.pressed(MouseButton::Left) {
        joystick.mouse_anchor = None;
    }

    let moving_keys = UP_KEYS.into_iter().chain(DOWN_KEYS).chain(LEFT_KEYS).chain(RIGHT_KEYS);
    joystick.pressed = mouse.just_pressed(MouseButton::Left)
        || touches.any_just_pressed()
        || keys.any_just_pressed(moving_keys);

    // A finger beats the mouse, and either beats the keyboard.
    if let Some(touch) = touches.iter().next() {
        joystick.anchor = Some(touch.start_position());
        joystick.vector = joystick_vector(touch.position() - touch.start_position(), THUMB_TRAVEL);
    } else if let (Some(anchor), Some(cursor)) = (joystick.mouse_anchor, cursor) {
        joystick.anchor = Some(anchor);
        joystick.vector = joystick_vector(cursor - anchor, THUMB_TRAVEL);
    } else {
        joystick.anchor = None;
        joystick.vector = keyboard_vector(&keys);
    }
}

fn setup_joystick_widget(mut commands: Commands) {
    commands
        .spawn((
            JoystickBase,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Px(BASE_SIZE),
                height: Val::Px(BASE_SIZE),
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.18)),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            let rest = thumb_position(Vec2::ZERO);
            parent.spawn((
                JoystickThumb,
                Node {
                    position_type: PositionType::Absolute,
                    width: Val::Px(THUMB_SIZE),
                    height: Val::Px(THUMB_SIZE),
                    left: Val::Px(rest.x),
                    top: Val::Px(rest.y),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.55)),
            ));
        });
}

/// Centres the base on the drag anchor and moves the thumb with the vector.
/// On release the base hides and the thumb goes back to the middle.
fn draw_joystick_system(
    joystick: Res<JoystickInput>,
    mut bases: Query<(&mut Node, &mut Visibility), (With<JoystickBase>, Without<JoystickThumb>)>,
    mut thumbs: Query<&mut Node, (With<JoystickThumb>, Without<JoystickBase>)>,
) {
    let Ok((mut base, mut visibility)) = bases.single_mut() else {
        return;
    };
    let Ok(mut thumb) = thumbs.single_mut() else {
        return;
    };

    let Some(anchor) = joystick.anchor else {
        *visibility = Visibility::Hidden;
        let rest = thumb_position(Vec2::ZERO);
        thumb.left = Val::Px(rest.x);
        thumb.top = Val::Px(rest.y);
        return;
    };

    *visibility = Visibility::Inherited;
    base.left = Val::Px(anchor.x - BASE_SIZE / 2.0);
    base.top = Val::Px(anchor.y - BASE_SIZE / 2.0);
    let position = thumb_position(joystick.vector);
    thumb.left = Val::Px(position.x);
    thumb.top = Val::Px(position.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::input::touch::{TouchInput, TouchPhase, touch_screen_input_system};

    #[test]
    fn short_drag_scales_linearly() {
        let v = joystick_vector(Vec2::new(16.5, 0.0), THUMB_TRAVEL);
        assert!((v - Vec2::new(0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn long_drag_is_clamped_to_unit() {
        let v = joystick_vector(Vec2::new(300.0, -400.0), THUMB_TRAVEL);
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert!((v - Vec2::new(0.6, -0.8)).length() < 1e-5);
    }

    #[test]
    fn keys_combine_into_a_unit_vector() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyD);
        keys.press(KeyCode::ArrowUp);

        let v = keyboard_vector(&keys);
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert!(v.x > 0.0 && v.y < 0.0);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyA);
        keys.press(KeyCode::KeyD);
        assert_eq!(keyboard_vector(&keys), Vec2::ZERO);
    }

    fn input_app() -> App {
        let mut app = App::new();
        app.init_resource::<JoystickInput>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<Touches>()
            .add_message::<TouchInput>()
            .add_systems(PreUpdate, touch_screen_input_system)
            .add_systems(Update, read_joystick_system);
        app
    }

    fn spawn_window(app: &mut App, cursor: Vec2) {
        let mut window = Window::default();
        window.set_cursor_position(Some(cursor));
        app.world_mut().spawn((window, PrimaryWindow));
    }

    fn move_cursor(app: &mut App, cursor: Vec2) {
        let world = app.world_mut();
        let mut windows = world.query::<&mut Window>();
        for mut window in windows.iter_mut(world) {
            window.set_cursor_position(Some(cursor));
        }
    }

    fn touch(app: &mut App, phase: TouchPhase, position: Vec2) {
        app.world_mut().write_message(TouchInput {
            phase,
            position,
            window: Entity::PLACEHOLDER,
            force: None,
            id: 0,
        });
    }

    /// What the input plugin does at the start of every frame.
    fn clear_buttons(app: &mut App) {
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().clear();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    fn joystick(app: &App) -> &JoystickInput {
        app.world().resource::<JoystickInput>()
    }

    #[test]
    fn key_press_counts_for_one_frame() {
        let mut app = input_app();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::KeyW);
        app.update();
        assert!(joystick(&app).pressed);
        assert_eq!(joystick(&app).vector, Vec2::new(0.0, -1.0));
        assert_eq!(joystick(&app).anchor, None);

        // Still held, but no longer a fresh press.
        clear_buttons(&mut app);
        app.update();
        assert!(!joystick(&app).pressed);
        assert_eq!(joystick(&app).vector, Vec2::new(0.0, -1.0));

        clear_buttons(&mut app);
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().release(KeyCode::KeyW);
        app.update();
        assert_eq!(joystick(&app).vector, Vec2::ZERO);
    }

    #[test]
    fn mouse_drag_steers_from_the_press_point() {
        let mut app = input_app();
        spawn_window(&mut app, Vec2::new(200.0, 200.0));

        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().press(MouseButton::Left);
        app.update();
        assert!(joystick(&app).pressed);
        assert_eq!(joystick(&app).anchor, Some(Vec2::new(200.0, 200.0)));
        assert_eq!(joystick(&app).vector, Vec2::ZERO);

        clear_buttons(&mut app);
        move_cursor(&mut app, Vec2::new(200.0 + THUMB_TRAVEL / 2.0, 200.0));
        app.update();
        assert!(!joystick(&app).pressed);
        assert!((joystick(&app).vector - Vec2::new(0.5, 0.0)).length() < 1e-5);

        clear_buttons(&mut app);
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().release(MouseButton::Left);
        app.update();
        assert_eq!(joystick(&app).anchor, None);
        assert_eq!(joystick(&app).vector, Vec2::ZERO);
    }

    #[test]
    fn touch_beats_mouse_and_mouse_beats_keys() {
        let mut app = input_app();
        spawn_window(&mut app, Vec2::new(10.0, 10.0));
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().press(MouseButton::Left);
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::KeyD);
        touch(&mut app, TouchPhase::Started, Vec2::new(100.0, 100.0));
        app.update();
        assert!(joystick(&app).pressed);
        assert_eq!(joystick(&app).anchor, Some(Vec2::new(100.0, 100.0)));

        // Finger drags down. Keys alone would say right.
        clear_buttons(&mut app);
        touch(&mut app, TouchPhase::Moved, Vec2::new(100.0, 100.0 + 2.0 * THUMB_TRAVEL));
        app.update();
        assert!(!joystick(&app).pressed);
        assert!((joystick(&app).vector - Vec2::new(0.0, 1.0)).length() < 1e-5);

        // Finger lifts: the held mouse takes over from its own anchor.
        clear_buttons(&mut app);
        touch(&mut app, TouchPhase::Ended, Vec2::new(100.0, 100.0 + 2.0 * THUMB_TRAVEL));
        move_cursor(&mut app, Vec2::new(10.0 - THUMB_TRAVEL, 10.0));
        app.update();
        assert_eq!(joystick(&app).anchor, Some(Vec2::new(10.0, 10.0)));
        assert!((joystick(&app).vector - Vec2::new(-1.0, 0.0)).length() < 1e-5);

        // Mouse up: only the key is left.
        clear_buttons(&mut app);
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().release(MouseButton::Left);
        app.update();
        assert_eq!(joystick(&app).anchor, None);
        assert_eq!(joystick(&app).vector, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn thumb_rests_in_the_middle_of_the_base() {
        assert_eq!(thumb_position(Vec2::ZERO), Vec2::splat(33.0));
        // Full deflection puts the thumb's edge on the base's edge.
        assert_eq!(thumb_position(Vec2::new(1.0, 0.0)).x + THUMB_SIZE, BASE_SIZE);
    }

    #[test]
    fn widget_follows_the_drag_and_hides_on_release() {
        let mut app = App::new();
        app.init_resource::<JoystickInput>()
            .add_systems(Startup, setup_joystick_widget)
            .add_systems(Update, draw_joystick_system);

        {
            let mut joystick = app.world_mut().resource_mut::<JoystickInput>();
            joystick.anchor = Some(Vec2::new(300.0, 200.0));
            joystick.vector = Vec2::new(1.0, 0.0);
        }
        app.update();

        let world = app.world_mut();
        let (base, visibility) = world
            .query_filtered::<(&Node, &Visibility), With<JoystickBase>>()
            .single(world)
            .unwrap();
        assert_eq!(*visibility, Visibility::Inherited);
        assert_eq!(base.left, Val::Px(240.0));
        assert_eq!(base.top, Val::Px(140.0));
        let thumb = world
            .query_filtered::<&Node, With<JoystickThumb>>()
            .single(world)
            .unwrap();
        assert_eq!(thumb.left, Val::Px(66.0));
        assert_eq!(thumb.top, Val::Px(33.0));

        app.world_mut().resource_mut::<JoystickInput>().anchor = None;
        app.update();

        let world = app.world_mut();
        let visibility = world
            .query_filtered::<&Visibility, With<JoystickBase>>()
            .single(world)
            .unwrap();
        assert_eq!(*visibility, Visibility::Hidden);
        let thumb = world
            .query_filtered::<&Node, With<JoystickThumb>>()
            .single(world)
            .unwrap();
        assert_eq!(thumb.left, Val::Px(33.0));
    }
}
