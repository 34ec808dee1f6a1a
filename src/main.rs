use bevy::{log::LogPlugin, prelude::*};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Lumberjack Rush".into(),
                        // Fill the browser canvas on wasm. No effect on desktop.
                        fit_canvas_to_parent: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: "wgpu=error,naga=warn,lumberjack_rush=debug".into(),
                    ..default()
                }),
        )
        // Config goes first: every other plugin reads GameConfig at startup.
        .add_plugins((
            config::ConfigPlugin,
            game_loop::GameLoopPlugin,
            joystick::JoystickPlugin,
            scene::ScenePlugin,
            audio::GameAudioPlugin,
            hud::HudPlugin,
        ))
        .run();
}

mod audio;
mod components;
mod config;
mod game_loop;
mod hud;
mod joystick;
mod scene;
mod sim;
