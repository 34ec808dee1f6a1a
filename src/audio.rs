use bevy::{
    audio::{AudioSinkPlayback, Volume},
    prelude::*,
    window::PrimaryWindow,
};

use crate::{
    components::{SoundCue, SoundCueEvent, ThemeCommand, ThemeEvent},
    game_loop::FrameSet,
    sim::Simulation,
};

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ThemeGate>()
            .add_systems(Startup, setup_audio)
            .add_systems(
                Update,
                (start_theme_when_loaded, retry_theme_on_focus).in_set(FrameSet::Present),
            )
            .add_observer(on_sound_cue)
            .add_observer(on_theme_event);
    }
}

#[derive(Resource)]
pub struct GameAudio {
    /// Handle<T> is Bevy's way of referencing assets.
    pub chop: Handle<AudioSource>,
    pub convert: Handle<AudioSource>,
    pub win: Handle<AudioSource>,
    pub lose: Handle<AudioSource>,
}

/// The looping background track. Spawned paused.
#[derive(Component)]
pub struct ThemeMusic;

/// Browsers refuse to start audio before the user interacts with the page,
/// so the theme stays silent until the first joystick press unlocks it.
/// Once the run ends it is shut for good.
#[derive(Resource, Default, Debug)]
pub struct ThemeGate {
    pub unlocked: bool,
    pub finished: bool,
}

impl ThemeGate {
    pub fn allows_play(&self) -> bool {
        self.unlocked && !self.finished
    }
}

pub fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    // The actual loading happens in the background - asset_server.load()
    // returns immediately with a Handle that will be valid once loading completes.
    commands.insert_resource(GameAudio {
        chop: asset_server.load("sounds/tree-cutting-sound.wav"),
        convert: asset_server.load("sounds/convert-sound.mp3"),
        win: asset_server.load("sounds/game-win.wav"),
        lose: asset_server.load("sounds/game-lost.wav"),
    });

    commands.spawn((
        ThemeMusic,
        AudioPlayer::new(asset_server.load("sounds/music.mp3")),
        PlaybackSettings::LOOP
            .with_volume(Volume::Linear(0.3))
            .paused(),
    ));
}

/// Each cue spawns its own short-lived player, so overlapping chops don't
/// cut each other off.
pub fn on_sound_cue(trigger: On<SoundCueEvent>, mut commands: Commands, audio: Res<GameAudio>) {
    let (handle, volume) = match trigger.cue {
        SoundCue::Chop => (audio.chop.clone(), 0.4),
        SoundCue::Convert => (audio.convert.clone(), 0.3),
        SoundCue::Win => (audio.win.clone(), 1.0),
        SoundCue::Lose => (audio.lose.clone(), 1.0),
    };

    commands.spawn((
        AudioPlayer::new(handle),
        PlaybackSettings::DESPAWN.with_volume(Volume::Linear(volume)),
    ));
}

/// A theme sink that doesn't exist yet (still decoding) is skipped. The
/// retry systems below pick it up later.
pub fn on_theme_event(
    trigger: On<ThemeEvent>,
    mut gate: ResMut<ThemeGate>,
    sim: Option<Res<Simulation>>,
    sinks: Query<&AudioSink, With<ThemeMusic>>,
) {
    match trigger.command {
        ThemeCommand::Unlock => {
            if !gate.unlocked {
                debug!("Audio unlocked");
            }
            gate.unlocked = true;
        }
        ThemeCommand::Pause => gate.finished = true,
        ThemeCommand::TryPlay => {}
    }

    if sim.is_some_and(|sim| !sim.state.is_playing()) {
        gate.finished = true;
    }

    let Ok(sink) = sinks.single() else {
        return;
    };
    if gate.allows_play() {
        if sink.is_paused() {
            sink.play();
        }
    } else {
        sink.pause();
    }
}

fn start_theme_when_loaded(
    gate: Res<ThemeGate>,
    added: Query<&AudioSink, (With<ThemeMusic>, Added<AudioSink>)>,
) {
    for sink in &added {
        if gate.allows_play() {
            sink.play();
        }
    }
}

/// Coming back to the tab or window restarts the theme if it should be on.
fn retry_theme_on_focus(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut was_focused: Local<bool>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    if window.focused && !*was_focused {
        commands.trigger(ThemeEvent {
            command: ThemeCommand::TryPlay,
        });
    }
    *was_focused = window.focused;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_needs_unlock_and_a_live_run() {
        let mut gate = ThemeGate::default();
        assert!(!gate.allows_play());

        gate.unlocked = true;
        assert!(gate.allows_play());

        gate.finished = true;
        assert!(!gate.allows_play());
    }
}
