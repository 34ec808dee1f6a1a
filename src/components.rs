// components.rs - Markers and events shared by the presentation plugins.
//
// The simulation itself lives in `sim` and knows nothing about entities.
// These types are how the Bevy side finds the entities that mirror it and
// how one plugin tells another that something happened this frame.

use bevy::prelude::*;

use crate::sim::{GameStatus, TreeId};

/// The entity the player's position is written to.
#[derive(Component)]
pub struct PlayerRoot;

/// Child of PlayerRoot that carries the facing rotation. The axe pivot is a
/// sibling, so the axe orbit does not turn with the model.
#[derive(Component)]
pub struct PlayerVisual;

/// Child of PlayerRoot spun by the axe cycle.
#[derive(Component)]
pub struct AxePivot;

/// Links a rendered tree back to its simulation entry.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeVisual(pub TreeId);

#[derive(Component)]
pub struct MainCamera;

// =============================================================================
// EVENTS
// =============================================================================
// All of these are triggered by the game loop right after the simulation
// step and handled by observers in the audio, hud and scene plugins.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Chop,
    Convert,
    Win,
    Lose,
}

/// Play a one-shot sound effect.
#[derive(Event)]
pub struct SoundCueEvent {
    pub cue: SoundCue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeCommand {
    /// The player touched the joystick; music is now allowed.
    Unlock,
    /// Start the theme if it is allowed and not already playing.
    TryPlay,
    Pause,
}

#[derive(Event)]
pub struct ThemeEvent {
    pub command: ThemeCommand,
}

/// The run ended. Triggered once per run.
#[derive(Event)]
pub struct ResultEvent {
    pub status: GameStatus,
}

/// A tree was added to the forest and needs a model.
#[derive(Event)]
pub struct TreePlantedEvent {
    pub id: TreeId,
    pub position: Vec3,
    pub facing_angle: f32,
}

/// A chopped tree finished shrinking and its model should go.
#[derive(Event)]
pub struct TreeRemovedEvent {
    pub id: TreeId,
}
