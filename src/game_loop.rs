use bevy::prelude::*;

use crate::{
    components::{
        ResultEvent, SoundCue, SoundCueEvent, ThemeCommand, ThemeEvent, TreePlantedEvent,
        TreeRemovedEvent,
    },
    config::GameConfig,
    joystick::JoystickInput,
    sim::{AssetReadiness, FrameEffect, FrameInput, HudSnapshot, Simulation},
};

pub struct GameLoopPlugin;

impl Plugin for GameLoopPlugin {
    fn build(&self, app: &mut App) {
        // Input has to be read before the step, and everything that draws
        // the result has to run after it. Chaining the sets guarantees that
        // no matter which plugin a system comes from.
        app.configure_sets(
            Update,
            (FrameSet::Input, FrameSet::Simulate, FrameSet::Present).chain(),
        )
        .init_resource::<AssetReadinessState>()
        .init_resource::<HudState>()
        .add_systems(Startup, start_simulation)
        .add_systems(
            Update,
            run_frame_system
                .in_set(FrameSet::Simulate)
                .run_if(resource_exists::<Simulation>),
        );
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Joystick and asset readiness.
    Input,
    /// The simulation step.
    Simulate,
    /// Transforms, HUD text.
    Present,
}

/// Written by the scene plugin each frame from the asset server.
#[derive(Resource, Default, Debug)]
pub struct AssetReadinessState(pub AssetReadiness);

/// Last snapshot for the HUD to draw.
#[derive(Resource, Default, Debug)]
pub struct HudState(pub HudSnapshot);

fn start_simulation(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(Simulation::new(config.clone()));
}

/// Steps the simulation once and fans its report out to the other plugins.
pub fn run_frame_system(
    mut commands: Commands,
    time: Res<Time>,
    joystick: Res<JoystickInput>,
    readiness: Res<AssetReadinessState>,
    mut sim: ResMut<Simulation>,
    mut hud: ResMut<HudState>,
) {
    let input = FrameInput {
        delta_secs: time.delta_secs(),
        joystick: joystick.vector,
        pressed: joystick.pressed,
        readiness: readiness.0,
    };
    let report = sim.step(&input);

    for id in report.spawned_trees {
        if let Some(tree) = sim.forest.get(id) {
            commands.trigger(TreePlantedEvent {
                id,
                position: tree.position,
                facing_angle: tree.facing_angle,
            });
        }
    }
    for id in report.removed_trees {
        commands.trigger(TreeRemovedEvent { id });
    }

    for effect in report.effects {
        match effect {
            FrameEffect::UnlockAudio => {
                commands.trigger(ThemeEvent {
                    command: ThemeCommand::Unlock,
                });
            }
            FrameEffect::PauseTheme => {
                commands.trigger(ThemeEvent {
                    command: ThemeCommand::Pause,
                });
            }
            FrameEffect::PlayChop => {
                commands.trigger(SoundCueEvent { cue: SoundCue::Chop });
            }
            FrameEffect::PlayConvert => {
                commands.trigger(SoundCueEvent {
                    cue: SoundCue::Convert,
                });
            }
            FrameEffect::PlayWin => {
                commands.trigger(SoundCueEvent { cue: SoundCue::Win });
            }
            FrameEffect::PlayLose => {
                commands.trigger(SoundCueEvent { cue: SoundCue::Lose });
            }
            FrameEffect::ShowResult(status) => {
                commands.trigger(ResultEvent { status });
            }
        }
    }

    hud.0 = report.hud;
}
