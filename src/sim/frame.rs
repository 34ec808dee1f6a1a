// frame.rs - The per-frame step that ties the simulation together.
//
// Order matters: every stage reads what the stages before it wrote this frame.
//
//   clamp delta -> press / start -> plant forest (once the prefab is ready)
//   -> move player -> spin axe -> chop -> despawn animations
//   -> base cooldown + sell -> clock -> win/lose -> one-shot result
//   -> camera -> HUD snapshot
//
// Nothing here talks to Bevy directly. The report that comes out is turned
// into sounds, transforms and UI by the game_loop module.

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use super::axe::AxeCycle;
use super::base::BaseZone;
use super::camera::CameraRig;
use super::forest::{DespawnTiming, Forest, PlacementBand, TreeId};
use super::player::PlayerBody;
use super::state::{GameState, GameStatus};
use crate::config::GameConfig;

/// Which external assets have finished loading. The simulation never waits
/// on these; it just skips whatever depends on a missing one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetReadiness {
    pub tree_prefab: bool,
    pub axe_model: bool,
}

/// Everything the outside world hands the simulation for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub delta_secs: f32,
    /// Joystick vector, roughly unit length at most. +y is screen-down.
    pub joystick: Vec2,
    /// True on the frame the joystick was pressed.
    pub pressed: bool,
    pub readiness: AssetReadiness,
}

/// Side effects the presentation layer should carry out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameEffect {
    UnlockAudio,
    PlayChop,
    PlayConvert,
    PlayWin,
    PlayLose,
    PauseTheme,
    ShowResult(GameStatus),
}

/// Numbers for the HUD.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudSnapshot {
    pub wood_count: u32,
    pub money: f32,
    pub time_left: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub effects: Vec<FrameEffect>,
    pub hud: HudSnapshot,
    pub spawned_trees: Vec<TreeId>,
    pub chopped_tree: Option<TreeId>,
    pub removed_trees: Vec<TreeId>,
}

/// One run of the game. Owns all mutable gameplay state.
#[derive(Resource)]
pub struct Simulation {
    config: GameConfig,
    pub state: GameState,
    pub forest: Forest,
    pub player: PlayerBody,
    pub axe: AxeCycle,
    pub base: BaseZone,
    pub camera: CameraRig,
    forest_planted: bool,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic run, for tests and replays.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Simulation {
            state: GameState::new(config.game_time),
            forest: Forest::new(),
            player: PlayerBody::default(),
            axe: AxeCycle::new(config.axe_rotation_duration_ms),
            base: BaseZone::new(config.base_radius),
            camera: CameraRig::default(),
            forest_planted: false,
            rng,
            config,
        }
    }

    pub fn despawn_timing(&self) -> DespawnTiming {
        DespawnTiming {
            fall_secs: self.config.tree_fall_duration_ms / 1000.0,
            shrink_secs: self.config.tree_shrink_duration_ms / 1000.0,
            max_tilt: self.config.tree_max_tilt,
        }
    }

    fn placement_band(&self) -> PlacementBand {
        PlacementBand {
            min_radius: self.config.forest_min_radius,
            max_radius: self.config.forest_max_radius(),
            min_spacing: self.config.tree_min_distance,
            attempts: self.config.max_tree_spawn_attempts,
        }
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            wood_count: self.state.wood_count,
            money: self.state.money,
            time_left: self.state.time_left,
        }
    }

    /// Runs one frame.
    pub fn step(&mut self, input: &FrameInput) -> FrameReport {
        let mut report = FrameReport::default();
        let delta = input.delta_secs.max(0.0).min(self.config.max_frame_delta);

        if input.pressed {
            if !self.state.started {
                info!("Run started");
            }
            self.state.started = true;
            report.effects.push(FrameEffect::UnlockAudio);
        }

        if !self.forest_planted && input.readiness.tree_prefab {
            let band = self.placement_band();
            let requested = self.config.initial_tree_count as usize;
            report.spawned_trees = self.forest.populate(&mut self.rng, requested, &band);
            self.forest_planted = true;
            info!("Planted {} of {} trees", report.spawned_trees.len(), requested);
        }

        let playing = self.state.is_playing();

        if playing {
            self.player.update(
                delta,
                input.joystick,
                self.config.move_speed,
                self.config.player_turn_lerp_alpha,
                self.config.input_deadzone,
                self.config.world_limit,
            );
        }

        self.axe.tick(delta);

        if playing {
            if let Some(hit_point) = self.axe.hit_point(self.player.position, input.readiness.axe_model) {
                let timing = self.despawn_timing();
                report.chopped_tree = self.forest.try_chop_at(
                    hit_point,
                    self.config.chop_hit_radius,
                    timing.max_tilt,
                    &mut self.rng,
                );
                if let Some(id) = report.chopped_tree {
                    self.state.wood_count += 1;
                    report.effects.push(FrameEffect::PlayChop);
                    debug!("Chopped {:?}, carrying {} wood", id, self.state.wood_count);
                }
            }
        }

        let timing = self.despawn_timing();
        report.removed_trees = self.forest.advance(delta, &timing);

        self.state.tick_cooldown(delta);
        let price = self.config.convert_price_min..self.config.convert_price_max;
        if let Some(paid) = self.base.try_convert(
            self.player.position,
            &mut self.state,
            price,
            self.config.base_convert_interval,
            &mut self.rng,
        ) {
            report.effects.push(FrameEffect::PlayConvert);
            debug!("Sold a log for {:.2}, money {:.2}", paid, self.state.money);
        }

        self.state.tick_clock(delta);
        self.state.evaluate(self.config.money_goal);

        if let Some(result) = self.state.take_unhandled_result() {
            info!(
                "Run over: {:?} with {:.0} money and {:.1}s left",
                result, self.state.money, self.state.time_left
            );
            report.effects.push(FrameEffect::PauseTheme);
            report.effects.push(match result {
                GameStatus::Won => FrameEffect::PlayWin,
                _ => FrameEffect::PlayLose,
            });
            report.effects.push(FrameEffect::ShowResult(result));
        }

        self.camera.follow(
            self.player.position,
            self.config.camera_follow_height,
            self.config.camera_follow_z_offset,
            self.config.camera_look_y_offset,
            self.config.camera_lerp_alpha,
        );

        report.hud = self.hud_snapshot();
        report
    }
}
