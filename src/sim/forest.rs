// forest.rs - Tree registry: placement, chopping, and the fall/shrink despawn.
//
// A chopped tree does not disappear at once. It tips over in a random
// direction, then shrinks to nothing, and only then leaves the registry.
// The two stages run strictly one after the other, driven by elapsed time
// rather than by tween callbacks, so tests can step them with any delta.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use super::proximity::distance_xz;

/// Scale a tree shrinks to before it is removed.
pub const SHRUNK_SCALE: f32 = 0.01;

/// Stable handle for a tree. Survives other trees being removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TreeId(pub u32);

/// Lifecycle of a tree. Standing is the only phase where it can be chopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TreePhase {
    Standing,
    Falling { elapsed: f32, tilt: Vec2 },
    Shrinking { elapsed: f32, tilt: Vec2 },
    Removed,
}

/// What the renderer needs to draw a tree mid-despawn.
/// `tilt_x` / `tilt_z` are extra rotations around those axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreePose {
    pub tilt_x: f32,
    pub tilt_z: f32,
    pub scale: f32,
}

impl Default for TreePose {
    fn default() -> Self {
        TreePose {
            tilt_x: 0.0,
            tilt_z: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    pub id: TreeId,
    /// Ground position; y is always 0.
    pub position: Vec3,
    pub facing_angle: f32,
    pub alive: bool,
    pub phase: TreePhase,
}

/// Timings and tilt for the despawn animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DespawnTiming {
    pub fall_secs: f32,
    pub shrink_secs: f32,
    pub max_tilt: f32,
}

impl Tree {
    pub fn pose(&self, timing: &DespawnTiming) -> TreePose {
        match self.phase {
            TreePhase::Standing => TreePose::default(),
            TreePhase::Falling { elapsed, tilt } => {
                let t = ease_out(elapsed, timing.fall_secs);
                TreePose {
                    tilt_x: tilt.x * t,
                    tilt_z: tilt.y * t,
                    scale: 1.0,
                }
            }
            TreePhase::Shrinking { elapsed, tilt } => {
                let t = ease_out(elapsed, timing.shrink_secs);
                TreePose {
                    tilt_x: tilt.x,
                    tilt_z: tilt.y,
                    scale: 1.0 + (SHRUNK_SCALE - 1.0) * t,
                }
            }
            TreePhase::Removed => TreePose {
                tilt_x: 0.0,
                tilt_z: 0.0,
                scale: SHRUNK_SCALE,
            },
        }
    }
}

fn ease_out(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    EaseFunction::QuadraticOut.sample_clamped(elapsed / duration)
}

/// Where new trees may go: a ring around the base, inside the world square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementBand {
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_spacing: f32,
    pub attempts: u32,
}

#[derive(Clone, Debug, Default)]
pub struct Forest {
    trees: Vec<Tree>,
    next_id: u32,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn get(&self, id: TreeId) -> Option<&Tree> {
        self.trees.iter().find(|tree| tree.id == id)
    }

    pub fn alive_count(&self) -> usize {
        self.trees.iter().filter(|tree| tree.alive).count()
    }

    fn can_place(&self, position: Vec3, min_spacing: f32) -> bool {
        self.trees
            .iter()
            .all(|tree| distance_xz(tree.position, position) >= min_spacing)
    }

    /// Tries to plant `count` trees. A tree that finds no free spot within
    /// `band.attempts` samples is skipped, so fewer may come back.
    pub fn populate<R: Rng>(&mut self, rng: &mut R, count: usize, band: &PlacementBand) -> Vec<TreeId> {
        let mut placed = Vec::new();

        for _ in 0..count {
            for _ in 0..band.attempts {
                let angle = rng.gen_range(0.0..TAU);
                let radius = if band.max_radius > band.min_radius {
                    rng.gen_range(band.min_radius..band.max_radius)
                } else {
                    band.min_radius
                };
                let position = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

                if !self.can_place(position, band.min_spacing) {
                    continue;
                }

                let id = TreeId(self.next_id);
                self.next_id += 1;
                self.trees.push(Tree {
                    id,
                    position,
                    facing_angle: rng.gen_range(0.0..TAU),
                    alive: true,
                    phase: TreePhase::Standing,
                });
                placed.push(id);
                break;
            }
        }

        placed
    }

    /// Chops the first standing tree within `hit_radius` of `point`, in
    /// planting order. At most one tree per call.
    pub fn try_chop_at<R: Rng>(
        &mut self,
        point: Vec3,
        hit_radius: f32,
        max_tilt: f32,
        rng: &mut R,
    ) -> Option<TreeId> {
        let tree = self
            .trees
            .iter_mut()
            .filter(|tree| tree.alive)
            .find(|tree| distance_xz(point, tree.position) <= hit_radius)?;

        let tilt = Vec2::new(
            rng.gen_range(-1.0..1.0) * max_tilt,
            rng.gen_range(-1.0..1.0) * max_tilt,
        );
        tree.alive = false;
        tree.phase = TreePhase::Falling { elapsed: 0.0, tilt };
        Some(tree.id)
    }

    /// Steps every despawn animation. Returns the trees that finished
    /// shrinking this call; they are no longer in the registry.
    pub fn advance(&mut self, delta: f32, timing: &DespawnTiming) -> Vec<TreeId> {
        for tree in &mut self.trees {
            tree.phase = advance_phase(tree.phase, delta, timing);
        }

        let removed: Vec<TreeId> = self
            .trees
            .iter()
            .filter(|tree| tree.phase == TreePhase::Removed)
            .map(|tree| tree.id)
            .collect();
        self.trees.retain(|tree| tree.phase != TreePhase::Removed);
        removed
    }
}

/// Overflow from the fall carries into the shrink, so a single large step
/// can move a tree through both stages.
fn advance_phase(phase: TreePhase, delta: f32, timing: &DespawnTiming) -> TreePhase {
    match phase {
        TreePhase::Falling { elapsed, tilt } => {
            let elapsed = elapsed + delta;
            if elapsed >= timing.fall_secs {
                let overflow = elapsed - timing.fall_secs;
                advance_phase(TreePhase::Shrinking { elapsed: 0.0, tilt }, overflow, timing)
            } else {
                TreePhase::Falling { elapsed, tilt }
            }
        }
        TreePhase::Shrinking { elapsed, tilt } => {
            let elapsed = elapsed + delta;
            if elapsed >= timing.shrink_secs {
                TreePhase::Removed
            } else {
                TreePhase::Shrinking { elapsed, tilt }
            }
        }
        other => other,
    }
}
