// sim/mod.rs - The gameplay simulation, independent of rendering and audio.
//
// Everything in here is plain data plus functions. Bevy systems feed it a
// FrameInput each frame and turn the FrameReport back into sounds, HUD text
// and transforms. Keeping it free of ECS queries is what lets the tests drive
// whole runs with a seeded RNG and a fake clock.

mod axe;
mod base;
mod camera;
mod forest;
mod frame;
mod player;
mod proximity;
mod state;

pub use axe::{AXE_BLADE_OFFSET, AXE_PIVOT_OFFSET, AxeCycle};
pub use base::BaseZone;
pub use camera::CameraRig;
pub use forest::{DespawnTiming, Forest, PlacementBand, Tree, TreeId, TreePhase, TreePose};
pub use frame::{AssetReadiness, FrameEffect, FrameInput, FrameReport, HudSnapshot, Simulation};
pub use player::{PlayerBody, normalize_angle};
pub use proximity::{distance_xz, within_radius};
pub use state::{GameState, GameStatus};
