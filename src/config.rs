use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_config);
    }
}

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "lumberjack.ron";

/// Tuning for one run. Read once at startup and never changed afterwards.
///
/// Every field has #[serde(default)] via the container attribute, so a config
/// file only needs the values it wants to override:
///
/// ```ron
/// (money_goal: 200.0, game_time: 30.0)
/// ```
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub move_speed: f32,
    pub world_limit: f32,
    pub tree_min_distance: f32,
    pub chop_hit_radius: f32,
    pub base_radius: f32,
    pub base_convert_interval: f32,
    pub convert_price_min: f32,
    pub convert_price_max: f32,
    pub game_time: f32,
    pub money_goal: f32,

    pub initial_tree_count: u32,
    pub max_tree_spawn_attempts: u32,
    pub forest_min_radius: f32,

    pub camera_follow_height: f32,
    pub camera_follow_z_offset: f32,
    pub camera_look_y_offset: f32,
    pub camera_lerp_alpha: f32,
    pub player_turn_lerp_alpha: f32,

    pub axe_rotation_duration_ms: f32,
    pub tree_fall_duration_ms: f32,
    pub tree_shrink_duration_ms: f32,
    pub tree_max_tilt: f32,

    /// Longest frame the simulation will integrate, in seconds.
    pub max_frame_delta: f32,
    pub input_deadzone: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.5,
            world_limit: 18.0,
            tree_min_distance: 3.5,
            chop_hit_radius: 1.2,
            base_radius: 1.4,
            base_convert_interval: 0.4,
            convert_price_min: 10.0,
            convert_price_max: 20.0,
            game_time: 19.0,
            money_goal: 111.0,

            initial_tree_count: 80,
            max_tree_spawn_attempts: 5,
            forest_min_radius: 5.0,

            camera_follow_height: 10.0,
            camera_follow_z_offset: 9.0,
            camera_look_y_offset: 1.8,
            camera_lerp_alpha: 0.08,
            player_turn_lerp_alpha: 0.2,

            axe_rotation_duration_ms: 1100.0,
            tree_fall_duration_ms: 140.0,
            tree_shrink_duration_ms: 180.0,
            tree_max_tilt: 0.45,

            max_frame_delta: 0.033,
            input_deadzone: 0.01,
        }
    }
}

impl GameConfig {
    /// Outer edge of the ring trees are planted in.
    pub fn forest_max_radius(&self) -> f32 {
        self.world_limit - 1.0
    }

    /// Repairs values the simulation can't run with. Each repair is logged
    /// and falls back to the default for that field.
    pub fn sanitized(mut self) -> Self {
        let defaults = GameConfig::default();

        fn repair(name: &str, value: &mut f32, fallback: f32, ok: impl Fn(f32) -> bool) {
            if !value.is_finite() || !ok(*value) {
                warn!("Config value {} = {} is invalid. Using {}.", name, value, fallback);
                *value = fallback;
            }
        }

        repair("move_speed", &mut self.move_speed, defaults.move_speed, |v| v >= 0.0);
        repair("world_limit", &mut self.world_limit, defaults.world_limit, |v| v > 1.0);
        repair("tree_min_distance", &mut self.tree_min_distance, defaults.tree_min_distance, |v| v >= 0.0);
        repair("chop_hit_radius", &mut self.chop_hit_radius, defaults.chop_hit_radius, |v| v >= 0.0);
        repair("base_radius", &mut self.base_radius, defaults.base_radius, |v| v >= 0.0);
        repair("base_convert_interval", &mut self.base_convert_interval, defaults.base_convert_interval, |v| v > 0.0);
        repair("convert_price_min", &mut self.convert_price_min, defaults.convert_price_min, |v| v >= 0.0);
        repair("game_time", &mut self.game_time, defaults.game_time, |v| v >= 0.0);
        repair("money_goal", &mut self.money_goal, defaults.money_goal, |v| v >= 0.0);
        repair("forest_min_radius", &mut self.forest_min_radius, defaults.forest_min_radius, |v| v >= 0.0);
        repair("camera_lerp_alpha", &mut self.camera_lerp_alpha, defaults.camera_lerp_alpha, |v| (0.0..=1.0).contains(&v));
        repair("player_turn_lerp_alpha", &mut self.player_turn_lerp_alpha, defaults.player_turn_lerp_alpha, |v| (0.0..=1.0).contains(&v));
        repair("axe_rotation_duration_ms", &mut self.axe_rotation_duration_ms, defaults.axe_rotation_duration_ms, |v| v > 0.0);
        repair("tree_fall_duration_ms", &mut self.tree_fall_duration_ms, defaults.tree_fall_duration_ms, |v| v >= 0.0);
        repair("tree_shrink_duration_ms", &mut self.tree_shrink_duration_ms, defaults.tree_shrink_duration_ms, |v| v >= 0.0);
        repair("tree_max_tilt", &mut self.tree_max_tilt, defaults.tree_max_tilt, |v| v >= 0.0);
        repair("max_frame_delta", &mut self.max_frame_delta, defaults.max_frame_delta, |v| v > 0.0);
        repair("input_deadzone", &mut self.input_deadzone, defaults.input_deadzone, |v| v >= 0.0);

        // Ranges are checked after their endpoints are known to be sane.
        let price_min = self.convert_price_min;
        repair("convert_price_max", &mut self.convert_price_max, price_min.max(defaults.convert_price_max), |v| v >= price_min);

        let max_radius = self.forest_max_radius();
        if self.forest_min_radius > max_radius {
            warn!(
                "forest_min_radius {} is outside world_limit - 1 = {}. Clamping.",
                self.forest_min_radius, max_radius
            );
            self.forest_min_radius = max_radius;
        }

        if self.max_tree_spawn_attempts == 0 {
            warn!("max_tree_spawn_attempts is 0. Using {}.", defaults.max_tree_spawn_attempts);
            self.max_tree_spawn_attempts = defaults.max_tree_spawn_attempts;
        }

        self
    }

    pub fn from_ron(contents: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str::<GameConfig>(contents).map(GameConfig::sanitized)
    }
}

// =============================================================================
// Storage backend: Native (macOS, Linux, Windows)
//
// The working directory wins so a config can sit next to the binary while
// developing. Otherwise fall back to the per-user config dir from `dirs`.
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod storage {
    use super::{CONFIG_FILE_NAME, GameConfig};
    use bevy::prelude::*;
    use std::path::PathBuf;

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("lumberjack-rush").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Reads the first config file that exists, or None if there isn't one
    /// or it can't be used.
    pub fn load() -> Option<GameConfig> {
        let Some(path) = candidate_paths().into_iter().find(|path| path.exists()) else {
            info!("No {} found. Using default tuning.", CONFIG_FILE_NAME);
            return None;
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match GameConfig::from_ron(&contents) {
                Ok(config) => {
                    info!("Loaded config from {:?}: {:?}", path, config);
                    Some(config)
                }
                Err(e) => {
                    error!("Failed to parse {:?}: {}. Using defaults.", path, e);
                    None
                }
            },
            Err(e) => {
                error!("Failed to read {:?}: {}. Using defaults.", path, e);
                None
            }
        }
    }
}

// =============================================================================
// Storage backend: WASM (browser)
//
// There is no filesystem to read from, so the browser build always plays
// with the built-in tuning.
// =============================================================================

#[cfg(target_arch = "wasm32")]
mod storage {
    use super::GameConfig;
    use bevy::prelude::*;

    pub fn load() -> Option<GameConfig> {
        warn!("Config files are not read on the web. Using default tuning.");
        None
    }
}

/// PreStartup system: everything that spawns in Startup can read Res<GameConfig>.
fn load_config(mut commands: Commands) {
    let config = storage::load().unwrap_or_default();
    commands.insert_resource(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = GameConfig::from_ron("(money_goal: 200.0, game_time: 30.0)").unwrap();
        assert_eq!(config.money_goal, 200.0);
        assert_eq!(config.game_time, 30.0);
        assert_eq!(config.move_speed, 4.5);
        assert_eq!(config.initial_tree_count, 80);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(GameConfig::from_ron("()").unwrap(), GameConfig::default());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(GameConfig::from_ron("money_goal = 5").is_err());
    }

    #[test]
    fn sanitize_repairs_broken_values() {
        let config = GameConfig {
            base_convert_interval: 0.0,
            convert_price_min: 30.0,
            convert_price_max: 5.0,
            forest_min_radius: 50.0,
            max_frame_delta: f32::NAN,
            max_tree_spawn_attempts: 0,
            ..GameConfig::default()
        }
        .sanitized();

        assert_eq!(config.base_convert_interval, 0.4);
        assert!(config.convert_price_max >= config.convert_price_min);
        assert_eq!(config.forest_min_radius, 17.0);
        assert_eq!(config.max_frame_delta, 0.033);
        assert_eq!(config.max_tree_spawn_attempts, 5);
    }

    #[test]
    fn sane_config_is_untouched() {
        assert_eq!(GameConfig::default().sanitized(), GameConfig::default());
    }
}
