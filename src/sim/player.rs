use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

/// Wraps an angle into (-PI, PI].
pub fn normalize_angle(angle: f32) -> f32 {
    let mut next = angle;
    while next > PI {
        next -= TAU;
    }
    while next <= -PI {
        next += TAU;
    }
    next
}

/// The lumberjack. Lives on the ground plane, y stays 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerBody {
    pub position: Vec3,
    pub facing_yaw: f32,
}

impl PlayerBody {
    /// Moves by the joystick vector and turns toward it.
    ///
    /// `input.y` is screen-down, which maps to +z. The turn uses a fixed
    /// fraction per call, so it is faster at higher frame rates.
    pub fn update(
        &mut self,
        delta: f32,
        input: Vec2,
        move_speed: f32,
        turn_alpha: f32,
        deadzone: f32,
        world_limit: f32,
    ) {
        self.position.x += input.x * move_speed * delta;
        self.position.z += input.y * move_speed * delta;

        if input.x.abs() > deadzone || input.y.abs() > deadzone {
            let target_yaw = input.x.atan2(input.y) + PI;
            let delta_yaw = normalize_angle(target_yaw - self.facing_yaw);
            self.facing_yaw += delta_yaw * turn_alpha;
        }

        self.position.x = self.position.x.clamp(-world_limit, world_limit);
        self.position.z = self.position.z.clamp(-world_limit, world_limit);
    }
}
