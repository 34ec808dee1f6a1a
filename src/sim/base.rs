use std::ops::Range;

use bevy::prelude::*;
use rand::Rng;

use super::proximity::within_radius;
use super::state::GameState;

/// The money pad at the middle of the map. Wood dropped here is sold.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseZone {
    pub center: Vec3,
    pub radius: f32,
}

impl BaseZone {
    pub fn new(radius: f32) -> Self {
        BaseZone {
            center: Vec3::ZERO,
            radius,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        within_radius(self.center, self.radius, point)
    }

    /// Sells one log if the player is standing on the pad and the cooldown is
    /// over. Returns the price paid.
    pub fn try_convert<R: Rng>(
        &self,
        player_position: Vec3,
        state: &mut GameState,
        price: Range<f32>,
        interval: f32,
        rng: &mut R,
    ) -> Option<f32> {
        if !state.is_playing()
            || !self.contains(player_position)
            || state.wood_count == 0
            || state.base_convert_timer > 0.0
        {
            return None;
        }

        let amount = if price.end > price.start {
            rng.gen_range(price)
        } else {
            price.start
        };

        state.wood_count -= 1;
        state.money += amount;
        state.base_convert_timer = interval;
        Some(amount)
    }
}
