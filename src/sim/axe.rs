// axe.rs - The axe spins around the lumberjack forever.
//
// The pivot sits one unit above the player's feet and the blade is mounted
// half a unit up and half a unit out from the pivot. Where the blade is in
// world space is the chop hit point.

use std::f32::consts::TAU;

use bevy::prelude::*;

/// Pivot offset from the player root.
pub const AXE_PIVOT_OFFSET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Blade offset from the pivot, before the pivot's yaw is applied.
pub const AXE_BLADE_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.5);

#[derive(Clone, Debug, PartialEq)]
pub struct AxeCycle {
    period_secs: f32,
    elapsed: f32,
}

impl AxeCycle {
    pub fn new(period_ms: f32) -> Self {
        AxeCycle {
            period_secs: (period_ms / 1000.0).max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Advances the phase, wrapping at the end of each period.
    pub fn tick(&mut self, delta: f32) {
        self.elapsed = (self.elapsed + delta).rem_euclid(self.period_secs);
    }

    /// Pivot yaw in [-2PI, 0]. Starts at 0 and falls linearly.
    pub fn angle(&self) -> f32 {
        -TAU * (self.elapsed / self.period_secs)
    }

    /// World position of the blade, or None while the axe model has not
    /// finished loading.
    pub fn hit_point(&self, player_position: Vec3, model_ready: bool) -> Option<Vec3> {
        if !model_ready {
            return None;
        }
        let blade = Quat::from_rotation_y(self.angle()) * AXE_BLADE_OFFSET;
        Some(player_position + AXE_PIVOT_OFFSET + blade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_runs_down_and_wraps() {
        let mut axe = AxeCycle::new(1100.0);
        assert_eq!(axe.angle(), 0.0);

        axe.tick(0.55);
        assert!((axe.angle() + TAU / 2.0).abs() < 1e-4);

        axe.tick(0.55);
        assert!(axe.angle().abs() < 1e-4 || (axe.angle() + TAU).abs() < 1e-4);

        axe.tick(0.275);
        assert!((axe.angle() + TAU / 4.0).abs() < 1e-3);
    }

    #[test]
    fn angle_stays_bounded_over_long_runs() {
        let mut axe = AxeCycle::new(1100.0);
        for _ in 0..10_000 {
            axe.tick(0.033);
            let angle = axe.angle();
            assert!((-TAU..=0.0).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn no_hit_point_until_model_loads() {
        let axe = AxeCycle::new(1100.0);
        assert_eq!(axe.hit_point(Vec3::ZERO, false), None);
    }

    #[test]
    fn hit_point_orbits_the_player() {
        let mut axe = AxeCycle::new(1000.0);
        let player = Vec3::new(2.0, 0.0, -3.0);

        let start = axe.hit_point(player, true).unwrap();
        assert!((start - Vec3::new(2.0, 1.5, -2.5)).length() < 1e-5);

        // A quarter turn later the blade has swung to the other side of the pivot.
        axe.tick(0.25);
        let quarter = axe.hit_point(player, true).unwrap();
        assert!((quarter.y - 1.5).abs() < 1e-5);
        let reach = Vec2::new(quarter.x - player.x, quarter.z - player.z).length();
        assert!((reach - 0.5).abs() < 1e-4);
        assert!((quarter.x - 1.5).abs() < 1e-4);
    }
}
