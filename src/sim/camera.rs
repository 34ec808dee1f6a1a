use bevy::prelude::*;

/// Third-person camera that trails behind and above the player.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        CameraRig {
            position: Vec3::new(0.0, 8.0, 10.0),
            look_at: Vec3::ZERO,
        }
    }
}

impl CameraRig {
    /// Eases a fixed fraction of the way toward the follow point each frame.
    pub fn follow(&mut self, player: Vec3, height: f32, z_offset: f32, look_y_offset: f32, alpha: f32) {
        let target = player + Vec3::new(0.0, height, z_offset);
        self.position = self.position.lerp(target, alpha);
        self.look_at = player + Vec3::new(0.0, look_y_offset, 0.0);
    }
}
