use bevy::prelude::*;

/// Distance between two points on the ground plane. Height is ignored.
pub fn distance_xz(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// True when `point` lies inside the circle, edge included.
pub fn within_radius(center: Vec3, radius: f32, point: Vec3) -> bool {
    distance_xz(center, point) <= radius
}
