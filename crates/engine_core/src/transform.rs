//! Transform component and utilities for spatial positioning.

use glam::{Quat, Vec3};

/// Position and orientation of something in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform at `position` rotated `yaw` radians about +Y.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate around the Y axis (yaw).
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_y(angle) * self.rotation;
    }

    /// Turn to face `target` about the Y axis only, so walkers stay upright
    /// regardless of the target's height.
    pub fn look_at_flat(&mut self, target: Vec3) {
        let dx = target.x - self.position.x;
        let dz = target.z - self.position.z;
        if dx * dx + dz * dz > 0.0001 {
            self.rotation = Quat::from_rotation_y(yaw_towards(dx, dz));
        }
    }

    /// Horizontal distance to `other`, ignoring height.
    pub fn flat_distance(&self, other: Vec3) -> f32 {
        let d = other - self.position;
        (d.x * d.x + d.z * d.z).sqrt()
    }
}

/// Yaw angle whose forward (-Z) vector points along `(dx, dz)`.
pub fn yaw_towards(dx: f32, dz: f32) -> f32 {
    (-dx).atan2(-dz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_flat_faces_target_and_stays_level() {
        let mut t = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        t.look_at_flat(Vec3::new(10.0, 50.0, 0.0));
        let f = t.forward();
        assert!((f.x - 1.0).abs() < 1e-5, "forward should point +X, got {f:?}");
        assert!(f.y.abs() < 1e-5, "Y-locked look-at must not pitch");
    }

    #[test]
    fn look_at_flat_ignores_coincident_target() {
        let mut t = Transform::from_position_yaw(Vec3::ZERO, 1.0);
        let before = t.rotation;
        t.look_at_flat(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(t.rotation, before);
    }

    #[test]
    fn flat_distance_ignores_height() {
        let t = Transform::from_position(Vec3::new(0.0, 0.0, 0.0));
        assert!((t.flat_distance(Vec3::new(3.0, 100.0, 4.0)) - 5.0).abs() < 1e-5);
    }
}
