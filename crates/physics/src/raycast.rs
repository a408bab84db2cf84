//! Raycasting for hitscan weapons.

use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Tag the hitbox was registered with.
    pub tag: u64,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray and return the first hitbox it enters.
    ///
    /// Call [`PhysicsWorld::update_query_pipeline`] after moving hitboxes and
    /// before casting.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let filter = QueryFilter::default();

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .and_then(|(collider, toi)| {
                let tag = self.collider_set.get(collider)?.user_data as u64;
                let point = ray.point_at(toi);
                Some(RaycastHit {
                    collider,
                    tag,
                    distance: toi,
                    point: Vec3::new(point.x, point.y, point.z),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_returns_nearest_hitbox() {
        let mut world = PhysicsWorld::new();
        world.add_hitbox(Vec3::new(0.0, 0.0, -20.0), 1.0, 2);
        world.add_hitbox(Vec3::new(0.0, 0.0, -10.0), 1.0, 1);
        world.update_query_pipeline();

        let hit = world.raycast(Vec3::ZERO, -Vec3::Z, 100.0).expect("ray should hit");
        assert_eq!(hit.tag, 1, "nearer hitbox must win");
        assert!((hit.distance - 9.0).abs() < 1e-3);
    }

    #[test]
    fn ray_misses_when_out_of_range() {
        let mut world = PhysicsWorld::new();
        world.add_hitbox(Vec3::new(0.0, 0.0, -50.0), 1.0, 1);
        world.update_query_pipeline();
        assert!(world.raycast(Vec3::ZERO, -Vec3::Z, 10.0).is_none());
        assert!(world.raycast(Vec3::ZERO, Vec3::X, 100.0).is_none());
    }

    #[test]
    fn removed_hitbox_is_not_hit() {
        let mut world = PhysicsWorld::new();
        let h = world.add_hitbox(Vec3::new(0.0, 0.0, -5.0), 1.0, 1);
        world.remove_hitbox(h);
        world.update_query_pipeline();
        assert!(world.raycast(Vec3::ZERO, -Vec3::Z, 100.0).is_none());
    }
}
