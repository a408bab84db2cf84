//! Hitbox world management with Rapier3D.

use engine_core::Vec3;
use rapier3d::prelude::*;

/// Collider storage and query acceleration for creature hitboxes.
///
/// Hitboxes have no rigid body: the game moves creatures itself and copies
/// positions here once per tick, so the set only ever serves queries.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
    /// Set when colliders moved since the last pipeline update.
    dirty: bool,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            dirty: false,
        }
    }

    /// Add a spherical hitbox. `tag` is handed back by ray queries.
    pub fn add_hitbox(&mut self, position: Vec3, radius: f32, tag: u64) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius.max(0.05))
            .translation(vector![position.x, position.y, position.z])
            .user_data(tag as u128)
            .build();
        self.dirty = true;
        self.collider_set.insert(collider)
    }

    /// Move an existing hitbox. Unknown handles are ignored.
    pub fn move_hitbox(&mut self, handle: ColliderHandle, position: Vec3) {
        match self.collider_set.get_mut(handle) {
            Some(collider) => {
                collider.set_translation(vector![position.x, position.y, position.z]);
                self.dirty = true;
            }
            None => log::debug!("move_hitbox: stale collider handle {handle:?}"),
        }
    }

    /// Remove a hitbox. Returns `false` if it was already gone.
    pub fn remove_hitbox(&mut self, handle: ColliderHandle) -> bool {
        let removed = self
            .collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true)
            .is_some();
        self.dirty |= removed;
        removed
    }

    /// Remove every hitbox (level reset).
    pub fn clear(&mut self) {
        let handles: Vec<ColliderHandle> = self.collider_set.iter().map(|(h, _)| h).collect();
        for handle in handles {
            self.remove_hitbox(handle);
        }
    }

    /// Refresh the query pipeline if anything moved.
    pub fn update_query_pipeline(&mut self) {
        if self.dirty {
            self.query_pipeline.update(&self.collider_set);
            self.dirty = false;
        }
    }

    /// Number of live hitboxes.
    pub fn hitbox_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Centre of a hitbox, if it still exists.
    pub fn hitbox_position(&self, handle: ColliderHandle) -> Option<Vec3> {
        self.collider_set.get(handle).map(|c| {
            let t = c.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_hitbox_updates_position() {
        let mut world = PhysicsWorld::new();
        let h = world.add_hitbox(Vec3::ZERO, 1.0, 7);
        world.move_hitbox(h, Vec3::new(3.0, 1.0, -2.0));
        assert_eq!(world.hitbox_position(h), Some(Vec3::new(3.0, 1.0, -2.0)));
    }

    #[test]
    fn removing_twice_is_harmless() {
        let mut world = PhysicsWorld::new();
        let h = world.add_hitbox(Vec3::ZERO, 1.0, 1);
        assert!(world.remove_hitbox(h));
        assert!(!world.remove_hitbox(h));
        assert_eq!(world.hitbox_count(), 0);
        world.move_hitbox(h, Vec3::ONE);
    }

    #[test]
    fn clear_removes_everything() {
        let mut world = PhysicsWorld::new();
        for i in 0..5 {
            world.add_hitbox(Vec3::new(i as f32, 0.0, 0.0), 0.5, i);
        }
        world.clear();
        assert_eq!(world.hitbox_count(), 0);
    }
}
