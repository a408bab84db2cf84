//! Common components shared by the entity registry and its systems.

/// Integer hit points for damageable creatures.
///
/// Damage saturates at zero so a reader never observes a negative value:
/// 5 damage against 3 hit points yields 0 and a dead state, not -2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitpoints {
    current: u32,
    max: u32,
}

impl Hitpoints {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage. Returns `true` only on the hit that takes the
    /// creature from alive to dead.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.current > 0;
        self.current = self.current.saturating_sub(amount);
        was_alive && self.current == 0
    }

    /// Restore to full health (respawn).
    pub fn reset(&mut self) {
        self.current = self.max;
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn percentage(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Remaining lifetime counted in ticks (projectiles, particles).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    pub remaining: u32,
}

impl Lifetime {
    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// Count down one tick. Returns `true` once expired.
    pub fn step(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overkill_saturates_at_zero() {
        let mut hp = Hitpoints::new(3);
        assert!(hp.take_damage(5), "lethal hit should report the death");
        assert_eq!(hp.current(), 0);
        assert!(hp.is_dead());
    }

    #[test]
    fn only_first_lethal_hit_reports_death() {
        let mut hp = Hitpoints::new(2);
        assert!(!hp.take_damage(1));
        assert!(hp.take_damage(1));
        assert!(!hp.take_damage(1), "already dead, no second death");
    }

    #[test]
    fn reset_restores_max() {
        let mut hp = Hitpoints::new(5);
        hp.take_damage(4);
        hp.reset();
        assert_eq!(hp.current(), 5);
        assert_eq!(hp.percentage(), 1.0);
    }

    #[test]
    fn lifetime_expires_after_count() {
        let mut life = Lifetime::new(2);
        assert!(!life.step());
        assert!(life.step());
        assert!(life.step(), "stays expired");
    }
}
