//! Player health and sanity.
//!
//! Both values live in [0, 1] and every mutation clamps. Rates are per second.

use glam::Vec3;

/// Passive sanity recovery.
pub const SANITY_REGEN: f32 = 0.006;
/// Hostiles inside this range drain sanity, scaled by closeness.
pub const PROXIMITY_RANGE: f32 = 25.0;
pub const PROXIMITY_DRAIN: f32 = 0.048;
/// Hostiles inside this range add a flat drain on top.
pub const CLOSE_RANGE: f32 = 3.0;
pub const CLOSE_DRAIN: f32 = 0.9;
/// Morphoser hazard: health drain while near and facing it.
pub const MORPHOSER_RANGE: f32 = 15.0;
pub const MORPHOSER_DRAIN: f32 = 0.12;
pub const MORPHOSER_FACING_DOT: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vitals {
    health: f32,
    sanity: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new()
    }
}

impl Vitals {
    pub fn new() -> Self {
        Self {
            health: 1.0,
            sanity: 1.0,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn sanity(&self) -> f32 {
        self.sanity
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, 1.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).clamp(0.0, 1.0);
    }

    /// Positive restores, negative drains.
    pub fn adjust_sanity(&mut self, amount: f32) {
        self.sanity = (self.sanity + amount).clamp(0.0, 1.0);
    }

    /// Sound distress level handed to the audio layer.
    pub fn distress(&self) -> f32 {
        self.sanity * 0.7 + self.health * 0.3
    }
}

/// Facts about the player's surroundings gathered earlier in the tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exposure {
    /// Distance to the nearest live hostile, if any.
    pub nearest_hostile: Option<f32>,
    /// Distance to the morphoser and the view-direction dot toward it.
    pub morphoser: Option<(f32, f32)>,
}

impl Exposure {
    /// Warning overlay opacity for the nearest hostile.
    pub fn warning_opacity(&self) -> f32 {
        match self.nearest_hostile {
            Some(d) if d < PROXIMITY_RANGE => 1.0 - d / PROXIMITY_RANGE,
            _ => 0.0,
        }
    }
}

/// Compute the facing dot used by [`Exposure::morphoser`].
pub fn facing_dot(eye: Vec3, forward: Vec3, target: Vec3) -> f32 {
    let to_target = (target - eye).normalize_or_zero();
    forward.normalize_or_zero().dot(to_target)
}

/// Apply one tick of regeneration and drains.
pub fn update(vitals: &mut Vitals, exposure: &Exposure, dt: f32, god_mode: bool) {
    vitals.adjust_sanity(SANITY_REGEN * dt);

    if let Some(d) = exposure.nearest_hostile {
        if d < PROXIMITY_RANGE {
            vitals.adjust_sanity(-PROXIMITY_DRAIN * (1.0 - d / PROXIMITY_RANGE) * dt);
        }
        if d < CLOSE_RANGE {
            vitals.adjust_sanity(-CLOSE_DRAIN * dt);
        }
    }

    if let Some((d, dot)) = exposure.morphoser {
        if d < MORPHOSER_RANGE && dot > MORPHOSER_FACING_DOT && !god_mode {
            vitals.damage(MORPHOSER_DRAIN * (1.0 - d / MORPHOSER_RANGE) * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_clamp_to_unit_range() {
        let mut v = Vitals::new();
        v.damage(3.0);
        assert_eq!(v.health(), 0.0);
        assert!(v.is_dead());
        v.heal(7.0);
        assert_eq!(v.health(), 1.0);
        v.adjust_sanity(-2.0);
        assert_eq!(v.sanity(), 0.0);
        v.adjust_sanity(0.25);
        assert!((v.sanity() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn sanity_regenerates_when_alone() {
        let mut v = Vitals::new();
        v.adjust_sanity(-0.5);
        update(&mut v, &Exposure::default(), 10.0, false);
        assert!((v.sanity() - 0.56).abs() < 1e-4, "got {}", v.sanity());
    }

    #[test]
    fn close_hostile_drains_faster_than_distant_one() {
        let mut near = Vitals::new();
        let mut far = Vitals::new();
        near.adjust_sanity(-0.5);
        far.adjust_sanity(-0.5);
        let dt = 0.1;
        update(&mut near, &Exposure { nearest_hostile: Some(2.0), morphoser: None }, dt, false);
        update(&mut far, &Exposure { nearest_hostile: Some(20.0), morphoser: None }, dt, false);
        assert!(near.sanity() < far.sanity());
        assert!(far.sanity() < 0.5 + SANITY_REGEN * dt);
    }

    #[test]
    fn morphoser_only_hurts_when_faced() {
        let mut v = Vitals::new();
        update(&mut v, &Exposure { nearest_hostile: None, morphoser: Some((5.0, 0.2)) }, 1.0, false);
        assert_eq!(v.health(), 1.0);
        update(&mut v, &Exposure { nearest_hostile: None, morphoser: Some((5.0, 0.95)) }, 1.0, false);
        assert!(v.health() < 1.0);
    }

    #[test]
    fn god_mode_ignores_morphoser() {
        let mut v = Vitals::new();
        update(&mut v, &Exposure { nearest_hostile: None, morphoser: Some((1.0, 1.0)) }, 1.0, true);
        assert_eq!(v.health(), 1.0);
    }

    #[test]
    fn warning_fades_with_distance() {
        let e = Exposure { nearest_hostile: Some(12.5), morphoser: None };
        assert!((e.warning_opacity() - 0.5).abs() < 1e-6);
        assert_eq!(Exposure::default().warning_opacity(), 0.0);
    }

    #[test]
    fn facing_dot_is_one_when_looking_straight_at_target() {
        let dot = facing_dot(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -10.0));
        assert!((dot - 1.0).abs() < 1e-6);
    }
}
