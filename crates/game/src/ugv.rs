//! UGV ground vehicle: a patrol/idle/attack state machine.

use std::f32::consts::TAU;

use engine_core::{yaw_towards, Entity, Tick, Transform, World};
use glam::{Quat, Vec3};
use rand::Rng;

use crate::creature::Creature;

pub const DETECTION_RANGE: f32 = 45.0;
pub const LOSE_RANGE: f32 = DETECTION_RANGE * 1.5;
pub const OPTIMAL_DISTANCE: f32 = 15.0;
pub const WAYPOINT_RADIUS: f32 = 1.0;
pub const SHOOT_INTERVAL_MS: u64 = 4000;
pub const IDLE_DWELL_MS: u64 = 3000;
pub const PATROL_SPEED: f32 = 1.2;
pub const ATTACK_SPEED: f32 = 2.1;
/// Shell speed in units per tick.
pub const SHELL_SPEED: f32 = 0.8;
pub const SHELL_LIFETIME: u32 = 120;
pub const SHELL_COLOR: u32 = 0xffa500;
/// Player health removed by one shell.
pub const SHELL_DAMAGE: f32 = 0.1;
/// Ticks per second assumed when converting shell speed for lead prediction.
const TICK_RATE: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UgvState {
    Patrolling,
    Idle { since_ms: u64 },
    Attacking,
}

/// A shell the UGV wants fired this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UgvShot {
    pub origin: Vec3,
    /// Units per tick.
    pub velocity: Vec3,
}

#[derive(Debug, Clone)]
pub struct UgvBrain {
    pub state: UgvState,
    pub patrol_points: [Vec3; 4],
    pub waypoint: usize,
    pub last_shot: Option<u64>,
}

impl UgvBrain {
    /// Spawn point plus three random points 10-25 units around it.
    pub fn new(spawn: Vec3, rng: &mut impl Rng) -> Self {
        let mut patrol_points = [spawn; 4];
        for point in patrol_points.iter_mut().skip(1) {
            let angle = rng.gen_range(0.0..TAU);
            let radius = rng.gen_range(10.0..25.0);
            *point = spawn + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
        }
        Self {
            state: UgvState::Patrolling,
            patrol_points,
            waypoint: 0,
            last_shot: None,
        }
    }

    /// Advance one tick. Moves `transform` and returns a shot if one is due.
    pub fn think(
        &mut self,
        transform: &mut Transform,
        player_pos: Vec3,
        player_velocity: Vec3,
        tick: &Tick,
    ) -> Option<UgvShot> {
        let distance = transform.flat_distance(player_pos);

        let previous = self.state;
        self.state = match self.state {
            UgvState::Patrolling | UgvState::Idle { .. } if distance < DETECTION_RANGE => UgvState::Attacking,
            UgvState::Attacking if distance > LOSE_RANGE => UgvState::Patrolling,
            UgvState::Idle { since_ms } if tick.since(since_ms) >= IDLE_DWELL_MS => UgvState::Patrolling,
            other => other,
        };
        // A state entered this tick holds for the whole tick.
        let entered = self.state != previous;

        match self.state {
            UgvState::Patrolling => {
                let target = self.patrol_points[self.waypoint];
                if !entered && transform.flat_distance(target) <= WAYPOINT_RADIUS {
                    self.state = UgvState::Idle { since_ms: tick.now_ms };
                    self.waypoint = (self.waypoint + 1) % self.patrol_points.len();
                } else {
                    transform.look_at_flat(target);
                    step_towards(transform, target, PATROL_SPEED * tick.dt);
                }
                None
            }
            UgvState::Idle { .. } => None,
            UgvState::Attacking => {
                if distance > OPTIMAL_DISTANCE {
                    step_towards(transform, player_pos, ATTACK_SPEED * tick.dt);
                }

                let origin = transform.position + Vec3::Y * 0.5;
                let flight_time = origin.distance(player_pos) / (SHELL_SPEED * TICK_RATE);
                let predicted = player_pos + player_velocity * flight_time;
                let aim = predicted - origin;
                if aim.x * aim.x + aim.z * aim.z > 1e-6 {
                    transform.rotation = Quat::from_rotation_y(yaw_towards(aim.x, aim.z));
                }

                let ready = self.last_shot.map_or(true, |t| tick.since(t) >= SHOOT_INTERVAL_MS);
                if !ready {
                    return None;
                }
                self.last_shot = Some(tick.now_ms);
                Some(UgvShot {
                    origin,
                    velocity: aim.normalize_or_zero() * SHELL_SPEED,
                })
            }
        }
    }
}

fn step_towards(transform: &mut Transform, target: Vec3, max_step: f32) {
    let mut delta = target - transform.position;
    delta.y = 0.0;
    let len = delta.length();
    if len > 1e-5 {
        transform.position += delta / len * max_step.min(len);
    }
}

/// Run every live UGV. Returns the shots to spawn with their shooter.
pub fn update(registry: &mut World, player_pos: Vec3, player_velocity: Vec3, tick: &Tick) -> Vec<(Entity, UgvShot)> {
    let mut shots = Vec::new();
    for (entity, (creature, transform, brain)) in registry.query_mut::<(&Creature, &mut Transform, &mut UgvBrain)>() {
        if creature.is_dead() {
            continue;
        }
        if let Some(shot) = brain.think(transform, player_pos, player_velocity, tick) {
            shots.push((entity, shot));
        }
    }
    shots
}
