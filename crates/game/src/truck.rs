//! The drivable truck. Present only when its model loaded.

use engine_core::{yaw_towards, Tick, Transform};
use glam::{EulerRot, Vec2, Vec3};
use renderer::{Camera, NodeDesc, NodeId, Scene, Shape};

use crate::state::GameState;

/// The player must be this close to climb in.
pub const ENTER_RANGE: f32 = 5.0;
/// Units per second squared at full throttle.
const ACCELERATION: f32 = 36.0;
/// Per-frame speed retention at 60 Hz.
const DAMPING: f32 = 0.95;
/// Radians per second at full steering.
const TURN_RATE: f32 = 1.2;
const CHASE_OFFSET: Vec3 = Vec3::new(0.0, 5.0, 10.0);
const EXIT_OFFSET: Vec3 = Vec3::new(-4.0, 0.0, 0.0);

#[derive(Debug, Clone)]
pub struct Truck {
    pub transform: Transform,
    /// Signed speed along the heading, units per second.
    pub speed: f32,
    pub node: NodeId,
    pub occupied: bool,
}

impl Truck {
    pub fn new(position: Vec3, node: NodeId) -> Self {
        Self {
            transform: Transform::from_position(position),
            speed: 0.0,
            node,
            occupied: false,
        }
    }

    pub fn can_enter(&self, player: Vec3) -> bool {
        !self.occupied && self.transform.flat_distance(player) <= ENTER_RANGE
    }

    /// Integrate one tick of driving. `input.y` is throttle, `input.x` steers.
    pub fn drive(&mut self, input: Vec2, tick: &Tick) {
        let dt = tick.dt;
        self.speed += input.y * ACCELERATION * dt;
        self.speed *= DAMPING.powf(dt * 60.0);
        self.transform.rotate_y(-input.x * TURN_RATE * dt);
        let forward = self.transform.forward();
        self.transform.position += forward * self.speed * dt;
    }

    /// Third-person chase camera behind and above the truck.
    pub fn chase_camera(&self, camera: &mut Camera) {
        let eye = self.transform.position + self.transform.rotation * CHASE_OFFSET;
        let dir = (self.transform.position - eye).normalize_or_zero();
        camera.transform.position = eye;
        camera.set_yaw_pitch(yaw_towards(dir.x, dir.z), dir.y.clamp(-1.0, 1.0).asin());
    }

    /// Where the player stands after climbing out.
    pub fn exit_position(&self) -> Vec3 {
        self.transform.position + self.transform.rotation * EXIT_OFFSET
    }

    pub fn yaw(&self) -> f32 {
        let (yaw, _, _) = self.transform.rotation.to_euler(EulerRot::YXZ);
        yaw
    }
}

/// Park the truck beside the player if its model is available.
pub fn spawn_if_available(state: &mut GameState, scene: &mut dyn Scene) {
    if !state.assets.has_model("truck") {
        log::debug!("Truck model missing; no vehicle this session");
        return;
    }
    let position = Vec3::new(state.player_position().x + 5.0, 0.0, state.player_position().z);
    let node = scene.add(None, NodeDesc::new(Shape::Model("truck")).at(position));
    state.truck = Some(Truck::new(position, node));
}

/// Enter the truck if close enough, or leave it if already inside.
pub fn toggle(state: &mut GameState) -> bool {
    let player = state.player_position();
    let Some(truck) = state.truck.as_mut() else {
        return false;
    };
    if truck.occupied {
        truck.occupied = false;
        truck.speed = 0.0;
        let exit = truck.exit_position();
        let yaw = truck.yaw();
        state.player.place(&mut state.camera, exit);
        state.camera.set_yaw_pitch(yaw, 0.0);
        state.messages.info("Exited truck");
        true
    } else if truck.can_enter(player) {
        truck.occupied = true;
        state.messages.info("Entered truck");
        true
    } else {
        false
    }
}

/// Drive one tick and keep the model and camera attached.
pub fn update(state: &mut GameState, scene: &mut dyn Scene, input: Vec2, tick: &Tick) {
    let Some(truck) = state.truck.as_mut() else {
        return;
    };
    if !truck.occupied {
        return;
    }
    truck.drive(input, tick);
    truck.chase_camera(&mut state.camera);
    scene.set_transform(truck.node, truck.transform);
}
