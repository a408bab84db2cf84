//! Scene graph boundary.
//!
//! The game adds, moves, and removes nodes and adjusts atmosphere values.
//! Removing a node releases its whole subtree. Operations on ids that no
//! longer exist are ignored.

use std::collections::HashMap;

use engine_core::Transform;
use glam::{Quat, Vec3};

use crate::theme::WallTheme;

/// Handle to a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Pure container (chunk roots).
    Group,
    Plane { width: f32, depth: f32 },
    Pillar { radius: f32, height: f32 },
    Cuboid { size: Vec3 },
    Sphere { radius: f32 },
    Spire { radius: f32, height: f32 },
    PointLight { color: u32, range: f32 },
    /// Preloaded model by asset name.
    Model(&'static str),
    /// Camera-facing textured quad.
    Billboard { texture: String, size: f32 },
    Beam { length: f32 },
}

/// Node description passed to [`Scene::add`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDesc {
    pub shape: Shape,
    pub transform: Transform,
    /// Packed 0xRRGGBB.
    pub color: u32,
    /// Texture or shader material name.
    pub material: Option<&'static str>,
}

impl NodeDesc {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            transform: Transform::default(),
            color: 0xffffff,
            material: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn material(mut self, material: &'static str) -> Self {
        self.material = Some(material);
        self
    }
}

/// Global look of the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atmosphere {
    pub fog_color: u32,
    pub fog_density: f32,
    /// Main directional light intensity.
    pub main_light: f32,
    pub sandstorm: bool,
    pub blood_rain: bool,
    pub night_vision: bool,
    pub flashlight: bool,
}

pub const DEFAULT_FOG_COLOR: u32 = 0x0a0a0a;
pub const DEFAULT_FOG_DENSITY: f32 = 0.025;
pub const DEFAULT_MAIN_LIGHT: f32 = 0.8;

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            fog_color: DEFAULT_FOG_COLOR,
            fog_density: DEFAULT_FOG_DENSITY,
            main_light: DEFAULT_MAIN_LIGHT,
            sandstorm: false,
            blood_rain: false,
            night_vision: false,
            flashlight: false,
        }
    }
}

/// Rendering collaborator.
pub trait Scene {
    /// Add a node under `parent` (or the root). Transforms are parent-relative.
    fn add(&mut self, parent: Option<NodeId>, desc: NodeDesc) -> NodeId;

    /// Detach a node and release it with all descendants.
    fn remove(&mut self, id: NodeId);

    fn set_transform(&mut self, id: NodeId, transform: Transform);

    fn set_visible(&mut self, id: NodeId, visible: bool);

    /// Light intensity or material opacity, depending on the node.
    fn set_intensity(&mut self, id: NodeId, intensity: f32);

    /// Numeric shader input.
    fn set_uniform(&mut self, id: NodeId, name: &'static str, value: f32);

    fn set_atmosphere(&mut self, atmosphere: &Atmosphere);

    fn set_wall_theme(&mut self, theme: WallTheme);

    /// Shared time input for every animated material.
    fn set_time(&mut self, seconds: f32);

    fn set_camera(&mut self, position: Vec3, rotation: Quat, fov_degrees: f32);
}

/// A node as stored by [`SceneGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub desc: NodeDesc,
    pub visible: bool,
    pub intensity: f32,
    pub uniforms: HashMap<&'static str, f32>,
}

/// Retained in-memory scene.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    atmosphere: Atmosphere,
    theme: WallTheme,
    time: f32,
    camera: (Vec3, Quat, f32),
    /// Nodes released since creation.
    pub released: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// World-space position, walking up the parent chain.
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        let node = self.nodes.get(&id)?;
        let local = node.desc.transform.position;
        match node.parent {
            Some(parent) => Some(self.world_position(parent).unwrap_or(Vec3::ZERO) + local),
            None => Some(local),
        }
    }

    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    pub fn theme(&self) -> WallTheme {
        self.theme
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn camera(&self) -> (Vec3, Quat, f32) {
        self.camera
    }

    /// Count nodes whose shape matches `pred`.
    pub fn count(&self, pred: impl Fn(&Shape) -> bool) -> usize {
        self.nodes.values().filter(|n| pred(&n.desc.shape)).count()
    }

    fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            self.released += 1;
            for child in node.children {
                self.release(child);
            }
        }
    }
}

impl Scene for SceneGraph {
    fn add(&mut self, parent: Option<NodeId>, desc: NodeDesc) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.push(id);
        }
        self.nodes.insert(
            id,
            Node {
                parent,
                children: Vec::new(),
                desc,
                visible: true,
                intensity: 1.0,
                uniforms: HashMap::new(),
            },
        );
        id
    }

    fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).map(|n| n.parent) else {
            log::debug!("scene: remove of unknown node {id:?}");
            return;
        };
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }
        self.release(id);
    }

    fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.desc.transform = transform;
        }
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    fn set_intensity(&mut self, id: NodeId, intensity: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.intensity = intensity;
        }
    }

    fn set_uniform(&mut self, id: NodeId, name: &'static str, value: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.uniforms.insert(name, value);
        }
    }

    fn set_atmosphere(&mut self, atmosphere: &Atmosphere) {
        self.atmosphere = *atmosphere;
    }

    fn set_wall_theme(&mut self, theme: WallTheme) {
        self.theme = theme;
    }

    fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }

    fn set_camera(&mut self, position: Vec3, rotation: Quat, fov_degrees: f32) {
        self.camera = (position, rotation, fov_degrees);
    }
}
