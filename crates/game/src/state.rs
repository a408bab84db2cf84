//! Game state: the single record every system reads and writes, plus the
//! collaborator bundle handed to each tick.

use audio::{SoundOutput, SpeechQueue, Voice};
use engine_core::{Entity, World};
use glam::Vec3;
use physics::PhysicsWorld;
use rand::rngs::StdRng;
use renderer::{Atmosphere, Camera, NodeId, Scene, WallTheme};

use crate::assets::AssetCatalog;
use crate::chunks::ChunkManager;
use crate::combat::Beam;
use crate::config::GameConfig;
use crate::creature::{self, EntityKind};
use crate::dialogue::DialogueDirector;
use crate::events::EventScheduler;
use crate::hud::{GameMessages, Hud};
use crate::level::LevelObjects;
use crate::nightvision::NightVision;
use crate::player::{Player, EYE_HEIGHT};
use crate::projectiles::Projectile;
use crate::truck::Truck;
use crate::vitals::{Exposure, Vitals};
use crate::weapons::Arsenal;

/// External collaborators for one tick. The game only calls into these.
pub struct Io<'a> {
    pub scene: &'a mut dyn Scene,
    pub audio: &'a mut dyn SoundOutput,
    pub voice: &'a mut dyn Voice,
    pub hud: &'a mut dyn Hud,
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Terminal for the session.
    Dead,
}

/// Score and level progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: u32,
    pub kills: u32,
    pub collected: u32,
    pub has_nv_key: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            kills: 0,
            collected: 0,
            has_nv_key: false,
        }
    }
}

pub struct GameState {
    pub config: GameConfig,
    pub rng: StdRng,
    /// Every creature, hostile or friendly.
    pub registry: World,
    /// Creature hitboxes for hitscan.
    pub physics: PhysicsWorld,
    pub camera: Camera,
    pub player: Player,
    pub vitals: Vitals,
    pub arsenal: Arsenal,
    pub projectiles: Vec<Projectile>,
    pub beams: Vec<Beam>,
    pub viewmodel: Option<NodeId>,
    pub chunks: ChunkManager,
    pub events: EventScheduler,
    pub atmosphere: Atmosphere,
    pub theme: WallTheme,
    pub progress: Progress,
    pub level: LevelObjects,
    pub truck: Option<Truck>,
    pub night_vision: NightVision,
    pub speech: SpeechQueue,
    pub dialogue: DialogueDirector,
    pub messages: GameMessages,
    pub phase: GamePhase,
    pub assets: AssetCatalog,
    /// Surroundings measured this tick, read by vitals and the HUD.
    pub exposure: Exposure,
}

impl GameState {
    pub fn new(config: GameConfig, assets: AssetCatalog, rng: StdRng) -> Self {
        let mut camera = Camera::new(Vec3::new(0.0, EYE_HEIGHT, 0.0));
        camera.sensitivity = config.player.sensitivity;
        camera.aim_sensitivity = config.player.aim_sensitivity;
        camera.base_fov = config.player.fov;
        camera.aim_fov = config.player.aim_fov;
        camera.fov_degrees = config.player.fov;

        Self {
            chunks: ChunkManager::new(&config.world),
            events: EventScheduler::new(&config.events),
            rng,
            registry: World::new(),
            physics: PhysicsWorld::new(),
            camera,
            player: Player::default(),
            vitals: Vitals::new(),
            arsenal: Arsenal::new(),
            projectiles: Vec::new(),
            beams: Vec::new(),
            viewmodel: None,
            atmosphere: Atmosphere::default(),
            theme: WallTheme::Normal,
            progress: Progress::default(),
            level: LevelObjects::default(),
            truck: None,
            night_vision: NightVision::default(),
            speech: SpeechQueue::new(),
            dialogue: DialogueDirector::default(),
            messages: GameMessages::new(),
            phase: GamePhase::Playing,
            assets,
            exposure: Exposure::default(),
            config,
        }
    }

    /// Build level 1 and the surrounding chunks. Called once before the first tick.
    pub fn start(&mut self, io: &mut Io) {
        if self.assets.has_failures() {
            self.messages.error("ERROR: Failed to load some game assets.");
        }
        io.scene.set_atmosphere(&self.atmosphere);
        io.scene.set_wall_theme(self.theme);
        let weapon = self.arsenal.active();
        crate::combat::equip(self, io.scene, weapon);
        crate::level::setup(self, io.scene);
        crate::truck::spawn_if_available(self, io.scene);
        let player = self.player_position();
        let report = self.chunks.stream(player, io.scene);
        crate::update::populate_chunks(self, io.scene, report);
        log::info!("Level {} ready", self.progress.level);
    }

    pub fn player_position(&self) -> Vec3 {
        self.camera.position()
    }

    pub fn is_driving(&self) -> bool {
        self.truck.as_ref().is_some_and(|t| t.occupied)
    }

    pub fn spawn_creature(&mut self, scene: &mut dyn Scene, kind: EntityKind, position: Vec3) -> Entity {
        creature::spawn(
            &mut self.registry,
            &mut self.physics,
            scene,
            &self.assets,
            &mut self.rng,
            kind,
            position,
        )
    }

    pub fn despawn_creature(&mut self, scene: &mut dyn Scene, entity: Entity) -> bool {
        self.chunks.release(entity);
        creature::despawn(&mut self.registry, &mut self.physics, scene, entity)
    }
}
