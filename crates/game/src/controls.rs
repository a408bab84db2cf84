//! Applies one tick of player input: discrete actions first, then look,
//! movement (or driving), and the trigger.

use audio::Sfx;
use engine_core::Tick;
use glam::Vec3;
use input::{Action, FrameInput};

use crate::combat;
use crate::state::{GameState, Io};
use crate::truck;
use crate::weapons::WeaponKind;

pub fn apply(state: &mut GameState, io: &mut Io, input: &FrameInput, tick: &Tick) {
    for action in &input.actions {
        perform(state, io, *action, tick);
    }

    if state.is_driving() {
        truck::update(state, io.scene, input.movement, tick);
        state.player.velocity = state.truck.as_ref().map_or(Vec3::ZERO, |t| t.transform.forward() * t.speed);
        return;
    }

    state.camera.process_mouse(input.look_delta);
    state.camera.update_aim(input.aim_held, tick.dt);
    let speed = state.config.player.move_speed;
    state.player.walk(&mut state.camera, input.movement, speed, tick, io.audio);
    combat::handle_trigger(state, io, input.fire_pressed, input.fire_held, tick);
}

fn perform(state: &mut GameState, io: &mut Io, action: Action, tick: &Tick) {
    match action {
        Action::Reload => {
            if state.arsenal.start_reload(tick.now_ms) {
                io.audio.play(Sfx::Reload);
            }
        }
        Action::SelectWeapon(slot) => {
            let Some(kind) = WeaponKind::from_slot(slot) else {
                return;
            };
            if state.arsenal.switch_to(kind) {
                log::debug!("Switched to {}", kind.spec().name);
                combat::equip(state, io.scene, kind);
            }
        }
        Action::Interact => {
            truck::toggle(state);
        }
        Action::ToggleNightVision => {
            let enabled = state.night_vision.toggle(io.scene);
            state.atmosphere.night_vision = enabled;
            if let Some(key) = state.level.key {
                io.scene.set_visible(key.node, enabled);
            }
        }
        Action::ToggleFlashlight => {
            state.atmosphere.flashlight = state.night_vision.toggle_flashlight();
        }
        Action::CycleTheme => {
            state.theme = state.theme.next();
            io.scene.set_wall_theme(state.theme);
            state.messages.info(format!("Wall theme: {}", state.theme.name()));
        }
        // Pausing belongs to the session, which owns the clock.
        Action::TogglePause => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::testing::Rig;
    use glam::Vec2;
    use renderer::WallTheme;

    fn with_actions(actions: Vec<Action>) -> FrameInput {
        FrameInput {
            actions,
            ..Default::default()
        }
    }

    fn apply_once(rig: &mut Rig, input: FrameInput) {
        let tick = rig.clock.tick();
        let (state, mut io) = rig.parts();
        apply(state, &mut io, &input, &tick);
    }

    #[test]
    fn weapon_slots_switch_and_equip() {
        let mut rig = Rig::with_assets(AssetCatalog::empty().with_model("rifle"));
        apply_once(&mut rig, with_actions(vec![Action::SelectWeapon(6)]));
        assert_eq!(rig.state.arsenal.active(), WeaponKind::Rifle);
        assert!(rig.state.viewmodel.is_some());

        apply_once(&mut rig, with_actions(vec![Action::SelectWeapon(2)]));
        assert_ne!(rig.state.arsenal.active(), WeaponKind::Rifle);
        assert!(rig.state.viewmodel.is_none(), "no model loaded for this weapon");
    }

    #[test]
    fn reload_plays_once() {
        let mut rig = Rig::new();
        apply_once(&mut rig, with_actions(vec![Action::Reload]));
        apply_once(&mut rig, with_actions(vec![Action::Reload]));
        assert!(rig.state.arsenal.is_reloading());
        assert_eq!(rig.audio.count(Sfx::Reload), 1);
    }

    #[test]
    fn night_vision_and_flashlight_drive_atmosphere() {
        let mut rig = Rig::new();
        apply_once(&mut rig, with_actions(vec![Action::ToggleNightVision, Action::ToggleFlashlight]));
        assert!(rig.state.atmosphere.night_vision);
        assert!(rig.state.atmosphere.flashlight);
        apply_once(&mut rig, with_actions(vec![Action::ToggleNightVision]));
        assert!(!rig.state.atmosphere.night_vision);
    }

    #[test]
    fn theme_cycles() {
        let mut rig = Rig::new();
        apply_once(&mut rig, with_actions(vec![Action::CycleTheme]));
        assert_eq!(rig.state.theme, WallTheme::Normal.next());
        assert_eq!(rig.scene.theme(), rig.state.theme);
    }

    #[test]
    fn walking_moves_the_camera() {
        let mut rig = Rig::new();
        rig.advance_ms(16);
        let input = FrameInput {
            movement: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        apply_once(&mut rig, input);
        assert!(rig.state.player_position().z < 0.0);
        assert_eq!(rig.audio.count(Sfx::Walk), 1);
    }

    #[test]
    fn driving_suppresses_the_trigger() {
        let mut rig = Rig::with_assets(AssetCatalog::empty().with_model("truck"));
        {
            let (state, io) = rig.parts();
            truck::spawn_if_available(state, io.scene);
        }
        rig.advance_ms(16);
        apply_once(&mut rig, with_actions(vec![Action::Interact]));
        assert!(rig.state.is_driving());

        rig.advance_ms(16);
        let input = FrameInput {
            movement: Vec2::new(0.0, 1.0),
            fire_pressed: true,
            ..Default::default()
        };
        apply_once(&mut rig, input);
        assert!(rig.state.projectiles.is_empty());
        assert!(rig.state.truck.as_ref().unwrap().speed > 0.0);
        assert_ne!(rig.state.player_position(), Vec3::new(0.0, 1.6, 0.0));
    }
}
