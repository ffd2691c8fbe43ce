//! Fixed-step simulation tick
//!
//! One call advances the game by one frame. Everything is driven by the
//! `TickInput` and the state's own RNG, so replaying the same inputs from the
//! same seed gives the same game.

use glam::Vec2;

use super::collision::circles_overlap;
use super::powerup::{self, PowerUpKind};
use super::state::{GameEvent, GamePhase, GameState, SCORE_PER_KILL, SCORE_PER_STAR};
use super::tank::{HitOutcome, TankInput};
use super::target::TargetClass;

/// Track edits applied while the editor is open
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditCommand {
    /// Append a point to the active side
    AddPoint(Vec2),
    /// Remove the selected point, or the last one
    RemovePoint,
    /// Select the point under the cursor
    Select(Vec2),
    /// Drag the selected point
    MoveSelected(Vec2),
    Deselect,
    SwitchSide,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// World-space cursor position; the turret tracks it
    pub aim: Vec2,
    pub fire: bool,
    /// Spend the stored power-up
    pub use_power_up: bool,
    /// Enter or leave the track editor
    pub toggle_editor: bool,
    pub edits: Vec<EditCommand>,
}

/// Destroyed target waiting to be scored
type Kill = (Vec2, TargetClass, u64);

/// Advance the game state by one step
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if input.toggle_editor {
        toggle_editor(state);
    }

    match state.phase {
        GamePhase::Editor => {
            apply_edits(state, &input.edits);
            return;
        }
        GamePhase::GameOver => return,
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;
    state.laser.tick();
    if let Some(p) = state.power_up.as_mut() {
        p.update();
    }

    if input.use_power_up {
        use_power_up(state);
    }

    if input.fire && state.tank.fire() {
        let position = state.tank.cannon_tip();
        state.events.push(GameEvent::ShotFired { position });
    }

    let tank_input = TankInput {
        rotate_left: input.rotate_left,
        rotate_right: input.rotate_right,
        aim: input.aim,
    };
    if state.tank.update(&tank_input, Some(&state.track)) {
        let position = state.tank.position;
        state.events.push(GameEvent::BoundaryHit { position });
    }

    let tank_pos = state.tank.position;
    for target in &mut state.targets {
        target.update(tank_pos, Some(&state.track));
    }

    collect_power_up(state);
    if !state.tank.invulnerable {
        star_contacts(state);
    }
    if !state.tank.invulnerable {
        enemy_bullet_hits(state);
    }
    target_contacts(state);
    shell_hits(state);

    if !state.tank.is_alive() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!(
            "Game over at level {} with score {}",
            state.level,
            state.score
        );
    }
}

fn toggle_editor(state: &mut GameState) {
    match state.phase {
        GamePhase::Editor => {
            state.track.deselect();
            log::info!("Leaving track editor");
            state.restart();
        }
        GamePhase::Playing | GamePhase::GameOver => {
            state.phase = GamePhase::Editor;
            log::info!(
                "Track editor open, editing {} side",
                state.track.active_side().as_str()
            );
        }
    }
}

fn apply_edits(state: &mut GameState, edits: &[EditCommand]) {
    let track = &mut state.track;
    for edit in edits {
        match *edit {
            EditCommand::AddPoint(p) => track.add_control_point(p, None),
            EditCommand::RemovePoint => {
                if !track.remove_control_point(None) {
                    log::debug!("Nothing to remove on {} side", track.active_side().as_str());
                }
            }
            EditCommand::Select(p) => {
                track.select_point_near(p.x, p.y);
            }
            EditCommand::MoveSelected(p) => track.move_selected(p.x, p.y),
            EditCommand::Deselect => track.deselect(),
            EditCommand::SwitchSide => track.switch_active_side(),
        }
    }
}

fn use_power_up(state: &mut GameState) {
    let Some(kind) = state.stored_power_up.take() else {
        return;
    };

    match kind {
        PowerUpKind::Health => powerup::apply_health(&mut state.tank),
        PowerUpKind::Shield => powerup::apply_shield(&mut state.tank),
        PowerUpKind::Laser => {
            let hit = powerup::fire_laser(&state.tank, &mut state.targets, &mut state.laser);
            let kills = hit
                .into_iter()
                .map(|i| (state.targets[i].position, state.targets[i].class(), SCORE_PER_KILL))
                .collect();
            record_kills(state, kills);
        }
    }
    state.events.push(GameEvent::PowerUpUsed { kind });
}

fn collect_power_up(state: &mut GameState) {
    let tank_pos = state.tank.position;
    let reach = state.tank.contact_radius();
    let Some(kind) = state
        .power_up
        .as_ref()
        .filter(|p| p.check_collection(tank_pos, reach))
        .map(|p| p.kind)
    else {
        return;
    };

    state.power_up = None;
    state.stored_power_up = Some(kind);
    state.events.push(GameEvent::PowerUpCollected { kind });
    log::info!("Collected power-up: {}", kind.name());
}

/// Stars ram the tank for half its max health and die on impact
fn star_contacts(state: &mut GameState) {
    let tank_pos = state.tank.position;
    let reach = state.tank.contact_radius();
    let damage = state.tank.max_health / 2;

    let mut kills = Vec::new();
    for star in state.targets.iter_mut().filter(|t| t.active && t.is_star()) {
        if !circles_overlap(tank_pos, reach, star.position, star.radius) {
            continue;
        }
        let outcome = state.tank.apply_hit(damage);
        state.events.push(GameEvent::TankHit { outcome });
        star.active = false;
        kills.push((star.position, TargetClass::Star, SCORE_PER_STAR));
    }
    record_kills(state, kills);
}

fn enemy_bullet_hits(state: &mut GameState) {
    let tank_pos = state.tank.position;
    let reach = state.tank.contact_radius();
    let damage = state.tank.max_health / 8;

    for target in state.targets.iter_mut().filter(|t| t.active) {
        for bullet in target.bullets_mut().iter_mut().filter(|b| b.active) {
            if circles_overlap(tank_pos, reach, bullet.position, bullet.collision_radius) {
                bullet.active = false;
                let outcome = state.tank.apply_hit(damage);
                state.events.push(GameEvent::TankHit { outcome });
            }
        }
    }
}

/// Hull against non-star targets. At most one contact counts per step.
fn target_contacts(state: &mut GameState) {
    if state.tank.invulnerable {
        state.tank.tick_invulnerability();
        return;
    }

    let center = state.tank.position;
    let half_extents = state.tank.half_extents();
    let angle = state.tank.base_angle;
    let damage = state.tank.max_health / 4;

    let mut kill = None;
    for target in state.targets.iter_mut().filter(|t| !t.is_star()) {
        if !target.hits_rect(center, half_extents, angle) {
            continue;
        }
        let outcome = state.tank.apply_hit(damage);
        state.events.push(GameEvent::TankHit { outcome });

        // A shield bash flattens the target outright
        let destroyed = match outcome {
            HitOutcome::Blocked => target.take_damage(target.health),
            _ => target.take_damage(1),
        };
        if destroyed {
            kill = Some((target.position, target.class(), SCORE_PER_KILL));
        }
        break;
    }
    record_kills(state, kill.into_iter().collect());
}

/// Each live shell damages the first target it is inside
fn shell_hits(state: &mut GameState) {
    let mut kills = Vec::new();
    for shell in state.tank.projectiles.iter_mut().filter(|p| p.active) {
        let Some(target) = state
            .targets
            .iter_mut()
            .find(|t| t.contains_point(shell.position))
        else {
            continue;
        };
        shell.active = false;
        if target.take_damage(1) {
            kills.push((target.position, target.class(), SCORE_PER_KILL));
        }
    }
    state.tank.projectiles.retain(|p| p.active);
    record_kills(state, kills);
}

/// Score a batch of kills. Kills past a level-up only add score, since the
/// wave they belonged to has already been replaced.
fn record_kills(state: &mut GameState, kills: Vec<Kill>) {
    let level = state.level;
    for (position, class, points) in kills {
        if state.level == level {
            state.record_kill(position, class, points);
        } else {
            state.score += points;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::powerup::PowerUp;
    use crate::sim::projectile::Projectile;
    use crate::sim::target::{Target, TargetKind};
    use crate::sim::track::CurveSide;

    fn fresh(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Settings::default());
        state.power_up = None;
        state
    }

    fn target_ahead(state: &GameState, class: TargetClass, distance: f32) -> Target {
        let position = state.tank.position + state.tank.forward() * distance;
        Target::new(position, class, state.level, &state.settings)
    }

    #[test]
    fn test_tick_advances_time_and_moves_tank() {
        let mut state = fresh(1);
        let start = state.tank.position;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);
        assert!(state.tank.position.distance(start) > 0.6);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = GameState::new(77, Settings::default());
        let mut b = GameState::new(77, Settings::default());

        for i in 0..400u32 {
            let input = TickInput {
                rotate_left: (i / 60) % 3 == 0,
                rotate_right: (i / 60) % 3 == 2,
                aim: Vec2::new(640.0 + (i as f32 * 0.1).sin() * 300.0, 360.0),
                fire: i % 7 == 0,
                ..Default::default()
            };
            tick(&mut a, &input);
            tick(&mut b, &input);
        }

        assert_eq!(a.tank.position, b.tank.position);
        assert_eq!(a.tank.health, b.tank.health);
        assert_eq!(a.score, b.score);
        assert_eq!(a.level, b.level);
        let pa: Vec<Vec2> = a.targets.iter().map(|t| t.position).collect();
        let pb: Vec<Vec2> = b.targets.iter().map(|t| t.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_editor_freezes_simulation_and_applies_edits() {
        let mut state = fresh(2);
        let toggle = TickInput {
            toggle_editor: true,
            ..Default::default()
        };
        tick(&mut state, &toggle);
        assert_eq!(state.phase, GamePhase::Editor);

        let position = state.tank.position;
        let left_count = state.track.control_points(CurveSide::Left).len();
        let edit = TickInput {
            rotate_left: true,
            fire: true,
            edits: vec![
                EditCommand::AddPoint(Vec2::new(500.0, 360.0)),
                EditCommand::SwitchSide,
                EditCommand::Select(Vec2::new(643.0, 112.0)),
                EditCommand::MoveSelected(Vec2::new(640.0, 90.0)),
            ],
            ..Default::default()
        };
        tick(&mut state, &edit);

        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.tank.position, position);
        assert!(state.tank.projectiles.is_empty());
        assert_eq!(state.track.control_points(CurveSide::Left).len(), left_count + 1);
        assert_eq!(state.track.active_side(), CurveSide::Right);
        assert_eq!(state.track.control_points(CurveSide::Right)[1], Vec2::new(640.0, 90.0));
    }

    #[test]
    fn test_leaving_editor_restarts_game() {
        let mut state = fresh(3);
        state.score = 700;
        state.level = 3;
        let toggle = TickInput {
            toggle_editor: true,
            ..Default::default()
        };
        tick(&mut state, &toggle);
        state.track.switch_active_side();
        assert!(state.track.select_point_near(640.0, 110.0));
        tick(&mut state, &toggle);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert!(state.track.selection().is_none());
        let (start, _) = state.track.start_pose().unwrap();
        // Restart places the tank, then the same tick drives it one step
        assert!(state.tank.position.distance(start) < 1.0);
    }

    #[test]
    fn test_shell_destroys_target() {
        let mut state = fresh(4);
        let mut target = target_ahead(&state, TargetClass::Basic, 120.0);
        target.health = 1;
        let aim = target.position;
        state.targets = vec![target];

        let mut destroyed = false;
        for i in 0..60 {
            let input = TickInput {
                aim,
                fire: i == 0,
                ..Default::default()
            };
            tick(&mut state, &input);
            if state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::TargetDestroyed { .. }))
            {
                destroyed = true;
                break;
            }
        }

        assert!(destroyed);
        assert_eq!(state.score, SCORE_PER_KILL);
        assert_eq!(state.destroyed_targets, 1);
        assert!(state.tank.projectiles.is_empty());
    }

    #[test]
    fn test_collect_then_fire_laser() {
        let mut state = fresh(5);
        state.power_up = Some(PowerUp::new(state.tank.position, PowerUpKind::Laser));
        let target = target_ahead(&state, TargetClass::Basic, 300.0);
        let aim = target.position;
        state.targets = vec![target];

        tick(&mut state, &TickInput { aim, ..Default::default() });
        assert!(state.power_up.is_none());
        assert_eq!(state.stored_power_up, Some(PowerUpKind::Laser));
        assert!(state.events.contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::Laser
        }));

        let fire = TickInput {
            aim,
            use_power_up: true,
            ..Default::default()
        };
        tick(&mut state, &fire);
        assert!(state.stored_power_up.is_none());
        assert!(!state.targets[0].active);
        assert_eq!(state.score, SCORE_PER_KILL);
        assert!(state.laser.active);
        assert!(state.events.contains(&GameEvent::PowerUpUsed {
            kind: PowerUpKind::Laser
        }));
    }

    #[test]
    fn test_star_ram_costs_half_health() {
        let mut state = fresh(6);
        state.targets = vec![target_ahead(&state, TargetClass::Star, 20.0)];

        tick(&mut state, &TickInput::default());
        assert_eq!(state.tank.health, 50);
        assert_eq!(state.score, SCORE_PER_STAR);
        assert!(!state.targets[0].active);
        assert!(state.tank.invulnerable);
        assert!(state.events.contains(&GameEvent::TankHit {
            outcome: HitOutcome::Damaged
        }));
    }

    #[test]
    fn test_shield_blocks_star_ram() {
        let mut state = fresh(7);
        state.tank.has_shield = true;
        state.targets = vec![target_ahead(&state, TargetClass::Star, 20.0)];

        tick(&mut state, &TickInput::default());
        assert_eq!(state.tank.health, 100);
        assert!(!state.tank.has_shield);
        assert!(!state.targets[0].active);
        assert_eq!(state.score, SCORE_PER_STAR);
    }

    #[test]
    fn test_enemy_bullet_hit() {
        let mut state = fresh(8);
        let mut shooter = target_ahead(&state, TargetClass::Shooter, 500.0);
        if let TargetKind::Shooter(s) = &mut shooter.kind {
            s.cooldown = 1000;
            s.bullets
                .push(Projectile::new(state.tank.position, Vec2::ZERO, 5.0, 10));
        }
        state.targets = vec![shooter];

        tick(&mut state, &TickInput::default());
        assert_eq!(state.tank.health, 100 - 100 / 8);
        assert!(state.targets[0].bullets().iter().all(|b| !b.active));
    }

    #[test]
    fn test_ramming_target_damages_both() {
        let mut state = fresh(9);
        // Just past the front-left hull corner
        let f = state.tank.forward();
        let side = Vec2::new(-f.y, f.x);
        let position = state.tank.position + f * 32.0 + side * 18.0;
        state.targets = vec![Target::new(position, TargetClass::Basic, 1, &state.settings)];

        tick(&mut state, &TickInput::default());
        assert_eq!(state.tank.health, 75);
        assert_eq!(state.targets[0].health, 1);
        assert!(state.tank.invulnerable);
    }

    #[test]
    fn test_game_over_stops_simulation() {
        let mut state = fresh(10);
        state.tank.health = 0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
        assert!(state.events.is_empty());
    }
}
