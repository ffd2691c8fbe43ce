//! Spline Tank - headless runner
//!
//! Drives the simulation with a simple autopilot that follows the track
//! centre line and shoots at the nearest target, then logs a session summary.
//!
//! Usage: `spline-tank [seed] [ticks] [--dump]`

use spline_tank::Settings;
use spline_tank::sim::{CurveSide, GameEvent, GamePhase, GameState, TickInput, tick};
use spline_tank::{direction_from_angle, shortest_angle_delta};

const DEFAULT_SEED: u64 = 12345;
/// One minute at 60 steps per second
const DEFAULT_TICKS: u64 = 3600;
/// How far along the curve the autopilot looks ahead
const LOOKAHEAD: f32 = 0.04;
/// Engage targets within this range
const FIRE_RANGE: f32 = 400.0;
/// Turret must be this close (radians) to the target bearing before firing
const FIRE_CONE: f32 = 0.1;

#[derive(Debug, Default)]
struct SessionStats {
    shots: u32,
    boundary_hits: u32,
    tank_hits: u32,
    kills: u32,
    power_ups: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut seed = DEFAULT_SEED;
    let mut ticks = DEFAULT_TICKS;
    let mut dump = false;
    let mut positional = 0;
    for arg in std::env::args().skip(1) {
        if arg == "--dump" {
            dump = true;
            continue;
        }
        let parsed = arg.parse::<u64>();
        match (positional, parsed) {
            (0, Ok(v)) => seed = v,
            (1, Ok(v)) => ticks = v,
            _ => log::warn!("Ignoring argument '{}'", arg),
        }
        positional += 1;
    }

    let settings = Settings::load();
    log::info!(
        "Spline Tank (headless) starting: seed {}, {} ticks, difficulty {}",
        seed,
        ticks,
        settings.difficulty.as_str()
    );

    let mut state = GameState::new(seed, settings);
    let stats = run(&mut state, ticks);

    log::info!(
        "Session over after {} ticks: level {}, score {}, health {}/{}",
        state.time_ticks,
        state.level,
        state.score,
        state.tank.health,
        state.tank.max_health
    );
    log::info!(
        "{} shots, {} kills, {} boundary hits, {} hits taken, {} power-ups",
        stats.shots,
        stats.kills,
        stats.boundary_hits,
        stats.tank_hits,
        stats.power_ups
    );

    if dump {
        match serde_json::to_string_pretty(&state) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize game state: {}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; there is no browser front end
}

fn run(state: &mut GameState, ticks: u64) -> SessionStats {
    let mut stats = SessionStats::default();

    for _ in 0..ticks {
        let input = autopilot(state);
        tick(state, &input);

        for event in &state.events {
            match event {
                GameEvent::ShotFired { .. } => stats.shots += 1,
                GameEvent::BoundaryHit { .. } => stats.boundary_hits += 1,
                GameEvent::TankHit { .. } => stats.tank_hits += 1,
                GameEvent::TargetDestroyed { .. } => stats.kills += 1,
                GameEvent::PowerUpCollected { .. } => stats.power_ups += 1,
                GameEvent::LevelUp { level } => log::info!("Reached level {}", level),
                GameEvent::PowerUpUsed { .. } | GameEvent::GameOver { .. } => {}
            }
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    stats
}

/// Steer toward a point ahead on the centre line and shoot the nearest target
fn autopilot(state: &GameState) -> TickInput {
    let tank = &state.tank;

    let closest = state
        .track
        .find_closest_point_on_curve(tank.position, CurveSide::Left);
    let t = closest.parameter.unwrap_or(0.0);
    let ahead = state.track.point_between((t + LOOKAHEAD).rem_euclid(1.0), 0.5);

    let to_ahead = ahead - tank.position;
    let heading = to_ahead.y.atan2(to_ahead.x);
    let turn = shortest_angle_delta(tank.base_angle, heading);

    let nearest = state
        .targets
        .iter()
        .filter(|t| t.active)
        .map(|t| t.position)
        .min_by(|a, b| {
            a.distance_squared(tank.position)
                .total_cmp(&b.distance_squared(tank.position))
        });

    let (aim, fire) = match nearest {
        Some(target) if target.distance(tank.position) <= FIRE_RANGE => {
            let bearing = direction_from_angle(tank.turret_angle);
            let to_target = (target - tank.position).normalize_or_zero();
            (target, bearing.angle_to(to_target).abs() <= FIRE_CONE)
        }
        Some(target) => (target, false),
        None => (ahead, false),
    };

    TickInput {
        rotate_left: turn < -tank.rotation_rate,
        rotate_right: turn > tank.rotation_rate,
        aim,
        fire,
        use_power_up: state.stored_power_up.is_some(),
        ..Default::default()
    }
}
