//! Per-frame simulation step
//!
//! Advances the game by one variable-length frame. The whole rules engine
//! lives here: the invader march, ship contact and life loss, projectile
//! flight, hits and scoring, and level progression.

use super::collision::{first_ship_contact, invader_reaches_ship, remove_flagged, resolve_hits};
use super::entity::{Direction, Movement};
use super::state::{GameEvent, GamePhase, GameState, Invader, Ship};

/// Commands collected since the previous frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Ship steps, applied in order
    pub steps: Vec<Direction>,
    /// Fire a projectile (already rate-limited by the input mapper)
    pub fire: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && !self.fire
    }
}

/// Advance the game state by `dt` seconds
///
/// Returns what happened during the frame. Once the game is over this is a
/// no-op that returns no events.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.phase == GamePhase::GameOver {
        return events;
    }
    state.time_ticks += 1;

    apply_input(state, input, &mut events);

    if let Some(index) = march(&mut state.invaders, &state.ship, dt) {
        log::debug!("Invader {} reached the ship", index);
        lose_life(state, &mut events);
        return events;
    }

    for projectile in &mut state.projectiles {
        projectile.update(dt);
    }
    state.projectiles.retain(|p| !p.is_off_screen());

    let hits = resolve_hits(&state.projectiles, &state.invaders);
    if !hits.is_empty() {
        remove_flagged(&mut state.projectiles, &hits.spent);
        remove_flagged(&mut state.invaders, &hits.destroyed);
        state.score += u64::from(hits.kills) * state.config.score_per_kill;
        events.extend((0..hits.kills).map(|_| GameEvent::InvaderDestroyed));
    }

    if state.invaders.is_empty() {
        state.level = state.level.saturating_add(1);
        log::info!("Wave cleared, advancing to level {}", state.level);
        state.regenerate_wave();
        events.push(GameEvent::LevelCleared { level: state.level });
    }

    events
}

fn apply_input(state: &mut GameState, input: &TickInput, events: &mut Vec<GameEvent>) {
    for &direction in &input.steps {
        state.ship.step(direction);
    }
    if input.fire {
        state.spawn_projectile();
        events.push(GameEvent::ShotFired);
    }
}

/// Move the wave sideways; reverse and drop it as one when any member hits
/// the wall it is heading for
///
/// Returns the index of the first invader to reach the ship. Invaders after
/// it in collection order are left where they were.
fn march(invaders: &mut [Invader], ship: &Ship, dt: f32) -> Option<usize> {
    for (index, invader) in invaders.iter_mut().enumerate() {
        invader.update(dt);
        if invader_reaches_ship(invader, ship) {
            return Some(index);
        }
    }

    if !invaders.iter().any(Invader::at_edge) {
        return None;
    }

    // Pull everyone back by the worst overshoot so the grid keeps its spacing
    let overshoot = invaders
        .iter()
        .map(Invader::overshoot)
        .fold(0.0f32, f32::max);
    for invader in invaders.iter_mut() {
        invader.body.pos.x -= invader.direction().sign() * overshoot;
        invader.reverse();
        invader.drop_row();
    }
    first_ship_contact(invaders, ship)
}

fn lose_life(state: &mut GameState, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::ShipHit);

    if state.lives <= 1 {
        state.lives = 0;
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over at level {} with score {}",
            state.level,
            state.score
        );
        events.push(GameEvent::GameOver);
        return;
    }

    state.lives -= 1;
    log::info!("Ship hit, {} lives left", state.lives);
    state.reset_ship();
    state.projectiles.clear();
    state.regenerate_wave();
}
