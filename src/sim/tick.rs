//! Driver firings and input routing
//!
//! The host calls [`advance_to`] once per frame with its current time and
//! forwards input through [`apply_input`]. Both take the whole state by
//! `&mut`, so driver work and input handling never interleave.

use glam::Vec2;

use super::clock::Driver;
use super::interaction::{DropOutcome, begin_drag, end_drag, on_activate, update_drag};
use super::state::{GameState, Mode, Phase};

/// Events forwarded by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Click/tap on a bubble
    Activate(u32),
    /// Pointer-down/touch-start on a bubble
    BeginDrag(u32),
    /// Global pointer-move/touch-move
    UpdateDrag(Vec2),
    /// Global pointer-up/touch-end
    EndDrag,
    /// Start text clicked on the home screen
    OpenModeSelect,
    SelectMode(Mode),
    /// Back button or "return home" in the pause dialog
    Back,
    TogglePause,
    /// Window blur or page hidden
    FocusLost,
    ToggleTheme,
    /// Viewport size changed
    Resize(Vec2),
}

/// What happened during one [`advance_to`] call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub spawned: usize,
    pub pruned: usize,
    pub motion_steps: u32,
    pub difficulty_changed: bool,
    /// Motion fell too far behind and skipped ahead
    pub motion_resynced: bool,
}

/// Run every driver firing due up to `now_ms`, in time order
pub fn advance_to(state: &mut GameState, now_ms: u64) -> TickReport {
    let mut report = TickReport::default();
    let max_motion_steps = state.tuning.movement.max_catch_up_steps.max(1);

    while let Some(driver) = state.clock.pop_due(now_ms) {
        match driver {
            Driver::Spawn => report.spawned += spawn_batch(state),
            Driver::Motion => {
                report.pruned += motion_step(state);
                report.motion_steps += 1;

                let behind = state
                    .clock
                    .timer(Driver::Motion)
                    .next_fire_ms()
                    .is_some_and(|at| at <= now_ms);
                if behind && report.motion_steps >= max_motion_steps {
                    // Drop the backlog instead of replaying it all at once
                    state.clock.timer_mut(Driver::Motion).start(now_ms);
                    report.motion_resynced = true;
                    log::debug!("Motion driver fell behind, resynced at {} ms", now_ms);
                }
            }
            Driver::Difficulty => report.difficulty_changed |= ramp_difficulty(state),
        }
    }

    state.clock.settle(now_ms);
    report
}

/// Spawn driver: one batch, plus zones in Move mode. No-op while paused.
fn spawn_batch(state: &mut GameState) -> usize {
    let Phase::Active { mode, paused: false } = state.phase else {
        return 0;
    };

    let ids = state.store.spawn_bubbles(
        state.tuning.spawn.batch_size,
        &mut state.rng,
        &state.tuning,
        state.difficulty,
        state.viewport,
    );
    if mode == Mode::Move {
        state
            .store
            .spawn_zones_for(&ids, &mut state.rng, &state.tuning, state.viewport);
    }

    log::debug!("Spawned {} bubbles at difficulty {:.1}", ids.len(), state.difficulty);
    ids.len()
}

/// Motion driver: move every bubble but the held one, prune the escaped
fn motion_step(state: &mut GameState) -> usize {
    if !state.phase.is_active() || state.is_paused() {
        return 0;
    }
    let held = state.held_bubble();
    state.store.advance(held, &state.tuning.movement).len()
}

/// Difficulty driver: recompute from session time and restart the spawn
/// driver when the level changed
fn ramp_difficulty(state: &mut GameState) -> bool {
    if !state.phase.is_active() || state.is_paused() {
        return false;
    }

    let difficulty = state
        .tuning
        .difficulty
        .difficulty_at(state.session_elapsed_ms());
    if (difficulty - state.difficulty).abs() <= f32::EPSILON {
        return false;
    }

    state.difficulty = difficulty;
    let spawn_ms = state.tuning.spawn.interval_ms(difficulty);
    state.clock.restart(Driver::Spawn, spawn_ms);
    log::info!(
        "Difficulty {:.1} after {} s, spawning every {} ms",
        difficulty,
        state.session_elapsed_ms() / 1000,
        spawn_ms
    );
    true
}

/// Route one input event. Returns true if it changed anything.
pub fn apply_input(state: &mut GameState, input: Input) -> bool {
    match input {
        Input::Activate(id) => on_activate(state, id).is_some(),
        Input::BeginDrag(id) => begin_drag(state, id),
        Input::UpdateDrag(pointer) => update_drag(state, pointer),
        Input::EndDrag => end_drag(state) != DropOutcome::Ignored,
        Input::OpenModeSelect => state.open_mode_select(),
        Input::SelectMode(mode) => state.start_session(mode),
        Input::Back => state.back_to_main(),
        Input::TogglePause => state.toggle_pause(),
        Input::FocusLost => state.auto_pause(),
        Input::ToggleTheme => {
            state.toggle_theme();
            true
        }
        Input::Resize(viewport) => {
            state.resize(viewport);
            true
        }
    }
}
