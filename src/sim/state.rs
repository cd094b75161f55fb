//! Game state and the session/mode state machine
//!
//! Everything the simulation mutates lives in [`GameState`]; drivers and
//! input handlers take it by `&mut`, so no callback closes over shared state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{Driver, SimClock};
use super::interaction::DragState;
use super::store::EntityStore;
use crate::tuning::Tuning;

/// How the player scores in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Pop bubbles by clicking them
    Click,
    /// Drag bubbles into the zone of the same color
    Move,
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Idle home screen, no session
    Home,
    /// Home screen with the mode picker open
    ModeSelect,
    /// A session is running
    Active { mode: Mode, paused: bool },
}

impl Phase {
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Phase::Active { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Phase::Active { paused: true, .. })
    }

    /// Active in `mode` and not paused
    pub fn is_playing(&self, mode: Mode) -> bool {
        *self == Phase::Active { mode, paused: false }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Viewport size in screen units
    pub viewport: Vec2,
    pub(crate) rng: Pcg32,
    pub store: EntityStore,
    pub clock: SimClock,
    pub phase: Phase,
    /// Session score, never decreases while a session runs
    pub score: u64,
    /// Current difficulty, >= 1
    pub difficulty: f32,
    /// Clock time the current session started at
    pub session_start_ms: u64,
    pub drag: DragState,
    /// Display-only theme flag
    pub is_dark: bool,
    home_seeded: bool,
}

impl GameState {
    /// Create a game on the home screen, seeded with its initial bubbles
    pub fn new(seed: u64, tuning: Tuning, viewport: Vec2) -> Self {
        let clock = SimClock::new(
            tuning.spawn.interval_ms(1.0),
            tuning.movement.frame_interval_ms,
            tuning.difficulty.ramp_interval_ms,
        );
        let mut state = Self {
            seed,
            tuning,
            viewport,
            rng: Pcg32::seed_from_u64(seed),
            store: EntityStore::new(),
            clock,
            phase: Phase::Home,
            score: 0,
            difficulty: 1.0,
            session_start_ms: 0,
            drag: DragState::Idle,
            is_dark: false,
            home_seeded: false,
        };

        state.seed_home_population();
        state
    }

    /// Populate the home screen once, if it is empty and no session runs.
    /// Returns the number of bubbles created.
    pub fn seed_home_population(&mut self) -> usize {
        if self.home_seeded || self.phase.is_active() || !self.store.is_empty() {
            return 0;
        }
        self.home_seeded = true;

        let count = self.tuning.spawn.initial_bubbles_on_home;
        let ids = self
            .store
            .spawn_bubbles(count, &mut self.rng, &self.tuning, 1.0, self.viewport);
        log::debug!("Seeded home screen with {} bubbles", ids.len());
        ids.len()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.phase.mode()
    }

    pub fn is_paused(&self) -> bool {
        self.phase.is_paused()
    }

    /// Milliseconds since the session started (paused time included)
    pub fn session_elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.session_start_ms)
    }

    /// Bubble currently held by a drag
    pub fn held_bubble(&self) -> Option<u32> {
        match self.drag {
            DragState::Dragging(id) => Some(id),
            DragState::Idle => None,
        }
    }

    pub(crate) fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Home -> ModeSelect
    pub fn open_mode_select(&mut self) -> bool {
        if self.phase != Phase::Home {
            return false;
        }
        self.phase = Phase::ModeSelect;
        true
    }

    /// Start a session in `mode`.
    ///
    /// Existing bubbles carry over; a Move session gets one zone per bubble.
    pub fn start_session(&mut self, mode: Mode) -> bool {
        if self.phase.is_active() {
            return false;
        }

        self.phase = Phase::Active {
            mode,
            paused: false,
        };
        self.score = 0;
        self.difficulty = 1.0;
        self.drag = DragState::Idle;
        self.session_start_ms = self.clock.now_ms();

        let spawn_ms = self.tuning.spawn.interval_ms(self.difficulty);
        self.clock.restart(Driver::Spawn, spawn_ms);
        self.clock.start(Driver::Motion);
        self.clock.start(Driver::Difficulty);

        if mode == Mode::Move {
            let ids: Vec<u32> = self.store.bubbles().iter().map(|b| b.id).collect();
            self.store
                .spawn_zones_for(&ids, &mut self.rng, &self.tuning, self.viewport);
        }

        log::info!(
            "Session started: {:?} mode, {} bubbles, {} zones",
            mode,
            self.store.bubbles().len(),
            self.store.zones().len()
        );
        true
    }

    /// Leave the session (or the mode picker) and return home
    pub fn back_to_main(&mut self) -> bool {
        if self.phase == Phase::Home {
            return false;
        }
        if self.phase.is_active() {
            log::info!("Session ended with score {}", self.score);
        }

        self.clock.stop_all();
        self.store.clear_zones();
        self.phase = Phase::Home;
        self.score = 0;
        self.difficulty = 1.0;
        self.drag = DragState::Idle;
        true
    }

    /// Flip pause on an active session
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Active { paused, .. } => {
                self.set_paused(!paused);
                true
            }
            _ => false,
        }
    }

    /// Pause because focus was lost or the page was hidden. Never unpauses.
    pub fn auto_pause(&mut self) -> bool {
        if !matches!(self.phase, Phase::Active { paused: false, .. }) {
            return false;
        }
        self.set_paused(true);
        log::info!("Auto-paused");
        true
    }

    /// Motion and difficulty stop while paused; spawn keeps its schedule
    /// and skips its work.
    fn set_paused(&mut self, paused: bool) {
        let Phase::Active { mode, .. } = self.phase else {
            return;
        };
        self.phase = Phase::Active { mode, paused };

        if paused {
            self.clock.stop(Driver::Motion);
            self.clock.stop(Driver::Difficulty);
        } else {
            self.clock.start(Driver::Motion);
            self.clock.start(Driver::Difficulty);
        }
        log::debug!("Paused: {}", paused);
    }

    pub fn toggle_theme(&mut self) {
        self.is_dark = !self.is_dark;
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport.max(Vec2::ONE);
    }
}
