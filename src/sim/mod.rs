//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Millisecond clock advanced by the host, no OS timers
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod attributes;
pub mod clock;
pub mod interaction;
pub mod state;
pub mod store;
pub mod tick;

pub use attributes::{
    BubbleAttributes, Color, ZoneSide, generate_bubble_attributes, generate_color, place_zone,
    random_side,
};
pub use clock::{Driver, PeriodicTimer, SimClock};
pub use interaction::{
    DragState, DropOutcome, begin_drag, end_drag, find_matching_zone, on_activate, update_drag,
};
pub use state::{GameState, Mode, Phase};
pub use store::{Bubble, ColorZone, EntityStore, IdSequence};
pub use tick::{Input, TickReport, advance_to, apply_input};
