//! Bubble Pop - rising-bubble arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, drivers, interaction, session)
//! - `platform`: Presentation adapter boundary (snapshots in, input out)
//! - `tuning`: Data-driven game balance

pub mod platform;
pub mod sim;
pub mod tuning;

pub use platform::Snapshot;
pub use sim::{GameState, Input, Mode, Phase};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Seed used when the host doesn't provide one
    pub const DEFAULT_SEED: u64 = 0x00B0_BB1E;

    /// Viewport used before the host reports its real size
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;
}

/// True when `value` lies in `[start - slack, start + extent + slack]`
#[inline]
pub fn within_band(value: f32, start: f32, extent: f32, slack: f32) -> bool {
    value >= start - slack && value <= start + extent + slack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_band_edges() {
        assert!(within_band(-40.0, 0.0, 100.0, 40.0));
        assert!(within_band(140.0, 0.0, 100.0, 40.0));
        assert!(!within_band(140.1, 0.0, 100.0, 40.0));
        assert!(!within_band(-40.1, 0.0, 100.0, 40.0));
    }
}
