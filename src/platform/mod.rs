//! Presentation adapter boundary
//!
//! The renderer never touches [`GameState`] directly. Each frame it gets a
//! read-only [`Snapshot`], and it reports pointer, focus and button events
//! back as [`crate::sim::Input`]s.

use serde::Serialize;

use crate::sim::{Bubble, ColorZone, GameState, Mode, Phase};

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: Phase,
    pub mode: Option<Mode>,
    pub paused: bool,
    pub is_dark: bool,
    pub score: u64,
    pub difficulty: f32,
    /// Bubble being dragged, drawn raised above the others
    pub held_bubble: Option<u32>,
    pub viewport: (f32, f32),
    pub zone_size: (f32, f32),
    pub bubbles: &'a [Bubble],
    /// Empty outside Move mode
    pub zones: &'a [ColorZone],
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        let zones: &'a [ColorZone] = if state.mode() == Some(Mode::Move) {
            state.store.zones()
        } else {
            &[]
        };

        Self {
            phase: state.phase,
            mode: state.mode(),
            paused: state.is_paused(),
            is_dark: state.is_dark,
            score: state.score,
            difficulty: state.difficulty,
            held_bubble: state.held_bubble(),
            viewport: (state.viewport.x, state.viewport.y),
            zone_size: (state.tuning.zone.width, state.tuning.zone.height),
            bubbles: state.store.bubbles(),
            zones,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use glam::Vec2;

    #[test]
    fn test_home_snapshot() {
        let state = GameState::new(8, Tuning::default(), Vec2::new(640.0, 480.0));
        let snapshot = Snapshot::capture(&state);
        assert_eq!(snapshot.phase, Phase::Home);
        assert_eq!(snapshot.mode, None);
        assert_eq!(snapshot.bubbles.len(), 15);
        assert!(snapshot.zones.is_empty());
        assert_eq!(snapshot.viewport, (640.0, 480.0));
    }

    #[test]
    fn test_move_snapshot_json() {
        let mut state = GameState::new(8, Tuning::default(), Vec2::new(640.0, 480.0));
        state.start_session(Mode::Move);
        state.toggle_pause();

        let snapshot = Snapshot::capture(&state);
        assert!(snapshot.paused);
        assert_eq!(snapshot.zones.len(), 15);

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["mode"], "move");
        assert_eq!(json["phase"]["phase"], "active");
        assert_eq!(json["bubbles"].as_array().unwrap().len(), 15);
        assert!(json["zones"][0]["side"].is_string());
        assert!(json["bubbles"][0]["color"]["hue"].is_number());
    }
}
