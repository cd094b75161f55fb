//! Player interaction: click-to-pop and drag-into-zone
//!
//! Every handler degrades to a no-op when the mode, pause state or entity
//! lookup doesn't line up. A bubble can disappear between a pointer-down
//! and the matching pointer-up, and that's not an error.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameState, Mode};
use super::store::{Bubble, ColorZone};
use crate::tuning::ZoneTuning;
use crate::within_band;

/// Drag lifecycle in Move mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragState {
    #[default]
    Idle,
    /// Holding the bubble with this id
    Dragging(u32),
}

/// Result of ending a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// No drag was in progress
    Ignored,
    /// Bubble let go where it is (no match or already gone)
    Released,
    /// Bubble dropped on its color; both entities removed
    Matched { zone_id: u32, points: u64 },
}

/// Pop a bubble in Click mode. Returns the points awarded.
pub fn on_activate(state: &mut GameState, bubble_id: u32) -> Option<u64> {
    if !state.phase.is_playing(Mode::Click) {
        return None;
    }
    let size = state.store.bubble(bubble_id)?.size;

    let points = state.tuning.scoring.points_for_size(size);
    state.award(points);
    state.store.remove_bubble(bubble_id);
    log::debug!("Popped bubble {} (+{})", bubble_id, points);
    Some(points)
}

/// Pick up a bubble in Move mode
pub fn begin_drag(state: &mut GameState, bubble_id: u32) -> bool {
    if !state.phase.is_playing(Mode::Move) || state.store.bubble(bubble_id).is_none() {
        return false;
    }
    state.drag = DragState::Dragging(bubble_id);
    true
}

/// Center the held bubble on the pointer
pub fn update_drag(state: &mut GameState, pointer: Vec2) -> bool {
    let DragState::Dragging(id) = state.drag else {
        return false;
    };
    if state.is_paused() {
        return false;
    }
    match state.store.bubble_mut(id) {
        Some(bubble) => {
            bubble.pos = pointer - Vec2::splat(bubble.size / 2.0);
            true
        }
        None => false,
    }
}

/// Drop the held bubble, scoring it if it lands on its color zone.
///
/// Pausing mid-drag only freezes the bubble; the drop is still resolved.
pub fn end_drag(state: &mut GameState) -> DropOutcome {
    let DragState::Dragging(id) = state.drag else {
        return DropOutcome::Ignored;
    };
    state.drag = DragState::Idle;

    let Some(bubble) = state.store.bubble(id) else {
        return DropOutcome::Released;
    };
    let Some(zone_id) = find_matching_zone(
        bubble,
        state.store.zones(),
        state.viewport.x,
        &state.tuning.zone,
    ) else {
        return DropOutcome::Released;
    };

    let points = state.tuning.scoring.points_for_size(bubble.size);
    state.award(points);
    state.store.remove_bubble(id);
    state.store.remove_zone(zone_id);
    log::debug!("Bubble {} matched zone {} (+{})", id, zone_id, points);
    DropOutcome::Matched { zone_id, points }
}

/// First zone (lowest id) whose slack-padded band contains the bubble's
/// position and whose color is exactly the bubble's.
pub fn find_matching_zone(
    bubble: &Bubble,
    zones: &[ColorZone],
    viewport_width: f32,
    cfg: &ZoneTuning,
) -> Option<u32> {
    zones
        .iter()
        .filter(|zone| zone.color == bubble.color)
        .filter(|zone| {
            let zone_x = zone.side.zone_x(viewport_width, cfg.width);
            within_band(bubble.pos.x, zone_x, cfg.width, cfg.match_slack)
                && within_band(bubble.pos.y, zone.y, cfg.height, cfg.match_slack)
        })
        .min_by_key(|zone| zone.id)
        .map(|zone| zone.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::attributes::{BubbleAttributes, Color, ZoneSide};
    use crate::tuning::Tuning;

    const RED: Color = Color {
        hue: 0,
        saturation: 80.0,
        lightness: 60.0,
    };
    const BLUE: Color = Color {
        hue: 220,
        saturation: 80.0,
        lightness: 60.0,
    };

    /// A session with an empty store so tests control every entity
    fn session(mode: Mode) -> GameState {
        let mut tuning = Tuning::default();
        tuning.spawn.initial_bubbles_on_home = 0;
        let mut state = GameState::new(42, tuning, Vec2::new(800.0, 600.0));
        state.start_session(mode);
        state
    }

    fn add_bubble(state: &mut GameState, size: f32, color: Color, pos: Vec2) -> u32 {
        state.store.insert_bubble(BubbleAttributes {
            pos,
            size,
            color,
            speed: 4.0,
            drift: 0.0,
        })
    }

    /// Zone owned by a parked bubble of the same color, so the dragged
    /// bubble has no zone of its own
    fn add_zone(state: &mut GameState, color: Color, side: ZoneSide, y: f32) -> u32 {
        let owner = add_bubble(state, 30.0, color, Vec2::new(400.0, 900.0));
        state.store.insert_zone(owner, side, y).unwrap()
    }

    #[test]
    fn test_click_scores_and_removes() {
        let mut state = session(Mode::Click);
        let id = add_bubble(&mut state, 85.0, RED, Vec2::new(100.0, 100.0));

        assert_eq!(on_activate(&mut state, id), Some(50));
        assert_eq!(state.score, 50);
        assert!(state.store.bubble(id).is_none());

        // Already gone: no-op
        assert_eq!(on_activate(&mut state, id), None);
        assert_eq!(state.score, 50);
    }

    #[test]
    fn test_click_ignored_outside_click_mode_or_paused() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 85.0, RED, Vec2::new(100.0, 100.0));
        assert_eq!(on_activate(&mut state, id), None);

        let mut state = session(Mode::Click);
        let id = add_bubble(&mut state, 85.0, RED, Vec2::new(100.0, 100.0));
        state.toggle_pause();
        assert_eq!(on_activate(&mut state, id), None);
        assert!(state.store.bubble(id).is_some());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_drag_into_matching_zone() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        let zone_id = add_zone(&mut state, RED, ZoneSide::Left, 200.0);

        assert!(begin_drag(&mut state, id));
        assert!(update_drag(&mut state, Vec2::new(50.0, 250.0)));
        let bubble = state.store.bubble(id).unwrap();
        assert_eq!(bubble.pos, Vec2::new(27.5, 227.5));

        assert_eq!(
            end_drag(&mut state),
            DropOutcome::Matched { zone_id, points: 20 }
        );
        assert_eq!(state.score, 20);
        assert!(state.store.bubble(id).is_none());
        assert!(state.store.zone(zone_id).is_none());
        assert_eq!(state.drag, DragState::Idle);
    }

    #[test]
    fn test_drag_wrong_color_keeps_everything() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        let zone_id = add_zone(&mut state, BLUE, ZoneSide::Left, 200.0);

        begin_drag(&mut state, id);
        update_drag(&mut state, Vec2::new(50.0, 250.0));
        assert_eq!(end_drag(&mut state), DropOutcome::Released);

        assert_eq!(state.score, 0);
        assert_eq!(state.store.bubble(id).unwrap().pos, Vec2::new(27.5, 227.5));
        assert!(state.store.zone(zone_id).is_some());
        assert_eq!(state.drag, DragState::Idle);
    }

    #[test]
    fn test_right_zone_band_uses_viewport_width() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        let zone_id = add_zone(&mut state, RED, ZoneSide::Right, 100.0);

        begin_drag(&mut state, id);
        // Right zone spans x 700..800; slack reaches down to 660
        update_drag(&mut state, Vec2::new(690.0, 150.0));
        assert_eq!(
            end_drag(&mut state),
            DropOutcome::Matched { zone_id, points: 20 }
        );
    }

    #[test]
    fn test_first_matching_zone_is_lowest_id() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 65.0, RED, Vec2::new(400.0, 300.0));
        let first = add_zone(&mut state, RED, ZoneSide::Left, 200.0);
        let second = add_zone(&mut state, RED, ZoneSide::Left, 210.0);
        assert!(first < second);

        begin_drag(&mut state, id);
        update_drag(&mut state, Vec2::new(50.0, 250.0));
        assert_eq!(
            end_drag(&mut state),
            DropOutcome::Matched { zone_id: first, points: 30 }
        );
        assert!(state.store.zone(second).is_some());
    }

    #[test]
    fn test_end_drag_is_idempotent() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        begin_drag(&mut state, id);
        assert_eq!(end_drag(&mut state), DropOutcome::Released);

        let bubbles = state.store.bubbles().to_vec();
        assert_eq!(end_drag(&mut state), DropOutcome::Ignored);
        assert_eq!(state.store.bubbles(), &bubbles[..]);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_begin_drag_requires_unpaused_move() {
        let mut state = session(Mode::Click);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        assert!(!begin_drag(&mut state, id));

        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        state.toggle_pause();
        assert!(!begin_drag(&mut state, id));
        assert_eq!(state.drag, DragState::Idle);
        assert!(!begin_drag(&mut state, 9999));
    }

    #[test]
    fn test_pause_mid_drag_freezes_bubble() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        let zone_id = add_zone(&mut state, RED, ZoneSide::Left, 200.0);

        begin_drag(&mut state, id);
        state.toggle_pause();
        assert!(!update_drag(&mut state, Vec2::new(50.0, 250.0)));
        assert_eq!(state.store.bubble(id).unwrap().pos, Vec2::new(400.0, 300.0));

        // Dropped away from the zone: released in place
        assert_eq!(end_drag(&mut state), DropOutcome::Released);
        assert_eq!(state.drag, DragState::Idle);
        assert!(state.store.zone(zone_id).is_some());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_drop_on_zone_after_auto_pause_still_scores() {
        let mut state = session(Mode::Move);
        let id = add_bubble(&mut state, 45.0, RED, Vec2::new(400.0, 300.0));
        let zone_id = add_zone(&mut state, RED, ZoneSide::Left, 200.0);

        begin_drag(&mut state, id);
        update_drag(&mut state, Vec2::new(50.0, 250.0));
        assert!(state.auto_pause());

        assert_eq!(
            end_drag(&mut state),
            DropOutcome::Matched { zone_id, points: 20 }
        );
        assert_eq!(state.score, 20);
        assert!(state.store.bubble(id).is_none());
        assert!(state.store.zone(zone_id).is_none());
        assert_eq!(state.drag, DragState::Idle);
    }

    #[test]
    fn test_update_drag_idle_is_noop() {
        let mut state = session(Mode::Move);
        assert!(!update_drag(&mut state, Vec2::new(1.0, 1.0)));
    }
}
