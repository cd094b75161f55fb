//! Entity store: live bubbles, color zones and their id sequences
//!
//! Both collections stay sorted by id (ids are minted in increasing order and
//! only ever appended), which gives every pass a stable iteration order.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::attributes::{
    BubbleAttributes, Color, ZoneSide, generate_bubble_attributes, place_zone, random_side,
};
use crate::tuning::{MovementTuning, Tuning};

/// Monotonic id source. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdSequence {
    next: u32,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A rising, drifting bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    /// Top-left corner in screen space (y grows downward)
    pub pos: Vec2,
    /// Diameter
    pub size: f32,
    pub color: Color,
    /// Vertical speed, already scaled by the difficulty at spawn time
    pub speed: f32,
    /// Signed horizontal bias
    pub drift: f32,
}

impl Bubble {
    fn from_attributes(id: u32, attrs: BubbleAttributes) -> Self {
        Self {
            id,
            pos: attrs.pos,
            size: attrs.size,
            color: attrs.color,
            speed: attrs.speed,
            drift: attrs.drift,
        }
    }

    /// Apply one motion step
    pub fn step(&mut self, movement: &MovementTuning) {
        self.pos.y -= self.speed * movement.vertical_speed_multiplier;
        self.pos.x += self.drift * movement.horizontal_drift_multiplier;
    }

    /// Fully past the top edge
    pub fn is_off_screen(&self) -> bool {
        self.pos.y < -self.size
    }
}

/// A screen-edge drop target for one bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorZone {
    pub id: u32,
    pub color: Color,
    pub side: ZoneSide,
    /// Top edge
    pub y: f32,
    /// Bubble this zone accepts (lookup key, not ownership)
    pub bubble_id: u32,
}

/// Owner of every live entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    bubbles: Vec<Bubble>,
    zones: Vec<ColorZone>,
    bubble_ids: IdSequence,
    zone_ids: IdSequence,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn zones(&self) -> &[ColorZone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn bubble(&self, id: u32) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub fn bubble_mut(&mut self, id: u32) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }

    pub fn zone(&self, id: u32) -> Option<&ColorZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Add a bubble with pre-drawn attributes, returning its id
    pub fn insert_bubble(&mut self, attrs: BubbleAttributes) -> u32 {
        let id = self.bubble_ids.next_id();
        self.bubbles.push(Bubble::from_attributes(id, attrs));
        id
    }

    /// Spawn `count` random bubbles at the given difficulty
    pub fn spawn_bubbles<R: Rng + ?Sized>(
        &mut self,
        count: u32,
        rng: &mut R,
        tuning: &Tuning,
        difficulty: f32,
        viewport: Vec2,
    ) -> Vec<u32> {
        (0..count)
            .map(|_| {
                let attrs = generate_bubble_attributes(rng, tuning, difficulty, viewport);
                self.insert_bubble(attrs)
            })
            .collect()
    }

    /// Remove a bubble and every zone pointing at it
    pub fn remove_bubble(&mut self, id: u32) -> Option<Bubble> {
        let index = self.bubbles.iter().position(|b| b.id == id)?;
        let bubble = self.bubbles.remove(index);
        self.zones.retain(|z| z.bubble_id != id);
        Some(bubble)
    }

    /// One motion tick.
    ///
    /// Moves every bubble except `held`, then prunes the ones that left the
    /// top of the screen along with their zones. Returns the pruned ids.
    pub fn advance(&mut self, held: Option<u32>, movement: &MovementTuning) -> Vec<u32> {
        let mut pruned = Vec::new();
        self.bubbles.retain_mut(|bubble| {
            if Some(bubble.id) == held {
                return true;
            }
            bubble.step(movement);
            if bubble.is_off_screen() {
                pruned.push(bubble.id);
                false
            } else {
                true
            }
        });

        if !pruned.is_empty() {
            self.remove_zones_for_bubbles(&pruned);
        }
        pruned
    }

    /// Create one zone per live bubble in `bubble_ids`; unknown ids are skipped
    pub fn spawn_zones_for<R: Rng + ?Sized>(
        &mut self,
        bubble_ids: &[u32],
        rng: &mut R,
        tuning: &Tuning,
        viewport: Vec2,
    ) -> Vec<u32> {
        let mut created = Vec::with_capacity(bubble_ids.len());
        for &bubble_id in bubble_ids {
            if self.bubble(bubble_id).is_none() {
                continue;
            }
            let side = random_side(rng);
            let occupied: Vec<f32> = self
                .zones
                .iter()
                .filter(|z| z.side == side)
                .map(|z| z.y)
                .collect();
            let y = place_zone(rng, &tuning.zone, &occupied, viewport.y);
            created.extend(self.insert_zone(bubble_id, side, y));
        }
        created
    }

    /// Add a zone at a fixed placement, taking its color from the bubble.
    /// `None` when the bubble is not live.
    pub fn insert_zone(&mut self, bubble_id: u32, side: ZoneSide, y: f32) -> Option<u32> {
        let color = self.bubble(bubble_id)?.color;
        let id = self.zone_ids.next_id();
        self.zones.push(ColorZone {
            id,
            color,
            side,
            y,
            bubble_id,
        });
        Some(id)
    }

    pub fn remove_zone(&mut self, id: u32) -> Option<ColorZone> {
        let index = self.zones.iter().position(|z| z.id == id)?;
        Some(self.zones.remove(index))
    }

    pub fn remove_zones_for_bubbles(&mut self, bubble_ids: &[u32]) {
        self.zones.retain(|z| !bubble_ids.contains(&z.bubble_id));
    }

    pub fn clear_zones(&mut self) {
        self.zones.clear();
    }

    /// Every zone refers to a live bubble
    pub fn zones_consistent(&self) -> bool {
        self.zones.iter().all(|z| self.bubble(z.bubble_id).is_some())
    }
}
