//! Data-driven game balance
//!
//! Every gameplay constant lives here so a host page can override any of
//! them with a JSON document. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

/// Spawn driver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Bubbles created per spawn firing
    pub batch_size: u32,
    /// Spawn period at difficulty 0 (ms)
    pub base_interval_ms: f32,
    /// Period reduction per difficulty unit (ms)
    pub interval_decrease_per_difficulty: f32,
    /// Spawn period floor (ms)
    pub min_interval_ms: f32,
    /// One-time population of the home screen
    pub initial_bubbles_on_home: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            batch_size: 4,
            base_interval_ms: 2000.0,
            interval_decrease_per_difficulty: 200.0,
            min_interval_ms: 1000.0,
            initial_bubbles_on_home: 15,
        }
    }
}

impl SpawnTuning {
    /// Spawn period for a difficulty level, floored at `min_interval_ms`
    pub fn interval_ms(&self, difficulty: f32) -> u64 {
        let interval = (self.base_interval_ms - difficulty * self.interval_decrease_per_difficulty)
            .max(self.min_interval_ms);
        (interval.round() as u64).max(1)
    }
}

/// Motion driver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Motion step period (ms), ~60 steps per second
    pub frame_interval_ms: u64,
    pub vertical_speed_multiplier: f32,
    pub horizontal_drift_multiplier: f32,
    /// Motion steps allowed per host update before the timer is resynced
    pub max_catch_up_steps: u32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            vertical_speed_multiplier: 0.35,
            horizontal_drift_multiplier: 0.005,
            max_catch_up_steps: 8,
        }
    }
}

/// Bubble attribute ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleTuning {
    pub min_size: f32,
    pub max_size: f32,
    pub base_speed_min: f32,
    pub base_speed_max: f32,
    /// Full width of the drift range, centered on zero
    pub drift_range: f32,
}

impl Default for BubbleTuning {
    fn default() -> Self {
        Self {
            min_size: 30.0,
            max_size: 90.0,
            base_speed_min: 3.0,
            base_speed_max: 5.0,
            drift_range: 100.0,
        }
    }
}

/// Color bands (percent) for generated bubble colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTuning {
    pub saturation_min: f32,
    pub saturation_max: f32,
    pub lightness_min: f32,
    pub lightness_max: f32,
}

impl Default for ColorTuning {
    fn default() -> Self {
        Self {
            saturation_min: 70.0,
            saturation_max: 90.0,
            lightness_min: 55.0,
            lightness_max: 70.0,
        }
    }
}

/// Color zone geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTuning {
    pub width: f32,
    pub height: f32,
    /// Minimum gap between zones on the same side
    pub vertical_gap: f32,
    /// Keep zones this far from the top and bottom edges
    pub y_padding: f32,
    /// Extra tolerance around a zone when testing a drop
    pub match_slack: f32,
    /// Random draws before an overlapping placement is accepted
    pub placement_attempts: u32,
}

impl Default for ZoneTuning {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            vertical_gap: 20.0,
            y_padding: 50.0,
            match_slack: 40.0,
            placement_attempts: 20,
        }
    }
}

/// Difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Difficulty driver period (ms)
    pub ramp_interval_ms: u64,
    /// Session seconds per difficulty step
    pub step_secs: f32,
    /// Difficulty added per step
    pub step_increase: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            ramp_interval_ms: 5000,
            step_secs: 15.0,
            step_increase: 0.3,
        }
    }
}

impl DifficultyTuning {
    /// Difficulty as a step function of elapsed session time
    pub fn difficulty_at(&self, elapsed_ms: u64) -> f32 {
        let elapsed_secs = elapsed_ms as f32 / 1000.0;
        1.0 + (elapsed_secs / self.step_secs).floor() * self.step_increase
    }
}

/// Size-to-points step function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// (minimum size, points), checked from the first entry down
    pub tiers: Vec<(f32, u64)>,
    /// Points for bubbles below every tier
    pub base_points: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            tiers: vec![(80.0, 50), (60.0, 30), (40.0, 20)],
            base_points: 10,
        }
    }
}

impl ScoringTuning {
    /// Points awarded for popping or matching a bubble of this size
    pub fn points_for_size(&self, size: f32) -> u64 {
        self.tiers
            .iter()
            .find(|(min_size, _)| size >= *min_size)
            .map(|(_, points)| *points)
            .unwrap_or(self.base_points)
    }
}

/// Complete game balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub spawn: SpawnTuning,
    pub movement: MovementTuning,
    pub bubble: BubbleTuning,
    pub color: ColorTuning,
    pub zone: ZoneTuning,
    pub difficulty: DifficultyTuning,
    pub scoring: ScoringTuning,
}

impl Tuning {
    /// Parse tuning from JSON, then repair out-of-range values
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate();
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Fix values the simulation cannot run with. Returns the number of fixes.
    pub fn validate(&mut self) -> usize {
        let mut fixes = 0;

        if swap_if_reversed(&mut self.bubble.min_size, &mut self.bubble.max_size) {
            log::warn!("bubble.min_size > bubble.max_size, swapped");
            fixes += 1;
        }
        if swap_if_reversed(
            &mut self.bubble.base_speed_min,
            &mut self.bubble.base_speed_max,
        ) {
            log::warn!("bubble.base_speed_min > bubble.base_speed_max, swapped");
            fixes += 1;
        }
        if swap_if_reversed(
            &mut self.color.saturation_min,
            &mut self.color.saturation_max,
        ) {
            log::warn!("color saturation band reversed, swapped");
            fixes += 1;
        }
        if swap_if_reversed(&mut self.color.lightness_min, &mut self.color.lightness_max) {
            log::warn!("color lightness band reversed, swapped");
            fixes += 1;
        }
        if self.bubble.drift_range < 0.0 {
            log::warn!("bubble.drift_range negative, using its magnitude");
            self.bubble.drift_range = -self.bubble.drift_range;
            fixes += 1;
        }
        if self.movement.frame_interval_ms == 0 {
            log::warn!("movement.frame_interval_ms is 0, raised to 1");
            self.movement.frame_interval_ms = 1;
            fixes += 1;
        }
        if self.movement.max_catch_up_steps == 0 {
            log::warn!("movement.max_catch_up_steps is 0, raised to 1");
            self.movement.max_catch_up_steps = 1;
            fixes += 1;
        }
        if self.difficulty.ramp_interval_ms == 0 {
            log::warn!("difficulty.ramp_interval_ms is 0, raised to 1");
            self.difficulty.ramp_interval_ms = 1;
            fixes += 1;
        }
        if self.difficulty.step_secs <= 0.0 {
            log::warn!("difficulty.step_secs must be positive, reset to default");
            self.difficulty.step_secs = DifficultyTuning::default().step_secs;
            fixes += 1;
        }
        if self.spawn.min_interval_ms < 1.0 {
            log::warn!("spawn.min_interval_ms below 1 ms, raised to 1");
            self.spawn.min_interval_ms = 1.0;
            fixes += 1;
        }
        if self.zone.placement_attempts == 0 {
            log::warn!("zone.placement_attempts is 0, raised to 1");
            self.zone.placement_attempts = 1;
            fixes += 1;
        }

        // Tiers are checked in order, so the largest threshold must come first
        self.scoring
            .tiers
            .sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        fixes
    }
}

fn swap_if_reversed(min: &mut f32, max: &mut f32) -> bool {
    if *min > *max {
        std::mem::swap(min, max);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_for_size() {
        let scoring = ScoringTuning::default();
        assert_eq!(scoring.points_for_size(85.0), 50);
        assert_eq!(scoring.points_for_size(80.0), 50);
        assert_eq!(scoring.points_for_size(79.9), 30);
        assert_eq!(scoring.points_for_size(60.0), 30);
        assert_eq!(scoring.points_for_size(45.0), 20);
        assert_eq!(scoring.points_for_size(39.0), 10);
        assert_eq!(scoring.points_for_size(30.0), 10);
    }

    #[test]
    fn test_spawn_interval() {
        let spawn = SpawnTuning::default();
        assert_eq!(spawn.interval_ms(1.0), 1800);
        assert_eq!(spawn.interval_ms(1.6), 1680);
        // Floor kicks in at difficulty 5
        assert_eq!(spawn.interval_ms(5.0), 1000);
        assert_eq!(spawn.interval_ms(9.1), 1000);
    }

    #[test]
    fn test_difficulty_steps() {
        let ramp = DifficultyTuning::default();
        assert!((ramp.difficulty_at(0) - 1.0).abs() < 0.0001);
        assert!((ramp.difficulty_at(14_999) - 1.0).abs() < 0.0001);
        assert!((ramp.difficulty_at(15_000) - 1.3).abs() < 0.0001);
        assert!((ramp.difficulty_at(30_000) - 1.6).abs() < 0.0001);
        assert!((ramp.difficulty_at(59_000) - 1.9).abs() < 0.0001);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "spawn": { "batch_size": 7 } }"#).unwrap();
        assert_eq!(tuning.spawn.batch_size, 7);
        assert_eq!(tuning.spawn.min_interval_ms, 1000.0);
        assert_eq!(tuning.zone, ZoneTuning::default());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Tuning::from_json("{ spawn: ").is_err());
    }

    #[test]
    fn test_validate_repairs() {
        let mut tuning = Tuning::default();
        tuning.bubble.min_size = 90.0;
        tuning.bubble.max_size = 30.0;
        tuning.movement.frame_interval_ms = 0;
        tuning.scoring.tiers = vec![(40.0, 20), (80.0, 50)];

        assert_eq!(tuning.validate(), 2);
        assert_eq!(tuning.bubble.min_size, 30.0);
        assert_eq!(tuning.movement.frame_interval_ms, 1);
        assert_eq!(tuning.scoring.points_for_size(85.0), 50);
        assert_eq!(Tuning::default().validate(), 0);
    }

    #[test]
    fn test_json_roundtrip_default() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }
}
