use rand::Rng;
use serde::Serialize;

use super::board::{BoardConfig, TileEffect};

/// Smallest jump a special tile can cause
pub const MIN_SPECIAL_STEPS: u32 = 1;
/// Largest jump a special tile can cause
pub const MAX_SPECIAL_STEPS: u32 = 5;

/// Source of the random jump length for special tiles
pub trait StepSource {
    /// Draw a uniform integer from `low..=high`
    fn uniform_inclusive(&mut self, low: u32, high: u32) -> u32;
}

impl<R: Rng> StepSource for R {
    fn uniform_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.random_range(low..=high)
    }
}

/// Forward or backward jump triggered by landing on a special tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialEvent {
    #[serde(rename = "type")]
    pub kind: TileEffect,
    pub steps: u32,
    pub message: String,
}

impl SpecialEvent {
    pub fn new(kind: TileEffect, steps: u32) -> Self {
        let message = match kind {
            TileEffect::Forward => format!("Forward {} steps!", steps),
            TileEffect::Backward => format!("Backward {} steps!", steps),
        };
        Self {
            kind,
            steps,
            message,
        }
    }
}

/// Outcome of a single scoring round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    /// New cumulative score (board position)
    pub score: u32,
    /// True when the new score reached the winning tile
    pub has_winner: bool,
    pub special_event: Option<SpecialEvent>,
}

/// Converts grading points into board movement. Holds only the board
/// configuration, so one engine can be shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    board: BoardConfig,
}

impl ScoringEngine {
    pub fn new(board: BoardConfig) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    /// Move a player `earned_points` tiles forward from `current_score`.
    ///
    /// Landing exactly on a special tile draws one jump length from `steps`
    /// and moves the player forward or backward by it, never below tile 0.
    /// The tile reached by the jump is not checked again, so at most one
    /// special effect applies per round.
    pub fn apply_score<S: StepSource + ?Sized>(
        &self,
        current_score: u32,
        earned_points: u32,
        steps: &mut S,
    ) -> ScoringResult {
        let base = current_score.saturating_add(earned_points);

        let (score, special_event) = match self.board.effect_at(base) {
            Some(effect) => {
                let jump = steps.uniform_inclusive(MIN_SPECIAL_STEPS, MAX_SPECIAL_STEPS);
                let moved = match effect {
                    TileEffect::Forward => base.saturating_add(jump),
                    TileEffect::Backward => base.saturating_sub(jump),
                };
                (moved, Some(SpecialEvent::new(effect, jump)))
            }
            None => (base, None),
        };

        ScoringResult {
            score,
            has_winner: self.board.is_winning(score),
            special_event,
        }
    }
}
