use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    board::{BoardCell, BoardConfig},
    scorer::ScoringResult,
};

/// One row of the scoreboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    /// Where the player's piece is drawn on the board
    pub cell: BoardCell,
}

/// In-memory score ledger for one game
#[derive(Debug)]
pub struct GameSession {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    scores: HashMap<String, u32>,
    /// First player to reach the winning tile; later finishers don't replace them
    winner: Option<String>,
    last_activity: Instant,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            scores: HashMap::new(),
            winner: None,
            last_activity: Instant::now(),
        }
    }

    /// Current score of a player, 0 for players who haven't scored yet
    pub fn score_of(&self, name: &str) -> u32 {
        self.scores.get(name).copied().unwrap_or(0)
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn player_count(&self) -> usize {
        self.scores.len()
    }

    /// Store the outcome of a scoring round for `name`.
    /// Returns true if this round made `name` the session winner.
    pub fn record(&mut self, name: &str, result: &ScoringResult) -> bool {
        self.scores.insert(name.to_string(), result.score);
        self.touch();

        if result.has_winner && self.winner.is_none() {
            self.winner = Some(name.to_string());
            return true;
        }
        false
    }

    /// Players by score descending, ties broken by name
    pub fn leaderboard(&self, board: &BoardConfig) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<(&String, &u32)> = self.scores.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (name, &score))| LeaderboardEntry {
                rank: idx + 1,
                name: name.clone(),
                score,
                cell: board.display_cell(score),
            })
            .collect()
    }

    /// Clear every score and the winner, keeping the session id
    pub fn reset(&mut self) {
        self.scores.clear();
        self.winner = None;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }
}
