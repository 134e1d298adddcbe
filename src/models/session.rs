use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::game::GradeResponse;
use crate::game::{BoardConfig, GameSession, LeaderboardEntry};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub winner: Option<String>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl SessionView {
    pub fn new(session: &GameSession, board: &BoardConfig) -> Self {
        Self {
            session_id: session.session_id,
            created_at: session.created_at,
            winner: session.winner().map(str::to_string),
            leaderboard: session.leaderboard(board),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnswerRequest {
    pub question_id: String,
    pub user_name: String,
    pub user_answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnswerResponse {
    #[serde(flatten)]
    pub grade: GradeResponse,
    pub player: String,
    /// True when this answer made `player` the winner of the session
    pub new_winner: bool,
    pub session: SessionView,
}
