use serde::{Deserialize, Serialize};

use crate::{
    game::{BoardTile, ScoringResult, TileEffect},
    questions::{GroupSummary, Question},
};

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinGroupRequest {
    #[serde(default)]
    pub exclude_groups: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpinGroupResponse {
    pub group: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinQuestionRequest {
    pub group: String,
    #[serde(default)]
    pub exclude_question_ids: Option<Vec<String>>,
}

/// Question as shown to players; the standard answer stays server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: String,
    pub group: String,
    pub prompt: String,
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            group: question.group.clone(),
            prompt: question.prompt.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub question_id: String,
    pub user_name: Option<String>,
    pub user_answer: String,
    /// Signed so negative scores can be rejected with a clear message
    #[serde(default)]
    pub current_score: i64,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    /// Points awarded by the grader for this answer
    pub score: u32,
    pub feedback: String,
    pub question: QuestionResponse,
    pub scoreboard: ScoringResult,
}

#[derive(Debug, Serialize)]
pub struct SpecialTileInfo {
    pub position: u32,
    pub effect: TileEffect,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub winning_score: u32,
    pub special_tiles: Vec<SpecialTileInfo>,
    pub tiles: Vec<BoardTile>,
}
