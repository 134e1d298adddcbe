use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    grading::Grade,
    models::{
        GradeRequest, GradeResponse, GroupsResponse, QuestionResponse, SpinGroupRequest,
        SpinGroupResponse, SpinQuestionRequest,
    },
    questions::Question,
    AppState,
};

/// List every question group on the wheel
pub async fn list_groups(State(state): State<Arc<AppState>>) -> Json<GroupsResponse> {
    Json(GroupsResponse {
        groups: state.questions.groups(),
    })
}

/// Spin the group wheel
pub async fn spin_group(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpinGroupRequest>, JsonRejection>,
) -> Result<Json<SpinGroupResponse>, ApiError> {
    let Json(payload) = payload?;
    let excluded = payload.exclude_groups.unwrap_or_default();
    let group = state.questions.random_group(&excluded, &mut rand::rng())?;

    tracing::debug!("Group wheel stopped on {}", group);
    Ok(Json(SpinGroupResponse { group }))
}

/// Spin the question wheel of a group
pub async fn spin_question(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpinQuestionRequest>, JsonRejection>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let Json(payload) = payload?;
    let excluded = payload.exclude_question_ids.unwrap_or_default();
    let question = state
        .questions
        .random_question(&payload.group, &excluded, &mut rand::rng())?;

    tracing::debug!("Question wheel stopped on {}", question.id);
    Ok(Json(QuestionResponse::from(&question)))
}

/// Grade an answer and move the caller's piece. The caller owns the score,
/// so nothing is stored server-side.
pub async fn grade_answer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<Json<GradeResponse>, ApiError> {
    let Json(payload) = payload?;
    let current_score = u32::try_from(payload.current_score).map_err(|_| {
        ApiError::InvalidInput("currentScore must be a non-negative integer.".to_string())
    })?;

    let (question, grade) =
        grade_question(&state, &payload.question_id, &payload.user_answer).await?;

    let scoreboard = state
        .engine
        .apply_score(current_score, grade.score, &mut rand::rng());

    tracing::info!(
        "{} earned {} points on {} and moved {} -> {}",
        payload.user_name.as_deref().unwrap_or("anonymous player"),
        grade.score,
        question.id,
        current_score,
        scoreboard.score
    );

    Ok(Json(GradeResponse {
        score: grade.score,
        feedback: grade.feedback,
        question: QuestionResponse::from(&question),
        scoreboard,
    }))
}

/// Send a test request to the grading service
pub async fn check_grader(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state.grader.check().await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Resolve the question and grade the answer. Fails without side effects.
pub(crate) async fn grade_question(
    state: &AppState,
    question_id: &str,
    user_answer: &str,
) -> Result<(Question, Grade), ApiError> {
    let question = state.questions.question(question_id)?;

    if user_answer.trim().is_empty() {
        return Err(ApiError::InvalidInput("Answer cannot be empty.".to_string()));
    }

    let grade = state
        .grader
        .grade(&question.prompt, &question.answer, user_answer)
        .await?;
    tracing::debug!("Grading reply for {}: {}", question.id, grade.raw);

    Ok((question, grade))
}
