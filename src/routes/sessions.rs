use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::game::grade_question;
use crate::{
    error::ApiError,
    game::GameSession,
    models::{
        GradeResponse, QuestionResponse, SessionAnswerRequest, SessionAnswerResponse,
        SessionCreatedResponse, SessionView,
    },
    AppState,
};

/// Start a new game with an empty scoreboard
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let session = GameSession::new();
    let session_id = session.session_id;
    state.sessions.insert(session_id, session);

    tracing::info!("Created game session {}", session_id);
    (
        StatusCode::CREATED,
        Json(SessionCreatedResponse { session_id }),
    )
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(ApiError::SessionNotFound(session_id))?;

    Ok(Json(SessionView::new(&session, state.engine.board())))
}

/// Grade a player's answer and move their piece on the session scoreboard
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<SessionAnswerRequest>, JsonRejection>,
) -> Result<Json<SessionAnswerResponse>, ApiError> {
    let Json(payload) = payload?;
    let player = payload.user_name.trim().to_string();
    if player.is_empty() {
        return Err(ApiError::InvalidInput("Player name cannot be empty.".to_string()));
    }
    if !state.sessions.contains_key(&session_id) {
        return Err(ApiError::SessionNotFound(session_id));
    }

    let (question, grade) =
        grade_question(&state, &payload.question_id, &payload.user_answer).await?;

    // The entry stays locked from reading the score until the result is
    // stored, so rounds in the same session apply one at a time
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or(ApiError::SessionNotFound(session_id))?;

    let current_score = session.score_of(&player);
    let scoreboard = state
        .engine
        .apply_score(current_score, grade.score, &mut rand::rng());
    let new_winner = session.record(&player, &scoreboard);

    if let Some(event) = &scoreboard.special_event {
        tracing::info!("{} hit a special tile in session {}: {}", player, session_id, event.message);
    }
    if new_winner {
        tracing::info!("{} won session {} with {} points", player, session_id, scoreboard.score);
    }

    let view = SessionView::new(&session, state.engine.board());
    drop(session);

    Ok(Json(SessionAnswerResponse {
        grade: GradeResponse {
            score: grade.score,
            feedback: grade.feedback,
            question: QuestionResponse::from(&question),
            scoreboard,
        },
        player,
        new_winner,
        session: view,
    }))
}

/// Clear every score but keep the session
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state
        .sessions
        .get_mut(&session_id)
        .ok_or(ApiError::SessionNotFound(session_id))?;
    session.reset();

    tracing::info!("Reset game session {}", session_id);
    Ok(Json(SessionView::new(&session, state.engine.board())))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&session_id)
        .ok_or(ApiError::SessionNotFound(session_id))?;

    tracing::info!("Removed game session {}", session_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::Ordering, Arc};

    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        game::ScoringResult,
        routes::test_support::{
            app, body_json, empty_request, json_request, test_state, StubGrader,
        },
        AppState,
    };

    async fn create(state: &Arc<AppState>) -> Uuid {
        let resp = app(state.clone())
            .oneshot(empty_request("POST", "/api/sessions"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let json = body_json(resp.into_body()).await;
        json["sessionId"].as_str().unwrap().parse().unwrap()
    }

    async fn answer(state: &Arc<AppState>, session_id: Uuid, player: &str) -> (StatusCode, Value) {
        let resp = app(state.clone())
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{}/answers", session_id),
                json!({
                    "questionId": "PREPARING FOR AN INTERVIEW::0",
                    "userName": player,
                    "userAnswer": "When applying for a job."
                }),
            ))
            .await
            .unwrap();
        let status = resp.status();
        (status, body_json(resp.into_body()).await)
    }

    #[tokio::test]
    async fn test_answers_accumulate_per_player() {
        let state = test_state(Arc::new(StubGrader::awarding(3)));
        let session_id = create(&state).await;

        let (status, first) = answer(&state, session_id, "Ada").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["score"], 3);
        assert_eq!(first["scoreboard"]["score"], 3);
        assert_eq!(first["player"], "Ada");

        let (_, second) = answer(&state, session_id, "Ada").await;
        assert_eq!(second["scoreboard"]["score"], 6);

        let (_, other) = answer(&state, session_id, "Grace").await;
        assert_eq!(other["scoreboard"]["score"], 3);

        let leaderboard = other["session"]["leaderboard"].as_array().unwrap();
        assert_eq!(leaderboard.len(), 2);
        assert_eq!(leaderboard[0]["name"], "Ada");
        assert_eq!(leaderboard[0]["score"], 6);
        assert_eq!(leaderboard[1]["name"], "Grace");
        assert_eq!(leaderboard[1]["rank"], 2);
    }

    #[tokio::test]
    async fn test_first_finisher_wins_session() {
        let state = test_state(Arc::new(StubGrader::awarding(10)));
        let session_id = create(&state).await;

        // 10, 20, then 30 for Ada; no default special tile is a multiple of 10
        for _ in 0..2 {
            answer(&state, session_id, "Ada").await;
        }
        let (_, winning) = answer(&state, session_id, "Ada").await;
        assert_eq!(winning["scoreboard"]["score"], 30);
        assert_eq!(winning["scoreboard"]["hasWinner"], true);
        assert_eq!(winning["newWinner"], true);
        assert_eq!(winning["session"]["winner"], "Ada");

        // A later finisher does not take the win
        state
            .sessions
            .get_mut(&session_id)
            .unwrap()
            .record(
                "Grace",
                &ScoringResult {
                    score: 28,
                    has_winner: false,
                    special_event: None,
                },
            );
        let (_, late) = answer(&state, session_id, "Grace").await;
        assert_eq!(late["scoreboard"]["hasWinner"], true);
        assert_eq!(late["newWinner"], false);
        assert_eq!(late["session"]["winner"], "Ada");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_answers_apply_one_at_a_time() {
        // 1 point per round keeps Ada on tiles 1..=3, clear of the first special tile
        let grader = Arc::new(StubGrader::awarding(1));
        let state = test_state(grader.clone());
        let session_id = create(&state).await;

        let rounds: Vec<_> = (0..3)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move { answer(&state, session_id, "Ada").await })
            })
            .collect();

        let mut scores = Vec::new();
        for round in rounds {
            let (status, json) = round.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            scores.push(json["scoreboard"]["score"].as_u64().unwrap());
        }
        scores.sort();

        // Every round started from the score the previous one stored
        assert_eq!(scores, vec![1, 2, 3]);
        assert_eq!(grader.calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.sessions.get(&session_id).unwrap().score_of("Ada"), 3);
    }

    #[tokio::test]
    async fn test_malformed_answer_body_rejected() {
        let grader = Arc::new(StubGrader::awarding(3));
        let state = test_state(grader.clone());
        let session_id = create(&state).await;

        let resp = app(state)
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{}/answers", session_id),
                json!({ "questionId": "PREPARING FOR AN INTERVIEW::0", "userAnswer": "Soon." }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp.into_body()).await["detail"]
            .as_str()
            .unwrap()
            .contains("userName"));
        assert_eq!(grader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_grading_leaves_ledger_untouched() {
        let state = test_state(Arc::new(StubGrader::failing()));
        let session_id = create(&state).await;

        let (status, _) = answer(&state, session_id, "Ada").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let session = state.sessions.get(&session_id).unwrap();
        assert_eq!(session.player_count(), 0);
        assert_eq!(session.score_of("Ada"), 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_graded() {
        let grader = Arc::new(StubGrader::awarding(3));
        let state = test_state(grader.clone());

        let (status, json) = answer(&state, Uuid::new_v4(), "Ada").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["detail"].as_str().unwrap().contains("does not exist"));
        assert_eq!(grader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_player_name_rejected() {
        let state = test_state(Arc::new(StubGrader::awarding(3)));
        let session_id = create(&state).await;

        let (status, _) = answer(&state, session_id, "  ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_reset_and_delete() {
        let state = test_state(Arc::new(StubGrader::awarding(3)));
        let session_id = create(&state).await;
        answer(&state, session_id, "Ada").await;

        let uri = format!("/api/sessions/{}", session_id);
        let resp = app(state.clone())
            .oneshot(empty_request("GET", &uri))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp.into_body()).await;
        assert_eq!(json["leaderboard"][0]["name"], "Ada");
        assert_eq!(json["leaderboard"][0]["cell"]["row"], 6);
        assert_eq!(json["leaderboard"][0]["cell"]["col"], 3);
        assert!(json["winner"].is_null());

        let resp = app(state.clone())
            .oneshot(empty_request("POST", &format!("{}/reset", uri)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp.into_body()).await;
        assert!(json["leaderboard"].as_array().unwrap().is_empty());

        let resp = app(state.clone())
            .oneshot(empty_request("DELETE", &uri))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(state.sessions.is_empty());

        let resp = app(state.clone())
            .oneshot(empty_request("GET", &uri))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
