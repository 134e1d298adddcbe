pub mod board;
pub mod game;
pub mod health;
pub mod sessions;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/groups", get(game::list_groups))
        .route("/spin-group", post(game::spin_group))
        .route("/spin-question", post(game::spin_question))
        .route("/grade-answer", post(game::grade_answer))
        .route("/grader/check", post(game::check_grader))
        .route("/board", get(board::get_board))
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{session_id}/answers", post(sessions::submit_answer))
        .route("/sessions/{session_id}/reset", post(sessions::reset_session))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use dashmap::DashMap;
    use serde_json::Value;

    use crate::{
        config::{Config, GameConfig, GradingConfig, ServerConfig},
        game::ScoringEngine,
        grading::{Grade, Grader, GradingError},
        questions::QuestionBank,
        AppState,
    };

    /// Grader that awards a fixed score, or fails every call
    pub struct StubGrader {
        pub score: Option<u32>,
        pub calls: AtomicUsize,
    }

    impl StubGrader {
        pub fn awarding(score: u32) -> Self {
            Self {
                score: Some(score),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                score: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Grader for StubGrader {
        async fn grade(
            &self,
            _question: &str,
            _standard_answer: &str,
            _user_answer: &str,
        ) -> Result<Grade, GradingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.score {
                Some(score) => Ok(Grade {
                    score,
                    feedback: format!("Worth {} points.", score),
                    raw: String::new(),
                }),
                None => Err(GradingError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }

        async fn check(&self) -> Result<(), GradingError> {
            match self.score {
                Some(_) => Ok(()),
                None => Err(GradingError::MissingApiKey),
            }
        }
    }

    pub fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                static_dir: None,
            },
            grading: GradingConfig {
                api_key: None,
                api_url: "http://127.0.0.1:9".to_string(),
                model: "test-model".to_string(),
                site_url: "https://localhost".to_string(),
                app_name: "Spin Wheel Tests".to_string(),
                timeout_secs: 1,
            },
            game: GameConfig {
                question_bank_path: None,
                winning_score: 30,
                special_tiles: None,
                session_idle_timeout_secs: 3600,
            },
        }
    }

    pub fn test_state(grader: Arc<StubGrader>) -> Arc<AppState> {
        Arc::new(AppState {
            config: test_config(),
            engine: ScoringEngine::default(),
            questions: QuestionBank::builtin(),
            grader,
            sessions: DashMap::new(),
        })
    }

    pub fn app(state: Arc<AppState>) -> Router {
        super::create_routes().with_state(state)
    }

    pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub async fn body_json(body: Body) -> Value {
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
