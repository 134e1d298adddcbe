mod config;
mod error;
mod game;
mod grading;
mod models;
mod questions;
mod routes;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use config::Config;
use dashmap::DashMap;
use game::{GameSession, ScoringEngine};
use grading::{Grader, OpenRouterGrader};
use questions::QuestionBank;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// How often idle sessions are swept
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub engine: ScoringEngine,
    pub questions: QuestionBank,
    pub grader: Arc<dyn Grader>,
    /// In-memory game sessions keyed by session id
    pub sessions: DashMap<Uuid, GameSession>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spin_wheel_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Spin Wheel backend server...");

    // Load configuration
    let config = Config::from_env()?;
    let board = config.game.board()?;
    tracing::info!(
        "Configuration loaded ({} tiles, {} special)",
        board.winning_score(),
        board.special_tiles().len()
    );

    // Load questions
    let questions = match &config.game.question_bank_path {
        Some(path) => match QuestionBank::load(path).await {
            Ok(bank) => bank,
            Err(e) => {
                tracing::warn!(
                    "Failed to load question bank from {}: {}. Using built-in questions.",
                    path,
                    e
                );
                QuestionBank::builtin()
            }
        },
        None => QuestionBank::builtin(),
    };

    // Create shared HTTP client for the grading service
    let http_client = reqwest::Client::builder()
        .timeout(config.grading.timeout())
        .build()?;
    let grader = OpenRouterGrader::new(http_client, config.grading.clone());
    if !grader.has_api_key() {
        tracing::warn!("OPENROUTER_API_KEY is not set; grading requests will fail");
    }
    tracing::info!("Grader initialized");

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        engine: ScoringEngine::new(board),
        questions,
        grader: Arc::new(grader),
        sessions: DashMap::new(),
    });

    // Spawn background task to drop abandoned sessions
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        session_cleanup_task(cleanup_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let mut app = routes::create_routes();
    if let Some(static_dir) = &config.server.static_dir {
        tracing::info!("Serving frontend from {}", static_dir);
        app = app.fallback_service(ServeDir::new(static_dir));
    }
    let app = app
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API: http://{}/api", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that periodically removes sessions nobody has touched
async fn session_cleanup_task(state: Arc<AppState>) {
    let idle_timeout = state.config.game.session_idle_timeout();
    let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);

    loop {
        interval.tick().await;
        remove_idle_sessions(&state, idle_timeout);
    }
}

/// Remove sessions idle for at least `idle_timeout`; returns how many went
fn remove_idle_sessions(state: &AppState, idle_timeout: Duration) -> usize {
    let stale: Vec<Uuid> = state
        .sessions
        .iter()
        .filter(|session| session.idle_for() >= idle_timeout)
        .map(|session| *session.key())
        .collect();

    for session_id in &stale {
        if let Some((_, session)) = state.sessions.remove(session_id) {
            tracing::info!(
                "Removed idle game session {} ({} players)",
                session_id,
                session.player_count()
            );
        }
    }

    stale.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use routes::test_support::{test_state, StubGrader};

    #[test]
    fn test_idle_sessions_are_removed() {
        let state = test_state(Arc::new(StubGrader::awarding(1)));
        let session = GameSession::new();
        state.sessions.insert(session.session_id, session);

        assert_eq!(remove_idle_sessions(&state, Duration::ZERO), 1);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_active_sessions_are_kept() {
        let state = test_state(Arc::new(StubGrader::awarding(1)));
        let session = GameSession::new();
        let session_id = session.session_id;
        state.sessions.insert(session_id, session);

        assert_eq!(remove_idle_sessions(&state, Duration::from_secs(3600)), 0);
        assert!(state.sessions.contains_key(&session_id));
    }
}
