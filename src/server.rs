//! HTTP endpoint exposing the engine to the browser frontend
//!
//! Endpoints:
//! - GET  /health    - Health check
//! - POST /get-move  - Pick the engine's reply for a board

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::{arrayboard::*, config::EngineConfig, error::EngineError, solver::Solver};

/// The engine always plays the second side, the browser's human plays first
pub const ENGINE_SIDE: Side = Side::PlayerTwo;

/// Column reported when the position has no legal move
pub const NO_MOVE: i64 = -1;

pub const DEFAULT_DEPTH: i64 = 4;

/// Settings of the HTTP server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// deepest search a client may request
    pub max_depth: u32,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_depth: 8,
            engine: EngineConfig::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub engine: EngineConfig,
    pub max_depth: u32,
}

/// Request for the engine's move
#[derive(Deserialize, Serialize)]
pub struct MoveRequest {
    /// Board rows from top to bottom: 0=empty, 1=human, 2=engine
    pub board: Vec<Vec<i64>>,
    /// Search depth in plies
    #[serde(default = "default_depth")]
    pub depth: i64,
}

fn default_depth() -> i64 {
    DEFAULT_DEPTH
}

/// The engine's move
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct MoveResponse {
    /// Column to play, or -1 when the game is already over
    pub column: i64,
    pub score: f64,
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the application router with the given state.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/get-move", post(get_move))
        .layer(cors)
        .with_state(state)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NodeBudgetExceeded(_) | EngineError::DeadlineExceeded(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        EngineError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn reject(err: EngineError) -> (StatusCode, String) {
    warn!("rejected move request: {}", err);
    (status_for(&err), err.to_string())
}

/// Validates a request and turns it into a board and a depth
fn parse_request(state: &AppState, req: &MoveRequest) -> Result<(ArrayBoard, u32), EngineError> {
    if req.depth < 1 {
        return Err(EngineError::InvalidDepth(req.depth));
    }
    if req.depth > state.max_depth as i64 {
        return Err(EngineError::DepthLimitExceeded {
            depth: req.depth,
            max: state.max_depth,
        });
    }
    let board = ArrayBoard::from_symbols_top_down(&req.board)?;
    if board.width() != state.engine.width || board.height() != state.engine.height {
        return Err(EngineError::InvalidDimensions(format!(
            "expected {} rows of {} cells, got {} rows of {} cells",
            state.engine.height,
            state.engine.width,
            board.height(),
            board.width()
        )));
    }
    Ok((board, req.depth as u32))
}

/// Pick the engine's move for the given board.
pub async fn get_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, (StatusCode, String)> {
    let (board, depth) = parse_request(&state, &req).map_err(reject)?;
    let engine = state.engine.clone();

    // the search is CPU bound, keep it off the async workers
    let result = tokio::task::spawn_blocking(move || {
        let mut solver = Solver::new(engine, ENGINE_SIDE)?;
        solver.choose_move(&board, depth)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Search task failed: {}", e),
        )
    })?
    .map_err(reject)?;

    info!(column = ?result.column, score = result.score, depth, "answered move request");

    Ok(Json(match result.column {
        Some(column) => MoveResponse {
            column: column as i64,
            score: result.score as f64,
        },
        None => MoveResponse {
            column: NO_MOVE,
            score: 0.0,
        },
    }))
}

/// Creates a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

/// Runs the server until Ctrl+C is received
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.engine.validate()?;
    let state = Arc::new(AppState {
        engine: config.engine,
        max_depth: config.max_depth,
    });
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}
