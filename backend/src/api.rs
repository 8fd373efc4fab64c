//! HTTP transport: routes, request/response plumbing, CORS.
//!
//! Handlers stay thin: lookup and orchestration live in
//! [`SessionStore`], rendering in [`GameView`]. The transport only maps
//! paths and bodies onto store operations.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::SessionStore;
use crate::view::GameView;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    /// Coordinate form ("e2e4") or algebraic form ("e4").
    #[serde(rename = "move")]
    pub mv: String,
}

#[derive(Deserialize)]
pub struct LegalMovesQuery {
    pub square: Option<String>,
}

pub fn router(store: Arc<SessionStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/", get(root))
        .route("/api/games", post(create_game))
        .route("/api/games/{id}", get(get_game).delete(delete_game))
        .route("/api/games/{id}/move", post(submit_move))
        .route("/api/games/{id}/legal-moves", get(legal_moves))
        .route("/api/games/{id}/toggle-analysis", post(toggle_analysis))
        .with_state(state)
}

/// Browser clients come from the React dev servers; mirror their origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Chess Game API" }))
}

async fn create_game(State(state): State<AppState>) -> Json<GameView> {
    Json(state.store.create().await)
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(state.store.get(parse_id(&id)?).await?))
}

async fn submit_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(state.store.submit_move(parse_id(&id)?, &request.mv).await?))
}

async fn legal_moves(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LegalMovesQuery>,
) -> Result<Json<Value>, ApiError> {
    let moves = state
        .store
        .legal_moves(parse_id(&id)?, query.square.as_deref())
        .await?;
    Ok(Json(json!({ "legal_moves": moves })))
}

async fn toggle_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(state.store.toggle_analysis(parse_id(&id)?).await?))
}

async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete(parse_id(&id)?).await?;
    Ok(Json(json!({ "message": "Game deleted" })))
}

/// Ids that are not UUIDs cannot be registered, so they behave exactly
/// like absent ids rather than malformed requests.
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound)
}
