use std::{
    env,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use engine::editor::{EditorHistory, EditorManifest, EditorSnapshot, StepRequest};
use puzzle::catalog::StageCatalog;
use puzzle::editor_api::EditorSession;
use puzzle::logging;
use puzzle::session::GameEvent;
use puzzle::settings::SettingsStore;

#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<EditorSession>>,
    stage_names: Arc<Vec<String>>,
}

impl AppState {
    fn session(&self) -> MutexGuard<'_, EditorSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/manifest", get(manifest))
        .route("/api/stages", get(stages))
        .route("/api/agent/state", get(agent_state))
        .route("/api/agent/history", get(agent_history))
        .route("/api/agent/events", post(agent_events))
        .route("/api/agent/step", post(agent_step))
        .route("/api/agent/reset", post(agent_reset))
        .with_state(state)
        .layer(cors)
}

fn resolve_editor_api_addr<F>(mut get_env: F) -> SocketAddr
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(addr) = get_env("ROCKPASTE_EDITOR_API_ADDR").and_then(|v| v.parse().ok()) {
        return addr;
    }

    if let Some(port) = get_env("ROCKPASTE_EDITOR_API_PORT").and_then(|v| v.parse::<u16>().ok()) {
        return SocketAddr::from(([127, 0, 0, 1], port));
    }

    SocketAddr::from(([127, 0, 0, 1], 4100))
}

fn resolve_stage_index<F>(mut get_env: F) -> usize
where
    F: FnMut(&str) -> Option<String>,
{
    get_env("ROCKPASTE_STAGE_INDEX")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

async fn health() -> &'static str {
    "ok"
}

async fn manifest(State(state): State<AppState>) -> Json<EditorManifest> {
    Json(state.session().manifest())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StagesResponse {
    names: Vec<String>,
}

async fn stages(State(state): State<AppState>) -> Json<StagesResponse> {
    Json(StagesResponse {
        names: state.stage_names.as_ref().clone(),
    })
}

async fn agent_state(State(state): State<AppState>) -> Json<EditorSnapshot> {
    let snapshot = state.session().state();
    Json(snapshot)
}

async fn agent_history(State(state): State<AppState>) -> Json<EditorHistory> {
    let history = state.session().history();
    Json(history)
}

async fn agent_events(State(state): State<AppState>) -> Json<Vec<GameEvent>> {
    let events = state.session().drain_events();
    Json(events)
}

async fn agent_step(
    State(state): State<AppState>,
    Json(payload): Json<StepRequest>,
) -> Result<Json<EditorSnapshot>, (StatusCode, String)> {
    let snapshot = state.session().step(&payload.action_id, &payload.args);
    snapshot
        .map(Json)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

async fn agent_reset(State(state): State<AppState>) -> Json<EditorSnapshot> {
    let snapshot = state.session().reset();
    Json(snapshot)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = logging::resolve_level(false, |k| env::var(k).ok());
    logging::init_log(level, None).context("init logging")?;

    let settings = SettingsStore::from_env().load();
    let catalog = StageCatalog::builtin();
    let stage_index = resolve_stage_index(|k| env::var(k).ok());

    let state = AppState {
        stage_names: Arc::new(catalog.stages.iter().map(|s| s.name.clone()).collect()),
        session: Arc::new(Mutex::new(EditorSession::new(&catalog, stage_index, settings))),
    };
    let app = router(state);

    let addr = resolve_editor_api_addr(|k| env::var(k).ok());
    log::info!("editor api listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind editor api on {addr}"))?;

    axum::serve(listener, app).await.context("serve editor api")?;
    Ok(())
}
