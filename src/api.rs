//! Thin HTTP surface over the orchestrator.
//!
//! Handlers validate nothing themselves; they decode the request, call
//! the orchestrator and map its error categories onto status codes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use stagehand_protocols::entity::{ActivityRecord, Session, Step};
use stagehand_protocols::error::OrchestratorError;
use stagehand_protocols::workflow::{Flavor, Location, WorkflowDescription};
use stagehand_runtime::{Orchestrator, ServiceView, SessionView, StartSessionRequest, StepView};

type Shared = Arc<Orchestrator>;

pub async fn serve(orchestrator: Shared, address: &str) -> anyhow::Result<()> {
    let app = router(orchestrator);
    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(orchestrator: Shared) -> Router {
    Router::new()
        .route("/session/all", get(list_sessions))
        .route("/session/startup", post(start_session))
        .route("/session/stop", post(stop_session))
        .route("/session/{name}", get(get_session))
        .route("/session/{name}/services", get(session_services))
        .route("/step/startup", post(start_step))
        .route("/step/progress", post(update_progress))
        .route("/step/status/{session}", get(list_steps))
        .route("/step/status/{session}/{step}", get(get_steps))
        .route("/location/list", get(locations))
        .route("/flavor/list", get(flavors))
        .route("/activity/log", get(activity_log))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

/// Orchestrator errors rendered as HTTP answers.
struct ApiError(OrchestratorError);

impl From<OrchestratorError> for ApiError {
    fn from(error: OrchestratorError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OrchestratorError::NotFound(_) => StatusCode::NOT_FOUND,
            OrchestratorError::Conflict(_) => StatusCode::CONFLICT,
            OrchestratorError::BadRequest(_) => StatusCode::BAD_REQUEST,
            OrchestratorError::Upstream(_) => StatusCode::BAD_GATEWAY,
            OrchestratorError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            OrchestratorError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct SessionStartBody {
    session_name: String,
    user_name: String,
    workflow_description: WorkflowDescription,
    #[serde(default)]
    replacements: HashMap<String, String>,
    #[serde(default)]
    sync_start: bool,
}

async fn start_session(
    State(orchestrator): State<Shared>,
    Json(body): Json<SessionStartBody>,
) -> Result<Json<Session>, ApiError> {
    let session = orchestrator
        .start_session(StartSessionRequest {
            session_name: body.session_name,
            user_name: body.user_name,
            workflow: body.workflow_description,
            replacements: body.replacements,
            synchronous: body.sync_start,
        })
        .await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
struct SessionStopBody {
    session_name: String,
    #[serde(default)]
    sync_stop: bool,
    #[serde(default)]
    force: bool,
}

async fn stop_session(
    State(orchestrator): State<Shared>,
    Json(body): Json<SessionStopBody>,
) -> Result<Json<i32>, ApiError> {
    orchestrator
        .stop_session(&body.session_name, body.sync_stop, body.force)
        .await?;
    Ok(Json(0))
}

async fn list_sessions(
    State(orchestrator): State<Shared>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    Ok(Json(orchestrator.list_sessions().await?))
}

async fn get_session(
    State(orchestrator): State<Shared>,
    Path(name): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(orchestrator.get_session(&name).await?))
}

async fn session_services(
    State(orchestrator): State<Shared>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ServiceView>>, ApiError> {
    Ok(Json(orchestrator.session_services(&name).await?))
}

#[derive(Debug, Deserialize)]
struct StepStartBody {
    session_name: String,
    step_name: String,
    #[serde(default)]
    replacements: HashMap<String, String>,
}

async fn start_step(
    State(orchestrator): State<Shared>,
    Json(body): Json<StepStartBody>,
) -> Result<Json<Step>, ApiError> {
    let step = orchestrator
        .start_step(&body.session_name, &body.step_name, &body.replacements)
        .await?;
    Ok(Json(step))
}

#[derive(Debug, Deserialize)]
struct StepProgressBody {
    jobid: i64,
    progress: String,
}

#[derive(Debug, Serialize)]
struct StepProgressAnswer {
    instance_name: String,
}

async fn update_progress(
    State(orchestrator): State<Shared>,
    Json(body): Json<StepProgressBody>,
) -> Result<Json<StepProgressAnswer>, ApiError> {
    let instance_name = orchestrator
        .update_step_progress(body.jobid, &body.progress)
        .await?;
    Ok(Json(StepProgressAnswer { instance_name }))
}

async fn list_steps(
    State(orchestrator): State<Shared>,
    Path(session): Path<String>,
) -> Result<Json<Vec<StepView>>, ApiError> {
    Ok(Json(orchestrator.list_steps(&session).await?))
}

async fn get_steps(
    State(orchestrator): State<Shared>,
    Path((session, step)): Path<(String, String)>,
) -> Result<Json<Vec<StepView>>, ApiError> {
    Ok(Json(orchestrator.get_steps(&session, &step).await?))
}

async fn locations(State(orchestrator): State<Shared>) -> Json<Vec<Location>> {
    Json(orchestrator.usable_locations().await)
}

async fn flavors(State(orchestrator): State<Shared>) -> Json<Vec<Flavor>> {
    Json(orchestrator.usable_flavors().await)
}

async fn activity_log(
    State(orchestrator): State<Shared>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    Ok(Json(orchestrator.activity_log().await?))
}
