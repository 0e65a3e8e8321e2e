use crate::infra::{AppState, InMemoryProfileStore, InMemorySessionStore};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use visa_intake::error::AppError;
use visa_intake::workflows::intake::{
    intake_router, IntakeService, SessionState, TurnRequest, TurnResponse, UserProfile,
    VisaCatalog,
};

#[derive(Clone)]
pub(crate) struct IntakeDeps {
    pub(crate) service: Arc<IntakeService<VisaCatalog, InMemoryProfileStore>>,
    pub(crate) profiles: Arc<InMemoryProfileStore>,
    pub(crate) sessions: Arc<InMemorySessionStore>,
}

pub(crate) fn with_intake_routes(deps: IntakeDeps) -> axum::Router {
    intake_router(deps.service.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/intake/profiles/:user_id",
            axum::routing::put(upsert_profile_endpoint),
        )
        .route(
            "/api/v1/intake/conversations/:user_id",
            axum::routing::post(conversation_endpoint),
        )
        .layer(Extension(deps))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn upsert_profile_endpoint(
    Extension(deps): Extension<IntakeDeps>,
    Path(user_id): Path<String>,
    Json(profile): Json<UserProfile>,
) -> impl IntoResponse {
    deps.profiles.upsert(&user_id, profile);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationRequest {
    #[serde(default)]
    pub(crate) answer: Option<String>,
}

/// Stateful convenience wrapper over the stateless turn endpoint: the
/// session state lives server-side, so a thin client only ever sends the
/// next answer.
pub(crate) async fn conversation_endpoint(
    Extension(deps): Extension<IntakeDeps>,
    Path(user_id): Path<String>,
    Json(request): Json<ConversationRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let stored = deps.sessions.load(&user_id);

    let response = match (stored, request.answer) {
        (None, None) => deps.service.start(),
        (stored, answer) => {
            let state = stored.unwrap_or(SessionState::PurposeClassification);
            let turn = TurnRequest {
                step: state.expected_step().label().to_string(),
                answer,
                state: Some(state),
            };
            deps.service
                .turn(&user_id, turn, Local::now().date_naive())?
        }
    };

    if matches!(response.state, SessionState::Complete { .. }) {
        deps.sessions.clear(&user_id);
    } else {
        deps.sessions.save(&user_id, response.state.clone());
    }

    Ok(Json(response))
}
