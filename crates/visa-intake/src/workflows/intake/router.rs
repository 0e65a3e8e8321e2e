use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde_json::json;

use super::catalog::CatalogProvider;
use super::profile::{ProfileError, ProfileProvider};
use super::service::{IntakeService, IntakeServiceError};
use super::session::TurnRequest;

/// Router builder exposing HTTP endpoints for the intake conversation.
pub fn intake_router<C, P>(service: Arc<IntakeService<C, P>>) -> Router
where
    C: CatalogProvider + 'static,
    P: ProfileProvider + 'static,
{
    Router::new()
        .route("/api/v1/intake/session", get(begin_handler::<C, P>))
        .route(
            "/api/v1/intake/sessions/:user_id/turns",
            post(turn_handler::<C, P>),
        )
        .with_state(service)
}

pub(crate) async fn begin_handler<C, P>(
    State(service): State<Arc<IntakeService<C, P>>>,
) -> Response
where
    C: CatalogProvider + 'static,
    P: ProfileProvider + 'static,
{
    (StatusCode::OK, axum::Json(service.start())).into_response()
}

pub(crate) async fn turn_handler<C, P>(
    State(service): State<Arc<IntakeService<C, P>>>,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<TurnRequest>,
) -> Response
where
    C: CatalogProvider + 'static,
    P: ProfileProvider + 'static,
{
    match service.turn(&user_id, request, Local::now().date_naive()) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(IntakeServiceError::Profile(ProfileError::NotFound(user))) => {
            let payload = json!({
                "error": format!("no profile found for user {user}"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(IntakeServiceError::Session(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
