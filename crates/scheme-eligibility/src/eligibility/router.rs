use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Profile, ProfileId, SchemeId};
use super::repository::{ProfileStore, SchemeStore, StoreError};
use super::rules::Ruleset;
use super::service::{MatchingServiceError, SchemeMatchingService};

/// Router builder exposing eligibility results, checks, and publish-time matching.
pub fn eligibility_router<P, S>(service: Arc<SchemeMatchingService<P, S>>) -> Router
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    Router::new()
        .route("/api/v2/eligibility", post(check_handler::<P, S>))
        .route(
            "/api/v2/eligibility/:profile_id",
            get(results_handler::<P, S>),
        )
        .route(
            "/api/v1/dashboard/:profile_id",
            get(dashboard_handler::<P, S>),
        )
        .route(
            "/api/v1/admin/schemes/:scheme_id/publish",
            post(publish_handler::<P, S>),
        )
        .route(
            "/api/v1/admin/schemes/:scheme_id/matches",
            get(matches_handler::<P, S>),
        )
        .with_state(service)
}

/// Ad-hoc evaluation payload.
#[derive(Debug, Deserialize)]
pub struct EligibilityCheckRequest {
    pub profile: Profile,
    #[serde(default)]
    pub conditions: Ruleset,
}

pub(crate) async fn check_handler<P, S>(
    State(service): State<Arc<SchemeMatchingService<P, S>>>,
    axum::Json(request): axum::Json<EligibilityCheckRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    let check = service.check(&request.profile, &request.conditions);
    (StatusCode::OK, axum::Json(check)).into_response()
}

pub(crate) async fn results_handler<P, S>(
    State(service): State<Arc<SchemeMatchingService<P, S>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    match service.results_for(&ProfileId(profile_id)) {
        Ok(results) => (StatusCode::OK, axum::Json(results)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn dashboard_handler<P, S>(
    State(service): State<Arc<SchemeMatchingService<P, S>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    match service.dashboard(&ProfileId(profile_id)) {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn publish_handler<P, S>(
    State(service): State<Arc<SchemeMatchingService<P, S>>>,
    Path(scheme_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    match service.publish(&SchemeId(scheme_id)) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn matches_handler<P, S>(
    State(service): State<Arc<SchemeMatchingService<P, S>>>,
    Path(scheme_id): Path<String>,
) -> Response
where
    P: ProfileStore + 'static,
    S: SchemeStore + 'static,
{
    match service.matches(&SchemeId(scheme_id)) {
        Ok(matches) => (StatusCode::OK, axum::Json(matches)).into_response(),
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for MatchingServiceError {
    fn into_response(self) -> Response {
        match &self {
            MatchingServiceError::ProfileNotFound(_)
            | MatchingServiceError::SchemeNotFound(_)
            | MatchingServiceError::Store(StoreError::NotFound) => {
                let payload = json!({ "error": self.to_string() });
                (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
            }
            MatchingServiceError::InvalidRuleset { issues, .. } => {
                let payload = json!({
                    "error": self.to_string(),
                    "issues": issues,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
            }
            MatchingServiceError::Store(StoreError::Unavailable(_)) => {
                let payload = json!({ "error": self.to_string() });
                (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
            }
        }
    }
}
