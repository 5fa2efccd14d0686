//! REST layer: route wiring, DTO mapping and status codes.
//!
//! The transport resolves the actor from the `x-actor-id` header and hands
//! commands to the domain services; all policy lives below this layer.
//! Requests without a resolvable actor are rejected with 401 before the
//! authorization engine runs.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use shared::{
    ApiErrorDto, BatchErrorDto, BatchSuccessDto, ChangePasswordRequest, CompositeSeriesDto,
    LogBatchResponseDto, LogItemDto, LogPointDto,
};

use crate::domain::commands::logs::{LogSeriesQuery, SubmitLogsCommand};
use crate::domain::commands::users::{ChangePasswordCommand, ResetPasswordCommand};
use crate::domain::log_validator::RawLogEntry;
use crate::domain::models::activity_log::ResourceType;
use crate::domain::models::user::User;
use crate::domain::{BatchStatus, CompositeSeries, DomainError, SubmitLogsResult};
use crate::Backend;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
}

/// Build the application router.
pub fn build_router(backend: Backend) -> Router {
    let api_routes = Router::new()
        .route("/children/:child_id/logs", get(get_composite_series))
        .route(
            "/children/:child_id/logs/:resource",
            post(submit_logs).get(get_resource_series),
        )
        .route("/users/:user_id/password", patch(change_password))
        .route("/users/:user_id/password/reset", post(reset_password));

    Router::new()
        .nest("/api", api_routes)
        .with_state(AppState { backend })
}

#[derive(Deserialize, Debug)]
pub struct SeriesQueryParams {
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

/// Resolve the acting user from the `x-actor-id` header.
fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Result<User, Response> {
    let actor_id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| error_response(&DomainError::Unauthenticated))?;

    match state.backend.user_service.get_user(actor_id) {
        Ok(Some(user)) if !user.deleted => Ok(user),
        Ok(_) => Err(error_response(&DomainError::Unauthenticated)),
        Err(e) => Err(error_response(&e)),
    }
}

/// Axum handler for POST /api/children/:child_id/logs/:resource
pub async fn submit_logs(
    State(state): State<AppState>,
    Path((child_id, resource)): Path<(String, String)>,
    headers: HeaderMap,
    Json(items): Json<Vec<LogItemDto>>,
) -> Response {
    info!("POST /api/children/{}/logs/{} - {} items", child_id, resource, items.len());

    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let command = SubmitLogsCommand {
        child_id,
        resource,
        entries: items
            .into_iter()
            .map(|item| RawLogEntry { date: item.date, value: item.value })
            .collect(),
    };

    match state.backend.log_ingestion_service.submit_logs(&actor, command) {
        Ok(result) => batch_response(result),
        Err(e) => error_response(&e),
    }
}

/// Axum handler for GET /api/children/:child_id/logs/:resource
pub async fn get_resource_series(
    State(state): State<AppState>,
    Path((child_id, resource)): Path<(String, String)>,
    Query(params): Query<SeriesQueryParams>,
    headers: HeaderMap,
) -> Response {
    info!("GET /api/children/{}/logs/{} - {:?}", child_id, resource, params);

    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let query = LogSeriesQuery {
        child_id,
        resource: Some(resource),
        date_start: params.date_start.unwrap_or_default(),
        date_end: params.date_end.unwrap_or_default(),
    };

    match state.backend.log_series_service.query_series(&actor, query) {
        Ok(series) => {
            let dto = shared::ResourceSeriesDto {
                resource: series.resource.name().to_string(),
                logs: series.points.iter().map(point_dto).collect(),
            };
            (StatusCode::OK, Json(dto)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Axum handler for GET /api/children/:child_id/logs
pub async fn get_composite_series(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Query(params): Query<SeriesQueryParams>,
    headers: HeaderMap,
) -> Response {
    info!("GET /api/children/{}/logs - {:?}", child_id, params);

    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let query = LogSeriesQuery {
        child_id,
        resource: None,
        date_start: params.date_start.unwrap_or_default(),
        date_end: params.date_end.unwrap_or_default(),
    };

    match state.backend.log_series_service.query_all_series(&actor, query) {
        Ok(composite) => (StatusCode::OK, Json(composite_dto(composite))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Axum handler for PATCH /api/users/:user_id/password
pub async fn change_password(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Response {
    info!("PATCH /api/users/{}/password", user_id);

    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let command = ChangePasswordCommand {
        target_user_id: user_id,
        new_password: request.new_password,
    };
    match state.backend.user_service.change_password(&actor, command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// Axum handler for POST /api/users/:user_id/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Response {
    info!("POST /api/users/{}/password/reset", user_id);

    let actor = match resolve_actor(&state, &headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    let command = ResetPasswordCommand {
        target_user_id: user_id,
        new_password: request.new_password,
    };
    match state.backend.user_service.reset_password(&actor, command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

fn point_dto(point: &crate::domain::SeriesPoint) -> LogPointDto {
    LogPointDto {
        date: point.date.format("%Y-%m-%d").to_string(),
        value: point.value,
    }
}

fn composite_dto(composite: CompositeSeries) -> CompositeSeriesDto {
    let mut dto = CompositeSeriesDto {
        steps: Vec::new(),
        calories: Vec::new(),
        active_minutes: Vec::new(),
        lightly_active_minutes: Vec::new(),
        sedentary_minutes: Vec::new(),
    };
    for series in composite.series {
        let points: Vec<LogPointDto> = series.points.iter().map(point_dto).collect();
        match series.resource {
            ResourceType::Steps => dto.steps = points,
            ResourceType::Calories => dto.calories = points,
            ResourceType::ActiveMinutes => dto.active_minutes = points,
            ResourceType::LightlyActiveMinutes => dto.lightly_active_minutes = points,
            ResourceType::SedentaryMinutes => dto.sedentary_minutes = points,
        }
    }
    dto
}

fn batch_response(result: SubmitLogsResult) -> Response {
    let status = match result.status {
        BatchStatus::Created => StatusCode::CREATED,
        BatchStatus::MultiStatus => StatusCode::MULTI_STATUS,
        BatchStatus::BadRequest => StatusCode::BAD_REQUEST,
    };
    let body = LogBatchResponseDto {
        success: result
            .success
            .iter()
            .map(|s| BatchSuccessDto {
                code: "CREATED".to_string(),
                item: LogPointDto {
                    date: s.date.format("%Y-%m-%d").to_string(),
                    value: s.value,
                },
            })
            .collect(),
        error: result
            .error
            .into_iter()
            .map(|e| BatchErrorDto {
                code: e.code.as_str().to_string(),
                message: e.message,
                description: e.description,
                item: e.item,
            })
            .collect(),
    };
    (status, Json(body)).into_response()
}

fn error_response(error: &DomainError) -> Response {
    let status = match error {
        DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::Validation { .. } | DomainError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        DomainError::ChildNotFound { .. }
        | DomainError::UserNotFound { .. }
        | DomainError::GroupNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Duplicate { .. } => StatusCode::CONFLICT,
        DomainError::Internal(_) => {
            tracing::error!("Internal error: {:?}", error);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = ApiErrorDto {
        code: error.code().to_string(),
        message: error.to_string(),
        description: error.description(),
    };
    (status, Json(body)).into_response()
}
