//! Route handlers for the bug API.

use crate::context::ServiceContext;
use crate::error::ApiError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use bugtracker_rs_protocol::{
    BugField, BugListResponse, BugPatch, BugPriority, BugRecord, BugStatus, HealthResponse,
    ListQuery, MessageBody, NewBug, Pagination, is_valid_object_id, sanitize_bug, validate_bug,
};
use bugtracker_rs_store::BugQuery;
use chrono::Utc;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

type Ctx = State<Arc<ServiceContext>>;

fn check_id(id: &str) -> Result<(), ApiError> {
    if is_valid_object_id(id) {
        Ok(())
    } else {
        debug!("rejected malformed bug id (id={})", id);
        Err(ApiError::InvalidId)
    }
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!("rejected request body (reason={})", rejection.body_text());
            Err(ApiError::MalformedJson)
        }
    }
}

/// Sanitize then validate; returns the sanitized body.
fn checked_body(body: &Value) -> Result<Value, ApiError> {
    let sanitized = sanitize_bug(body);
    let report = validate_bug(&sanitized);
    if report.is_valid() {
        Ok(sanitized)
    } else {
        let details = report.messages();
        debug!("validation failed (errors={})", details.len());
        Err(ApiError::Validation(details))
    }
}

/// A body whose only key is `status` skips full validation on update.
fn is_status_only(body: &Value) -> bool {
    body.as_object()
        .is_some_and(|map| map.len() == 1 && map.contains_key(BugField::Status.key()))
}

/// `GET /bugs`
pub async fn list_bugs(
    State(ctx): Ctx,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<BugListResponse>, ApiError> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let page = query.page_request();
    let status = query.status().map(BugStatus::parse);
    let priority = query.priority().map(BugPriority::parse);
    // An unknown status or priority can never match a stored record.
    if matches!(status, Some(None)) || matches!(priority, Some(None)) {
        debug!("list criterion matches nothing (query={:?})", query);
        return Ok(Json(BugListResponse {
            bugs: Vec::new(),
            pagination: Pagination::new(page, 0),
        }));
    }
    let store_query = BugQuery {
        status: status.flatten(),
        priority: priority.flatten(),
        page,
    };
    let result = ctx.store.list(&store_query).await?;
    Ok(Json(BugListResponse {
        pagination: Pagination::new(page, result.total),
        bugs: result.bugs,
    }))
}

/// `GET /bugs/{id}`
pub async fn get_bug(State(ctx): Ctx, Path(id): Path<String>) -> Result<Json<BugRecord>, ApiError> {
    check_id(&id)?;
    let bug = ctx.store.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(bug))
}

/// `POST /bugs`
pub async fn create_bug(
    State(ctx): Ctx,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BugRecord>), ApiError> {
    let sanitized = checked_body(&json_body(body)?)?;
    let bug = NewBug::from_value(&sanitized)?;
    let record = ctx.store.insert(bug).await?;
    info!("bug created (id={}, priority={})", record.id, record.priority);
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /bugs/{id}`
pub async fn update_bug(
    State(ctx): Ctx,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BugRecord>, ApiError> {
    check_id(&id)?;
    let body = json_body(body)?;
    let sanitized = if is_status_only(&body) {
        sanitize_bug(&body)
    } else {
        checked_body(&body)?
    };
    let patch = BugPatch::from_value(&sanitized)?;
    if patch.is_empty() {
        warn!("update carries no changes (id={})", id);
    }
    let record = ctx
        .store
        .update(&id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("bug updated (id={}, status={})", record.id, record.status);
    Ok(Json(record))
}

/// `DELETE /bugs/{id}`
pub async fn delete_bug(
    State(ctx): Ctx,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    check_id(&id)?;
    if !ctx.store.delete(&id).await? {
        return Err(ApiError::NotFound);
    }
    info!("bug deleted (id={})", id);
    Ok(Json(MessageBody {
        message: "Bug deleted successfully".to_string(),
    }))
}

/// `GET /health`
pub async fn health(State(ctx): Ctx) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        uptime: ctx.uptime().as_secs_f64(),
    })
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
