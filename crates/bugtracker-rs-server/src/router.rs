//! Router assembly: routes, `/api` mount, CORS and request logging.

use crate::context::ServiceContext;
use crate::error::InternalErrorMessage;
use crate::handlers;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bugtracker_rs_protocol::ErrorBody;
use chrono::Utc;
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Build the full application router.
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    let routes = Router::new()
        .route(
            "/bugs",
            get(handlers::list_bugs).post(handlers::create_bug),
        )
        .route(
            "/bugs/{id}",
            get(handlers::get_bug)
                .put(handlers::update_bug)
                .delete(handlers::delete_bug),
        )
        .route("/health", get(handlers::health));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn_with_state(ctx.clone(), log_requests))
        .layer(cors_layer(&ctx.config.server.cors_origins))
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid cors origin (origin={})", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Log every request; 500s are logged with their detail, which is also
/// returned to the client in development mode.
async fn log_requests(
    State(ctx): State<Arc<ServiceContext>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    let status = response.status();
    debug!(
        "request handled (method={}, uri={}, status={}, elapsed_ms={})",
        method,
        uri,
        status.as_u16(),
        started.elapsed().as_millis()
    );
    if status != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }
    let Some(InternalErrorMessage(message)) =
        response.extensions().get::<InternalErrorMessage>().cloned()
    else {
        return response;
    };
    error!(
        "request failed (message={}, method={}, uri={}, timestamp={})",
        message,
        method,
        uri,
        Utc::now().to_rfc3339()
    );
    if !ctx.config.server.environment.is_development() {
        return response;
    }
    let mut body = ErrorBody::new("Internal server error");
    body.message = Some(message);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
