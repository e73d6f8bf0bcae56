use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use super::handlers;
use super::ApiState;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn create_router(state: ApiState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(set_request_id))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(DefaultBodyLimit::max(state.config.max_body_size_bytes));

    Router::new()
        .route(
            "/api/calculateCarbonFootprint",
            post(handlers::calculate_carbon_footprint),
        )
        .route(
            "/api/calculateFinanceAgreement",
            post(handlers::calculate_finance_agreement),
        )
        .route(
            "/api/calculateShippingOptions",
            post(handlers::calculate_shipping_options),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(middleware)
}

/// Reuse the caller's request id when it sent one, otherwise mint one, and
/// echo it on the response.
async fn set_request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(request_id.clone());

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), header_value);
    }

    let mut response = next.run(request).await;

    if !response.headers().contains_key(&REQUEST_ID_HEADER) {
        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), header_value);
        }
    }

    response
}
