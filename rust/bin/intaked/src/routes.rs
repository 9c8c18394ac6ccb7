//! Route registration: module routes under `/api` plus the cross-cutting
//! layers (CORS, body limit, rate limit).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, DefaultBodyLimit, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use intake_core::{Module, RateLimiter, ServiceConfig, ServiceError};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the complete application router.
pub fn build_router(config: &ServiceConfig, modules: &[&dyn Module]) -> anyhow::Result<Router> {
    let mut api = Router::new();
    for module in modules {
        info!("mounting module {}", module.name());
        api = api.merge(module.routes());
    }

    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    let api = api
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(limiter, rate_limit));

    let origin: HeaderValue = config
        .allowed_origin
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid allowed origin {:?}: {}", config.allowed_origin, e))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Ok(Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(cors))
}

async fn route_not_found() -> ServiceError {
    ServiceError::NotFound("Route not found".into())
}

/// Reject clients over their request budget with 429.
///
/// Requests without connection info (in-process callers) share one bucket.
async fn rate_limit(State(limiter): State<Arc<RateLimiter>>, req: Request, next: Next) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(e) = limiter.check(ip) {
        return e.into_response();
    }
    next.run(req).await
}
