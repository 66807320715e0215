use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::response::Response;
use axum::{middleware, Router};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::routes;
use crate::state::AppState;

async fn ensure_request_id(req: Request<Body>, next: middleware::Next) -> Response {
    let request_id_header = HeaderName::from_static("x-request-id");

    let mut req = req;
    let request_id = req
        .headers()
        .get(&request_id_header)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if req.headers().get(&request_id_header).is_none() {
        if let Ok(v) = HeaderValue::from_str(&request_id) {
            req.headers_mut().insert(request_id_header.clone(), v);
        }
    }

    let mut res = next.run(req).await;

    if res.headers().get(&request_id_header).is_none() {
        if let Ok(v) = HeaderValue::from_str(&request_id) {
            res.headers_mut().insert(request_id_header, v);
        }
    }

    res
}

fn layer_defaults(router: Router<()>) -> Router<()> {
    router
        .layer(middleware::from_fn(ensure_request_id))
        .layer(TraceLayer::new_for_http())
}

/// Builds the full router for the five routes SPEC_FULL.md §6 names,
/// request-id and trace layers applied the same way the teacher's
/// `AxumApp` wraps every mounted service.
pub fn build(state: AppState) -> Router<()> {
    layer_defaults(routes::router(state))
}

/// Binds and serves the router until the process is signaled to stop.
pub async fn listen<A>(router: Router<()>, addr: A) -> anyhow::Result<()>
where
    A: ToSocketAddrs,
{
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
