//! Server: merges routers, binds routes to axum once, and runs the
//! per-request pipeline (dispatch, validate, invoke, finalize).

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::context::Context;
use crate::router::{AppRouter, Method, Route};
use crate::validator::{self, Description, FieldError, Section};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("routes already registered")]
    AlreadyRegistered,
    #[error("server is not initialized; call register() first")]
    NotInitialized,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Owns the merged route list until `register()` consumes it into an
/// immutable axum dispatch table. Registration happens once, before any
/// traffic; a second `register()` is rejected instead of double-binding.
#[derive(Default)]
pub struct AppServer {
    routes: Vec<Route>,
    app: Option<axum::Router>,
}

impl AppServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy of the router's routes; the source router keeps its own
    /// list. Mount order extends registration order.
    pub fn mount(&mut self, router: &AppRouter) -> &mut Self {
        self.routes.extend_from_slice(router.routes());
        self
    }

    /// Routes accumulated so far; empty after `register()` consumed them.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Consume the accumulated routes into the dispatch table. Duplicate
    /// `(method, path)` registrations resolve to registration order: the
    /// first wins and later ones are skipped.
    pub fn register(&mut self) -> Result<(), ServerError> {
        if self.app.is_some() {
            return Err(ServerError::AlreadyRegistered);
        }
        let routes = std::mem::take(&mut self.routes);
        let mut bound: HashSet<(Method, String)> = HashSet::new();
        let mut app = axum::Router::new();
        for route in routes {
            if !bound.insert((route.method, route.path.clone())) {
                warn!(method = %route.method, path = %route.path, "duplicate route skipped");
                continue;
            }
            let filter = match route.method {
                Method::Get => MethodFilter::GET,
                Method::Post => MethodFilter::POST,
                Method::Put => MethodFilter::PUT,
                Method::Delete => MethodFilter::DELETE,
                Method::Patch => MethodFilter::PATCH,
            };
            let path = route.path.clone();
            let route = Arc::new(route);
            let endpoint = move |params: Option<Path<HashMap<String, String>>>,
                                 query: Option<Query<HashMap<String, String>>>,
                                 headers: HeaderMap,
                                 body: Bytes| {
                let route = Arc::clone(&route);
                async move {
                    dispatch(
                        route,
                        params.map(|Path(p)| p).unwrap_or_default(),
                        query.map(|Query(q)| q).unwrap_or_default(),
                        headers,
                        body,
                    )
                    .await
                }
            };
            app = app.route(&path, on(filter, endpoint));
        }
        self.app = Some(app.layer(TraceLayer::new_for_http()));
        Ok(())
    }

    /// A clone of the built dispatch table, for serving on a caller-managed
    /// listener (tests bind ephemeral ports this way).
    pub fn handle(&self) -> Result<axum::Router, ServerError> {
        self.app.clone().ok_or(ServerError::NotInitialized)
    }

    /// Bind and serve. Fails with [`ServerError::NotInitialized`] when called
    /// before `register()`.
    pub async fn listen(self, addr: SocketAddr) -> Result<(), ServerError> {
        let app = self.app.ok_or(ServerError::NotInitialized)?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Per-request pipeline for one route.
async fn dispatch(
    route: Arc<Route>,
    params: HashMap<String, String>,
    query: HashMap<String, String>,
    header_map: HeaderMap,
    body: Bytes,
) -> Response {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in header_map.iter() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
        }
    }
    // Every request carries a session and trace id, generated when absent.
    headers
        .entry("x-session".to_string())
        .or_insert_with(|| Uuid::new_v4().to_string());
    headers
        .entry("x-tid".to_string())
        .or_insert_with(|| Uuid::now_v7().to_string());

    let body = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => {
                return reject(
                    Description::InvalidRequest,
                    vec![FieldError {
                        section: Section::Body,
                        path: String::new(),
                        message: format!("invalid JSON body: {}", e),
                    }],
                );
            }
        }
    };

    let ctx = Arc::new(Context::new(body, params, query, headers));
    let report = validator::validate(&ctx, &route.schema);
    if report.failed {
        return reject(report.description, report.errors);
    }

    let outcome = (route.handler)(Arc::clone(&ctx)).await;
    finalize(&ctx, outcome)
}

fn reject(description: Description, errors: Vec<FieldError>) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "desc": description, "data": errors })))
        .into_response()
}

/// An explicit `ctx.response()` wins; otherwise a returned value is
/// serialized under `set.status`. Handler errors surface as the host default
/// behavior: a logged 500.
fn finalize(ctx: &Context, outcome: anyhow::Result<Option<Value>>) -> Response {
    let (reply, set) = ctx.take_parts();
    let (status, body) = match (reply, outcome) {
        (Some(reply), outcome) => {
            if let Err(e) = outcome {
                error!(error = %e, "handler error after explicit response");
            }
            (reply.status, Some(reply.body))
        }
        (None, Ok(value)) => (set.status, value),
        (None, Err(e)) => {
            error!(error = %e, "handler error");
            (500, Some(json!({ "error": e.to_string() })))
        }
    };
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    let mut response = match body {
        Some(value) => (status, Json(value)).into_response(),
        None => status.into_response(),
    };
    for (name, value) in set.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "dropping invalid response header"),
        }
    }
    for cookie in set.cookies {
        match HeaderValue::from_str(&cookie.header_value()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => warn!(cookie = %cookie.name, "dropping invalid cookie"),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::HandlerOutcome;

    async fn noop(_ctx: Arc<Context>) -> HandlerOutcome {
        Ok(None)
    }

    #[test]
    fn mount_copies_routes_and_keeps_the_source() {
        let router = AppRouter::new().get("/a", noop).post("/b", noop);
        let mut server = AppServer::new();
        server.mount(&router);
        assert_eq!(server.routes().len(), 2);
        assert_eq!(router.routes().len(), 2);
    }

    #[test]
    fn mounting_two_routers_preserves_registration_order() {
        let first = AppRouter::new().get("/a", noop);
        let second = AppRouter::new().get("/b", noop).post("/c", noop);
        let mut server = AppServer::new();
        server.mount(&first).mount(&second);
        let paths: Vec<&str> = server.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn register_consumes_routes_once() {
        let router = AppRouter::new().get("/a", noop);
        let mut server = AppServer::new();
        server.mount(&router);
        assert!(server.register().is_ok());
        assert!(server.routes().is_empty());
        assert!(matches!(server.register(), Err(ServerError::AlreadyRegistered)));
    }

    #[test]
    fn handle_requires_registration() {
        let server = AppServer::new();
        assert!(matches!(server.handle(), Err(ServerError::NotInitialized)));
    }

    #[tokio::test]
    async fn listen_requires_registration() {
        let server = AppServer::new();
        let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
        assert!(matches!(server.listen(addr).await, Err(ServerError::NotInitialized)));
    }

    #[test]
    fn duplicate_routes_resolve_to_first_registration() {
        let router = AppRouter::new().get("/dup", noop).get("/dup", noop);
        let mut server = AppServer::new();
        server.mount(&router);
        // Would panic inside axum on a genuine double-bind.
        assert!(server.register().is_ok());
    }
}
