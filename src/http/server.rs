//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app with a single fallback handler
//! - Wire up layers (request id, tracing, timeout, body limit)
//! - Run the core router for every request
//! - Serve until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::CraftConfig;
use crate::http::request::{into_core_request, X_REQUEST_ID};
use crate::http::response::internal_error;
use crate::routing::Router as CraftRouter;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<CraftRouter>,
    pub max_body_bytes: usize,
}

/// HTTP front end for a [`CraftRouter`].
pub struct HttpServer {
    app: Router,
    config: CraftConfig,
}

impl HttpServer {
    pub fn new(config: CraftConfig, router: Arc<CraftRouter>) -> Self {
        let state = AppState {
            router,
            max_body_bytes: config.server.max_body_bytes,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// The axum app, for serving or for driving with `oneshot` in tests.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Build the axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &CraftConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::SERVER,
                HeaderValue::from_static("craft"),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.server.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &CraftConfig {
        &self.config
    }
}

/// Fallback handler: every request goes through the core router.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let core = match into_core_request(request, state.max_body_bytes).await {
        Ok(core) => core,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected unreadable request");
            return (StatusCode::BAD_REQUEST, "400 Bad Request").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %core.method,
        path = %core.path,
        "Dispatching request"
    );

    let router = Arc::clone(&state.router);
    match tokio::task::spawn_blocking(move || router.dispatch(&core)).await {
        Ok(Ok(response)) => response.into_response(),
        Ok(Err(e)) => internal_error(&e),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
        }
    }
}
