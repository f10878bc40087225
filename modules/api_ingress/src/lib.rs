//! HTTP host: wraps module routes in the shared middleware stack and serves them.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Module name, also the key of its section under `modules:` in the config.
pub const MODULE_NAME: &str = "api_ingress";

pub struct ApiIngress {
    config: ApiIngressConfig,
    /// Handler timeout; `None` disables the layer.
    timeout: Option<Duration>,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig, timeout: Option<Duration>) -> Self {
        Self { config, timeout }
    }

    /// Add `/health` and the middleware stack around the given module routes.
    pub fn build_router(&self, routes: Router) -> Router {
        tracing::debug!("Building router");
        let mut router = routes.route("/health", get(web::health_check));

        // Layers are listed innermost first; a request passes them bottom-up:
        // BodyLimit -> CORS -> SetRequestId -> PropagateRequestId -> Trace -> push_req_id -> Timeout
        if let Some(timeout) = self.timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router = router
            .layer(from_fn(crate::request_id::push_req_id_to_extensions))
            .layer(crate::request_id::create_trace_layer());

        let x_request_id = crate::request_id::header();
        router = router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(
                x_request_id,
                crate::request_id::MakeReqId,
            ));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes))
    }

    /// Bind `addr` and serve until `cancel` fires.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind tcp listener on {addr}"))?;
        serve_on(listener, router, cancel).await
    }
}

/// Serve on an already-bound listener with graceful shutdown on cancel.
pub async fn serve_on(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
