use crate::api::rest::{dashboard, handlers};
use crate::domain::service::Service;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;

pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route("/api/register", post(handlers::register))
        .route(
            "/api/activity",
            post(handlers::record_activity).get(handlers::list_activity),
        )
        .route("/api/users", get(handlers::list_users))
        .route("/api/stats", get(handlers::stats))
        .route("/dashboard", get(dashboard::serve_dashboard))
        .layer(Extension(service))
}
