use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    ActivityListDto, ActivityReq, RegisterReq, RegisterResp, StatsDto, SuccessResp, UserListDto,
};
use crate::api::rest::error::{map_domain_error, map_json_rejection, request_id};
use crate::domain::service::Service;
use problem::ProblemResponse;

/// Register a user; repeat registrations return the stored user.
pub async fn register(
    uri: Uri,
    headers: HeaderMap,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<RegisterReq>, JsonRejection>,
) -> Result<Json<RegisterResp>, ProblemResponse> {
    let Json(req_body) = payload
        .map_err(|rej| map_json_rejection(&rej, uri.path(), request_id(&headers)))?;
    info!("Registering user: {:?}", req_body.id);

    match svc.register(req_body.into()).await {
        Ok(registration) => Ok(Json(RegisterResp::from(registration))),
        Err(e) => {
            if !e.is_validation() {
                error!("Failed to register user: {}", e);
            }
            Err(map_domain_error(&e, uri.path(), request_id(&headers)))
        }
    }
}

/// Record one activity event.
pub async fn record_activity(
    uri: Uri,
    headers: HeaderMap,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<ActivityReq>, JsonRejection>,
) -> Result<Json<SuccessResp>, ProblemResponse> {
    let Json(req_body) = payload
        .map_err(|rej| map_json_rejection(&rej, uri.path(), request_id(&headers)))?;

    match svc.record_activity(req_body.into()).await {
        Ok(_) => Ok(Json(SuccessResp { success: true })),
        Err(e) => {
            if !e.is_validation() {
                error!("Failed to record activity: {}", e);
            }
            Err(map_domain_error(&e, uri.path(), request_id(&headers)))
        }
    }
}

pub async fn list_users(Extension(svc): Extension<Arc<Service>>) -> Json<UserListDto> {
    let users = svc.list_users().await.into_iter().map(Into::into).collect();
    Json(UserListDto { users })
}

pub async fn list_activity(Extension(svc): Extension<Arc<Service>>) -> Json<ActivityListDto> {
    let activity = svc
        .list_activity()
        .await
        .into_iter()
        .map(Into::into)
        .collect();
    Json(ActivityListDto { activity })
}

pub async fn stats(Extension(svc): Extension<Arc<Service>>) -> Json<StatsDto> {
    Json(svc.stats().await.into())
}
