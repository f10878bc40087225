use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use problem::{FieldError, Problem, ProblemResponse};

use crate::domain::error::DomainError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id assigned (or propagated) by the ingress middleware.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
    request_id: Option<String>,
) -> Problem {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.pulse.dev/{}", code))
        .with_code(code)
        .with_instance(instance);

    match request_id {
        Some(id) => problem.with_request_id(id),
        None => problem,
    }
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(
    e: &DomainError,
    instance: &str,
    request_id: Option<String>,
) -> ProblemResponse {
    match e {
        DomainError::Validation { field } => from_parts(
            StatusCode::BAD_REQUEST,
            "USAGE_VALIDATION",
            "Validation error",
            format!("{field} is required"),
            instance,
            request_id,
        )
        .with_errors(vec![FieldError {
            detail: format!("{field} is required"),
            pointer: format!("/{field}"),
        }])
        .into(),
        DomainError::Persistence { .. } => {
            // details stay in the log
            tracing::error!(error = %e, "Storage error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "USAGE_STORAGE",
                "Internal error",
                "An internal storage error occurred",
                instance,
                request_id,
            )
            .into()
        }
    }
}

/// Malformed bodies (bad JSON, wrong types, unparsable timestamps) are client errors too.
pub fn map_json_rejection(
    rejection: &JsonRejection,
    instance: &str,
    request_id: Option<String>,
) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USAGE_INVALID_BODY",
        "Invalid request body",
        rejection.body_text(),
        instance,
        request_id,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_pointer() {
        let resp = map_domain_error(
            &DomainError::validation("email"),
            "/api/register",
            Some("rid-1".into()),
        );
        assert_eq!(resp.0.status, 400);
        assert_eq!(resp.0.code, "USAGE_VALIDATION");
        assert_eq!(resp.0.detail, "email is required");
        assert_eq!(resp.0.request_id.as_deref(), Some("rid-1"));
        assert_eq!(resp.0.errors.unwrap()[0].pointer, "/email");
    }

    #[test]
    fn persistence_maps_to_500_without_leaking_details() {
        let resp = map_domain_error(
            &DomainError::persistence("write /secret/path/users.json: disk full"),
            "/api/activity",
            None,
        );
        assert_eq!(resp.0.status, 500);
        assert_eq!(resp.0.code, "USAGE_STORAGE");
        assert!(!resp.0.detail.contains("/secret/path"));
    }

    #[test]
    fn request_id_is_read_from_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), None);
        headers.insert(REQUEST_ID_HEADER, "abc".parse().unwrap());
        assert_eq!(request_id(&headers).as_deref(), Some("abc"));
    }
}
