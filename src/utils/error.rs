use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::utils::templates::ErrorTemplate;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("Unauthorized: {0}")]
    UnauthorizedError(String),

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Permission Denied: {0}")]
    PermissionDenied(String),

    #[error("Not Found: {0}")]
    NotFoundError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl CustomError {
    /// Wraps a persistence failure, logging the underlying cause.
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, err);
        CustomError::InternalServerError(context.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match *self {
            CustomError::UnauthorizedError(..) => "UNAUTHORIZED_ERROR",
            CustomError::ConflictError(..) => "CONFLICT_ERROR",
            CustomError::InternalServerError(..) => "INTERNAL_SERVER_ERROR",
            CustomError::PermissionDenied(..) => "PERMISSION_DENIED",
            CustomError::NotFoundError(..) => "NOT_FOUND_ERROR",
            CustomError::ValidationError(..) => "VALIDATION_ERROR",
        }
    }
}

impl ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::UnauthorizedError(..) => StatusCode::UNAUTHORIZED,
            CustomError::ConflictError(..) => StatusCode::CONFLICT,
            CustomError::InternalServerError(..) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::PermissionDenied(..) => StatusCode::FORBIDDEN,
            CustomError::NotFoundError(..) => StatusCode::NOT_FOUND,
            CustomError::ValidationError(..) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let page = ErrorTemplate::new(self.status_code(), self.to_string());
        match askama::Template::render(&page) {
            Ok(body) => HttpResponse::build(self.status_code())
                .content_type(ContentType::html())
                .body(body),
            Err(err) => {
                error!("failed to render error page: {}", err);
                HttpResponse::build(self.status_code()).body(self.to_string())
            }
        }
    }
}

/// JSON flavoured error used by the account API.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CustomError);

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.0.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = json!({
            "success": false,
            "message": self.0.to_string(),
            "httpStatusCode": self.status_code().as_u16(),
            "error": self.0.kind(),
            "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        });

        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            CustomError::NotFoundError("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CustomError::PermissionDenied("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(CustomError::ConflictError("x".into())).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn html_error_page_carries_message() {
        let response = CustomError::NotFoundError("Post not found".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/html"));
    }
}
