use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, Result, dev::ServiceResponse};

use crate::middleware::not_found::not_found;
use crate::utils::error::{ApiError, CustomError};
use crate::utils::templates::{ErrorTemplate, render_template};

/// Error pages for the whole app: unmatched routes and framework failures.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, not_found)
        .default_handler(handle_error)
}

/// Gives framework-level failures (auth middleware, body extractors) the
/// same error page as handler errors.
///
/// Responses a handler built itself, such as a form re-rendered with a 400,
/// and responses from our own error types pass through unchanged.
pub fn handle_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let Some(error) = res.response().error() else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };
    if error.as_error::<CustomError>().is_some() || error.as_error::<ApiError>().is_some() {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let status = res.status();
    let body = render_template(&ErrorTemplate::new(status, error.to_string()))?;
    let mut new_response = HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body);
    for (name, value) in res.response().headers() {
        if name.as_str().eq_ignore_ascii_case("www-authenticate") {
            new_response.headers_mut().insert(name.clone(), value.clone());
        }
    }

    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());

    Ok(ErrorHandlerResponse::Response(res))
}
