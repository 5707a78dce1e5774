use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpResponse, Result, dev::ServiceResponse};

use crate::utils::templates::{ErrorTemplate, render_template};

/// Renders the 404 page for unmatched routes. Handler errors already carry
/// their own page and pass through untouched.
pub fn not_found<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    if res.response().error().is_some() {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let page = ErrorTemplate::new(StatusCode::NOT_FOUND, "Route does not exist".into());
    let body = render_template(&page)?;
    let new_response = HttpResponse::build(StatusCode::NOT_FOUND)
        .content_type(ContentType::html())
        .body(body);

    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, new_response.map_into_right_body());

    Ok(ErrorHandlerResponse::Response(res))
}
