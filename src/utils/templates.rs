use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use askama::Template;
use chrono::{DateTime, Utc};
use log::error;

use crate::utils::error::CustomError;

pub const DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M";

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn render_template<T: Template>(template: &T) -> Result<String, CustomError> {
    template.render().map_err(|err| {
        error!("template rendering failed: {}", err);
        CustomError::InternalServerError("Failed to render page".into())
    })
}

pub fn html<T: Template>(template: &T) -> Result<HttpResponse, CustomError> {
    html_with_status(template, StatusCode::OK)
}

pub fn html_with_status<T: Template>(
    template: &T,
    status: StatusCode,
) -> Result<HttpResponse, CustomError> {
    let body = render_template(template)?;
    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body))
}

/// Plain redirect after a successful form post.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", location))
        .finish()
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub reason: String,
    pub message: String,
}

impl ErrorTemplate {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        }
    }
}
