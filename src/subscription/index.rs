use super::controller::{subscribe, subscribe_form};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn subscription_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/subscribe/")
            .wrap(HttpAuthentication::with_fn(verify_token))
            .route(web::get().to(subscribe_form))
            .route(web::post().to(subscribe)),
    );
}
