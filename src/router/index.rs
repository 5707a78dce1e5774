use crate::post::post_controller::LIST_URL;
use crate::post::post_index::post_routes;
use crate::subscription::index::subscription_routes;
use crate::user::index::user_routes;
use crate::utils::templates::redirect;
use actix_web::{HttpResponse, get, web};

#[get("/")]
async fn default() -> HttpResponse {
    redirect(LIST_URL)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(user_routes);
    cfg.configure(post_routes);
    cfg.configure(subscription_routes);
    cfg.service(default);
}
