use super::post_controller::{
    create_post, create_post_form, delete_post, delete_post_confirm, edit_post_form, get_post,
    list_posts, search_posts, update_post,
};
use super::post_model::PostType;
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

/// Mounts the shared create handler for one post kind.
fn create_resource(path: &str, kind: PostType) -> actix_web::Resource {
    web::resource(path)
        .app_data(web::Data::new(kind))
        .route(web::get().to(create_post_form))
        .route(web::post().to(create_post))
}

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/news/").route(web::get().to(list_posts)))
        .service(web::resource("/news/search/").route(web::get().to(search_posts)))
        .service(
            create_resource("/news/create/", PostType::News)
                .wrap(HttpAuthentication::with_fn(verify_token)),
        )
        .service(
            create_resource("/article/create/", PostType::Article)
                .wrap(HttpAuthentication::with_fn(verify_token)),
        )
        .service(web::resource("/news/{id}/").route(web::get().to(get_post)))
        .service(
            web::resource("/news/{id}/edit/")
                .wrap(HttpAuthentication::with_fn(verify_token))
                .route(web::get().to(edit_post_form))
                .route(web::post().to(update_post)),
        )
        .service(
            web::resource("/news/{id}/delete/")
                .wrap(HttpAuthentication::with_fn(verify_token))
                .route(web::get().to(delete_post_confirm))
                .route(web::post().to(delete_post)),
        );
}
