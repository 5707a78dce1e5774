mod db;
mod redis;

use std::sync::Arc;

use actix_web::web;
use mongodb::Database;

pub use self::db::connect_to_mongo;
pub use self::redis::RedisService;

use crate::category::service::{CategoryRepository, CategoryService};
use crate::post::post_service::{PostRepository, PostService};
use crate::subscription::service::{SubscriptionRepository, SubscriptionService};
use crate::user::service::{AuthorRepository, AuthorService, UserRepository, UserService};

/// Storage handles shared by every worker.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Creates the indexes the repositories rely on. Safe to run on every start.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    SubscriptionService::new(db).ensure_indexes().await
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            posts: Arc::new(PostService::new(db)),
            categories: Arc::new(CategoryService::new(db)),
            authors: Arc::new(AuthorService::new(db)),
            subscriptions: Arc::new(SubscriptionService::new(db)),
            users: Arc::new(UserService::new(db)),
        }
    }

    /// Registers each repository as `web::Data<dyn Trait>`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::from(self.posts.clone()))
            .app_data(web::Data::from(self.categories.clone()))
            .app_data(web::Data::from(self.authors.clone()))
            .app_data(web::Data::from(self.subscriptions.clone()))
            .app_data(web::Data::from(self.users.clone()));
    }
}
