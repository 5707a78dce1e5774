//! In-memory repositories and fixtures for handler tests.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::category::model::Category;
use crate::category::service::CategoryRepository;
use crate::database::Repositories;
use crate::middleware::auth::create_token;
use crate::middleware::error_handler::error_handlers;
use crate::post::post_filter::PostFilter;
use crate::post::post_model::{Post, PostDraft, PostType};
use crate::post::post_service::PostRepository;
use crate::router::index::routes;
use crate::subscription::model::SubscribersCategory;
use crate::subscription::service::SubscriptionRepository;
use crate::user::model::{Author, User};
use crate::user::service::{AuthorRepository, UserRepository};
use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;
use crate::utils::pagination::PageWindow;

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
pub struct MemoryPosts {
    rows: RwLock<Vec<Post>>,
}

impl MemoryPosts {
    pub async fn all(&self) -> Vec<Post> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl PostRepository for MemoryPosts {
    async fn count(&self, filter: &PostFilter) -> Result<u64, CustomError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Post>, CustomError> {
        let rows = self.rows.read().await;
        let mut matching: Vec<Post> = rows.iter().filter(|p| filter.matches(p)).cloned().collect();
        matching.sort_by(|a, b| {
            b.datetime_post
                .cmp(&a.datetime_post)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(match window {
            Some(window) => matching
                .into_iter()
                .skip(window.skip as usize)
                .take(window.limit as usize)
                .collect(),
            None => matching,
        })
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|p| p.id == *id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, CustomError> {
        self.rows.write().await.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: &Post) -> Result<bool, CustomError> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|p| p.id == post.id) {
            Some(row) => {
                *row = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.id != *id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryCategories {
    rows: RwLock<Vec<Category>>,
}

#[async_trait]
impl CategoryRepository for MemoryCategories {
    async fn list(&self) -> Result<Vec<Category>, CustomError> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryAuthors {
    rows: RwLock<Vec<Author>>,
}

#[async_trait]
impl AuthorRepository for MemoryAuthors {
    async fn list(&self) -> Result<Vec<Author>, CustomError> {
        Ok(self.rows.read().await.clone())
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<Author>, CustomError> {
        Ok(self.rows.read().await.iter().find(|a| a.id == *id).cloned())
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> Result<Option<Author>, CustomError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|a| a.user_id == *user_id)
            .cloned())
    }

    async fn insert(&self, author: Author) -> Result<Author, CustomError> {
        self.rows.write().await.push(author.clone());
        Ok(author)
    }
}

#[derive(Default)]
pub struct MemorySubscriptions {
    rows: RwLock<Vec<SubscribersCategory>>,
}

impl MemorySubscriptions {
    pub async fn all(&self) -> Vec<SubscribersCategory> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptions {
    async fn list_for_subscriber(
        &self,
        subscriber_id: &ObjectId,
    ) -> Result<Vec<SubscribersCategory>, CustomError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|s| s.subscriber_id == *subscriber_id)
            .cloned()
            .collect())
    }

    async fn subscribe(&self, subscription: SubscribersCategory) -> Result<bool, CustomError> {
        let mut rows = self.rows.write().await;
        let exists = rows.iter().any(|s| {
            s.subscriber_id == subscription.subscriber_id
                && s.category_id == subscription.category_id
        });
        if exists {
            return Ok(false);
        }
        rows.push(subscription);
        Ok(true)
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    rows: RwLock<Vec<User>>,
}

impl MemoryUsers {
    pub async fn remove(&self, id: &ObjectId) {
        self.rows.write().await.retain(|u| u.id != *id);
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn get(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        Ok(self.rows.read().await.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CustomError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, CustomError> {
        Ok(self.rows.read().await.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, CustomError> {
        Ok(self.rows.read().await.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: User) -> Result<ObjectId, CustomError> {
        let id = user.id;
        self.rows.write().await.push(user);
        Ok(id)
    }

    async fn grant_permissions(&self, id: &ObjectId, perms: &[&str]) -> Result<(), CustomError> {
        let mut rows = self.rows.write().await;
        let user = rows
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or_else(|| CustomError::NotFoundError("User not found".into()))?;
        for perm in perms {
            if !user.permissions.iter().any(|p| p == perm) {
                user.permissions.push(perm.to_string());
            }
        }
        Ok(())
    }
}

/// Every store the app needs, kept as concrete types so tests can inspect them.
#[derive(Clone, Default)]
pub struct TestStores {
    pub posts: Arc<MemoryPosts>,
    pub categories: Arc<MemoryCategories>,
    pub authors: Arc<MemoryAuthors>,
    pub subscriptions: Arc<MemorySubscriptions>,
    pub users: Arc<MemoryUsers>,
}

impl TestStores {
    pub fn repositories(&self) -> Repositories {
        Repositories {
            posts: self.posts.clone(),
            categories: self.categories.clone(),
            authors: self.authors.clone(),
            subscriptions: self.subscriptions.clone(),
            users: self.users.clone(),
        }
    }

    /// App data for a test `App`: config plus every repository.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(test_config()));
        self.repositories().configure(cfg);
    }

    pub async fn add_user(&self, username: &str, permissions: &[&str]) -> User {
        let user = User {
            id: ObjectId::new(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: String::new(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.rows.write().await.push(user.clone());
        user
    }

    pub async fn add_author(&self, user: &User) -> Author {
        let author = Author {
            id: ObjectId::new(),
            user_id: user.id,
            name: user.username.clone(),
            rating: 0,
        };
        self.authors.rows.write().await.push(author.clone());
        author
    }

    pub async fn add_category(&self, name: &str) -> Category {
        let category = Category {
            id: ObjectId::new(),
            name: name.to_string(),
        };
        self.categories.rows.write().await.push(category.clone());
        category
    }

    /// Stores `count` posts, one minute apart; index 0 is the oldest.
    pub async fn seed_posts(&self, author: &Author, count: usize) -> Vec<Post> {
        let start = Utc::now() - Duration::days(1);
        let mut created = Vec::with_capacity(count);
        for i in 0..count {
            let mut post = Post::from_draft(
                PostDraft {
                    author_id: author.id,
                    title: format!("Post {}", i),
                    text: format!("Body of post {}", i),
                    categories: Vec::new(),
                },
                PostType::News,
            );
            post.datetime_post = start + Duration::minutes(i as i64);
            self.posts.rows.write().await.push(post.clone());
            created.push(post);
        }
        created
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        mongodb_uri: String::new(),
        mongodb_db: "test".into(),
        redis_url: None,
        jwt_secret: TEST_SECRET.into(),
    }
}

pub fn bearer(user: &User) -> (&'static str, String) {
    let token = create_token(&user.id.to_hex(), TEST_SECRET).expect("token");
    ("Authorization", format!("Bearer {}", token))
}

/// Url-encodes `pairs` as a form body.
pub fn form(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

pub fn form_post(uri: &str, pairs: &[(&str, &str)]) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form(pairs))
}

pub struct Outcome {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

/// Runs one request through the router and error handlers the server
/// uses, backed by `stores`.
///
/// An error escaping the middleware stack is folded into the same shape.
pub async fn send(stores: &TestStores, req: TestRequest) -> Outcome {
    let app = test::init_service(
        App::new()
            .configure(|cfg| stores.configure(cfg))
            .configure(routes)
            .wrap(error_handlers()),
    )
    .await;

    match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let header_value = |name: header::HeaderName| {
                res.headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let location = header_value(header::LOCATION);
            let set_cookie = header_value(header::SET_COOKIE);
            let body = test::read_body(res).await;
            Outcome {
                status,
                location,
                set_cookie,
                body: String::from_utf8_lossy(&body).into_owned(),
            }
        }
        Err(err) => Outcome {
            status: err.as_response_error().status_code(),
            location: None,
            set_cookie: None,
            body: err.to_string(),
        },
    }
}
