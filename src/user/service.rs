use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::database::RedisService;
use crate::middleware::auth::{create_token, create_token_with_session};
use crate::user::model::{Author, CreateUserRequest, LoginRequest, User};
use crate::utils::error::CustomError;
use crate::utils::{hashing, password_validation};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: &ObjectId) -> Result<Option<User>, CustomError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CustomError>;

    async fn username_exists(&self, username: &str) -> Result<bool, CustomError>;

    async fn email_exists(&self, email: &str) -> Result<bool, CustomError>;

    async fn insert(&self, user: User) -> Result<ObjectId, CustomError>;

    /// Adds capabilities the user does not hold yet.
    async fn grant_permissions(&self, id: &ObjectId, perms: &[&str]) -> Result<(), CustomError>;
}

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Author>, CustomError>;

    async fn get(&self, id: &ObjectId) -> Result<Option<Author>, CustomError>;

    async fn find_by_user(&self, user_id: &ObjectId) -> Result<Option<Author>, CustomError>;

    async fn insert(&self, author: Author) -> Result<Author, CustomError>;
}

/// Adds `perms` to a user and bumps `updated_at`, stored as a BSON date
/// like every other timestamp.
fn grant_update(perms: &[&str], now: DateTime<Utc>) -> Document {
    let perms: Vec<String> = perms.iter().map(|p| p.to_string()).collect();
    doc! {
        "$addToSet": { "permissions": { "$each": perms } },
        "$set": { "updated_at": mongodb::bson::DateTime::from_chrono(now) },
    }
}

pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<User>("users");
        UserService { collection }
    }
}

#[async_trait]
impl UserRepository for UserService {
    async fn get(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch user", e))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, CustomError> {
        self.collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch user", e))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! { "username": username })
            .await
            .map_err(|e| CustomError::storage("Failed to check username existence", e))?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .await
            .map_err(|e| CustomError::storage("Failed to check email existence", e))?;
        Ok(count > 0)
    }

    async fn insert(&self, user: User) -> Result<ObjectId, CustomError> {
        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| CustomError::storage("Failed to create user", e))?;
        Ok(user.id)
    }

    async fn grant_permissions(&self, id: &ObjectId, perms: &[&str]) -> Result<(), CustomError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                grant_update(perms, Utc::now()),
            )
            .await
            .map_err(|e| CustomError::storage("Failed to grant permissions", e))?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("User not found".into()));
        }
        Ok(())
    }
}

pub struct AuthorService {
    collection: Collection<Author>,
}

impl AuthorService {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Author>("authors");
        AuthorService { collection }
    }
}

#[async_trait]
impl AuthorRepository for AuthorService {
    async fn list(&self) -> Result<Vec<Author>, CustomError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch authors", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::storage("Failed to collect authors", e))
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<Author>, CustomError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch author", e))
    }

    async fn find_by_user(&self, user_id: &ObjectId) -> Result<Option<Author>, CustomError> {
        self.collection
            .find_one(doc! { "user_id": user_id })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch author", e))
    }

    async fn insert(&self, author: Author) -> Result<Author, CustomError> {
        self.collection
            .insert_one(&author)
            .await
            .map_err(|e| CustomError::storage("Failed to create author", e))?;
        Ok(author)
    }
}

/// Registers a new account with no capabilities.
pub async fn register(
    users: &dyn UserRepository,
    request: CreateUserRequest,
) -> Result<ObjectId, CustomError> {
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(CustomError::ValidationError("Username is required".into()));
    }
    password_validation::validate_email(&request.email)?;
    password_validation::validate_password(&request.password)?;

    if users.email_exists(&request.email).await? {
        return Err(CustomError::ConflictError("Email already exists".into()));
    }
    if users.username_exists(&username).await? {
        return Err(CustomError::ConflictError("Username already exists".into()));
    }

    let hashed_password = hashing::hash_password(&request.password)
        .map_err(|e| CustomError::storage("Failed to hash password", e))?;

    let now = Utc::now();
    let user = User {
        id: ObjectId::new(),
        username,
        email: request.email,
        password: hashed_password,
        permissions: Vec::new(),
        is_superuser: false,
        created_at: now,
        updated_at: now,
    };

    let id = users.insert(user).await?;
    info!("registered user {}", id);
    Ok(id)
}

pub async fn authenticate_user(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<User, CustomError> {
    let user = users
        .find_by_username(username)
        .await?
        .ok_or_else(|| CustomError::UnauthorizedError("Invalid credentials".to_string()))?;

    if !hashing::verify_password(password, &user.password)
        .map_err(|_| CustomError::UnauthorizedError("Invalid credentials".to_string()))?
    {
        return Err(CustomError::UnauthorizedError(
            "Invalid credentials".to_string(),
        ));
    }

    Ok(user)
}

/// Checks credentials and issues a bearer token.
pub async fn login(
    users: &dyn UserRepository,
    login_data: LoginRequest,
    secret: &str,
    redis_service: Option<&RedisService>,
) -> Result<String, CustomError> {
    let user = authenticate_user(users, &login_data.username, &login_data.password).await?;
    let user_id = user.id.to_hex();

    match redis_service {
        Some(redis) => create_token_with_session(&user_id, secret, redis).await,
        None => create_token(&user_id, secret),
    }
}

/// Makes the user an author: grants the post capabilities and creates the
/// author row when it does not exist yet.
pub async fn become_author(
    users: &dyn UserRepository,
    authors: &dyn AuthorRepository,
    user_id: &ObjectId,
    perms: &[&str],
) -> Result<Author, CustomError> {
    let user = users
        .get(user_id)
        .await?
        .ok_or_else(|| CustomError::NotFoundError("User not found".into()))?;

    users.grant_permissions(&user.id, perms).await?;

    if let Some(author) = authors.find_by_user(&user.id).await? {
        return Ok(author);
    }

    let author = authors
        .insert(Author {
            id: ObjectId::new(),
            user_id: user.id,
            name: user.username,
            rating: 0,
        })
        .await?;
    info!("user {} became author {}", user_id, author.id);
    Ok(author)
}
