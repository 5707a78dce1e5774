use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::database::RedisService;
use crate::middleware::auth::{Principal, expired_session_cookie, session_cookie};
use crate::middleware::permissions::AUTHOR_PERMISSIONS;
use crate::user::model::{CreateUserRequest, LoginRequest};
use crate::user::service::{self, AuthorRepository, UserRepository};
use crate::utils::config::AppConfig;
use crate::utils::error::{ApiError, CustomError};

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

pub async fn register_user(
    users: web::Data<dyn UserRepository>,
    user_info: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = service::register(users.get_ref(), user_info.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "user_id": user_id.to_hex()
    })))
}

pub async fn login_user(
    users: web::Data<dyn UserRepository>,
    config: web::Data<AppConfig>,
    redis_service: Option<web::Data<RedisService>>,
    login_info: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = service::login(
        users.get_ref(),
        login_info.into_inner(),
        &config.jwt_secret,
        redis_service.as_ref().map(|r| r.get_ref()),
    )
    .await?;

    Ok(HttpResponse::Ok().cookie(session_cookie(&token)).json(json!({
        "success": true,
        "message": "Login successful",
        "httpStatusCode": 200,
        "service": service_name(),
        "token": token
    })))
}

pub async fn logout_user(
    principal: Principal,
    redis_service: Option<web::Data<RedisService>>,
) -> Result<HttpResponse, ApiError> {
    if let Some(redis) = redis_service {
        redis
            .invalidate_session(&principal.user_id.to_hex())
            .await
            .map_err(|e| CustomError::storage("Failed to invalidate session", e))?;
    }

    Ok(HttpResponse::Ok().cookie(expired_session_cookie()).json(json!({
        "success": true,
        "message": "Logged out",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

pub async fn become_author(
    principal: Principal,
    users: web::Data<dyn UserRepository>,
    authors: web::Data<dyn AuthorRepository>,
) -> Result<HttpResponse, ApiError> {
    let author = service::become_author(
        users.get_ref(),
        authors.get_ref(),
        &principal.user_id,
        &AUTHOR_PERMISSIONS,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "You are now an author",
        "httpStatusCode": 200,
        "service": service_name(),
        "author_id": author.id.to_hex()
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use serde_json::Value;

    use super::*;
    use crate::middleware::permissions::{ADD_POST, DELETE_POST};
    use crate::testing::{TestStores, bearer, send};

    fn json_post(uri: &str, body: Value) -> TestRequest {
        TestRequest::post().uri(uri).set_json(body)
    }

    #[actix_web::test]
    async fn register_login_and_become_author() {
        let stores = TestStores::default();

        let registered = send(
            &stores,
            json_post(
                "/auth/user/register",
                json!({"username": "writer", "email": "writer@example.com", "password": "Secret123"}),
            ),
        )
        .await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let duplicate = send(
            &stores,
            json_post(
                "/auth/user/register",
                json!({"username": "writer", "email": "writer@example.com", "password": "Secret123"}),
            ),
        )
        .await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
        let body: Value = serde_json::from_str(&duplicate.body).unwrap();
        assert_eq!(body["error"], "CONFLICT_ERROR");

        let wrong = send(
            &stores,
            json_post(
                "/auth/user/login",
                json!({"username": "writer", "password": "Wrong1234"}),
            ),
        )
        .await;
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

        let login = send(
            &stores,
            json_post(
                "/auth/user/login",
                json!({"username": "writer", "password": "Secret123"}),
            ),
        )
        .await;
        assert_eq!(login.status, StatusCode::OK);
        let cookie = login.set_cookie.unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        let body: Value = serde_json::from_str(&login.body).unwrap();
        let token = body["token"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let res = send(
                &stores,
                TestRequest::post()
                    .uri("/auth/user/become-author")
                    .insert_header(("Authorization", format!("Bearer {}", token))),
            )
            .await;
            assert_eq!(res.status, StatusCode::OK);
        }

        let user = stores
            .users
            .find_by_username("writer")
            .await
            .unwrap()
            .unwrap();
        assert!(user.has_perm(ADD_POST));
        assert!(user.has_perm(DELETE_POST));
        assert_eq!(user.permissions.len(), AUTHOR_PERMISSIONS.len());
        assert_eq!(stores.authors.list().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn weak_password_is_rejected() {
        let stores = TestStores::default();
        let res = send(
            &stores,
            json_post(
                "/auth/user/register",
                json!({"username": "writer", "email": "writer@example.com", "password": "short"}),
            ),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(stores.users.find_by_username("writer").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn logout_without_session_store_succeeds() {
        let stores = TestStores::default();
        let user = stores.add_user("reader", &[]).await;

        let anonymous = send(&stores, TestRequest::post().uri("/auth/user/logout")).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

        let res = send(
            &stores,
            TestRequest::post()
                .uri("/auth/user/logout")
                .insert_header(bearer(&user)),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.set_cookie.unwrap().starts_with("token=;"));
    }
}
