use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::dev::{Payload, ServiceRequest};
use actix_web::http::header::Header as _;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, web};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::database::RedisService;
use crate::utils::config::AppConfig;
use crate::utils::error::CustomError;
use crate::utils::helpers::{SESSION_TTL_SECONDS, TOKEN_TTL_HOURS};

/// Cookie carrying the login token for browser form submissions.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

/// The authenticated user of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: ObjectId,
}

impl FromRequest for Principal {
    type Error = CustomError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let principal = req
            .extensions()
            .get::<Claims>()
            .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".into()))
            .and_then(|claims| {
                ObjectId::parse_str(&claims.id)
                    .map(|user_id| Principal { user_id })
                    .map_err(|_| CustomError::UnauthorizedError("Invalid user id in token".into()))
            });
        ready(principal)
    }
}

/// Raw token presented by the client: the `Authorization: Bearer` header,
/// or the login cookie when the header is absent.
#[derive(Debug, Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl FromRequest for SessionToken {
    type Error = CustomError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = Authorization::<Bearer>::parse(req)
            .ok()
            .map(|auth| auth.into_scheme().token().to_string())
            .or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
            .filter(|token| !token.is_empty());

        ready(
            token
                .map(SessionToken)
                .ok_or_else(|| CustomError::UnauthorizedError("Not authenticated".into())),
        )
    }
}

pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(TOKEN_TTL_HOURS))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

fn unauthorized(message: &str) -> Error {
    CustomError::UnauthorizedError(message.to_string()).into()
}

/// Verify JWT token and, when Redis is configured, the live session.
pub async fn verify_token(
    req: ServiceRequest,
    credentials: SessionToken,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(config) = req.app_data::<web::Data<AppConfig>>().cloned() else {
        return Err((
            CustomError::InternalServerError("Missing configuration".into()).into(),
            req,
        ));
    };

    let token = credentials.token();
    let token_data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => data,
        Err(e) => {
            debug!("rejected token: {}", e);
            return Err((unauthorized("Invalid token"), req));
        }
    };

    let Some(redis_service) = req.app_data::<web::Data<RedisService>>().cloned() else {
        req.extensions_mut().insert(token_data.claims);
        return Ok(req);
    };

    match redis_service.validate_session(token).await {
        Ok(Some(stored_user_id)) if stored_user_id == token_data.claims.id => {
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
        Ok(Some(_)) => Err((unauthorized("Session mismatch"), req)),
        Ok(None) => Err((unauthorized("Session expired or invalid"), req)),
        Err(e) => {
            warn!("session check unavailable, accepting bare JWT: {}", e);
            req.extensions_mut().insert(token_data.claims);
            Ok(req)
        }
    }
}

pub fn create_token(user_id: &str, secret: &str) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| CustomError::InternalServerError("Invalid token expiry".into()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
}

/// Create a JWT token and store its session in Redis.
pub async fn create_token_with_session(
    user_id: &str,
    secret: &str,
    redis_service: &RedisService,
) -> Result<String, CustomError> {
    let token = create_token(user_id, secret)?;

    redis_service
        .store_session(user_id, &token, SESSION_TTL_SECONDS)
        .await
        .map_err(|e| CustomError::storage("Failed to store session", e))?;

    Ok(token)
}
