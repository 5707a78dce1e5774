use log::info;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

fn session_key(user_id: &str) -> String {
    format!("session:{}", user_id)
}

fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

/// Bearer token sessions kept in Redis.
///
/// `session:{user}` holds the user's current token and `token:{token}` maps
/// back to the user, so one login replaces the previous one.
#[derive(Clone)]
pub struct RedisService {
    connection: MultiplexedConnection,
}

impl RedisService {
    pub async fn connect(redis_url: &str) -> Result<Self, String> {
        let client =
            Client::open(redis_url).map_err(|e| format!("Failed to create Redis client: {}", e))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| format!("Failed to connect to Redis: {}", e))?;

        info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    pub async fn store_session(
        &self,
        user_id: &str,
        token: &str,
        expiry_seconds: u64,
    ) -> Result<(), String> {
        self.invalidate_session(user_id).await?;

        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(session_key(user_id), token, expiry_seconds)
            .await
            .map_err(|e| format!("Failed to store session: {}", e))?;
        conn.set_ex::<_, _, ()>(token_key(token), user_id, expiry_seconds)
            .await
            .map_err(|e| format!("Failed to store token mapping: {}", e))?;

        Ok(())
    }

    /// User id owning `token`, if the session is still live.
    pub async fn validate_session(&self, token: &str) -> Result<Option<String>, String> {
        let mut conn = self.connection.clone();
        conn.get(token_key(token))
            .await
            .map_err(|e| format!("Failed to validate session: {}", e))
    }

    pub async fn invalidate_session(&self, user_id: &str) -> Result<(), String> {
        let mut conn = self.connection.clone();

        let current: Option<String> = conn
            .get(session_key(user_id))
            .await
            .map_err(|e| format!("Failed to get session: {}", e))?;

        if let Some(token) = current {
            conn.del::<_, ()>(token_key(&token))
                .await
                .map_err(|e| format!("Failed to delete token: {}", e))?;
        }

        conn.del::<_, ()>(session_key(user_id))
            .await
            .map_err(|e| format!("Failed to delete session: {}", e))
    }
}
