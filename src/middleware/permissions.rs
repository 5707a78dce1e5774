use log::info;

use crate::middleware::auth::Principal;
use crate::user::model::User;
use crate::user::service::UserRepository;
use crate::utils::error::CustomError;

pub const ADD_POST: &str = "news.add_post";
pub const CHANGE_POST: &str = "news.change_post";
pub const DELETE_POST: &str = "news.delete_post";

/// Capabilities handed out to authors.
pub const AUTHOR_PERMISSIONS: [&str; 3] = [ADD_POST, CHANGE_POST, DELETE_POST];

/// Loads the principal's user and checks it holds `capability`.
pub async fn require_permission(
    users: &dyn UserRepository,
    principal: &Principal,
    capability: &str,
) -> Result<User, CustomError> {
    let user = users
        .get(&principal.user_id)
        .await?
        .ok_or_else(|| CustomError::PermissionDenied("Unknown user".into()))?;

    if !user.has_perm(capability) {
        info!("user {} denied {}", user.id, capability);
        return Err(CustomError::PermissionDenied(format!(
            "Missing permission {}",
            capability
        )));
    }

    Ok(user)
}
