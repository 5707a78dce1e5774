use mongodb::bson::oid::ObjectId;

use crate::utils::error::CustomError;

/// Bearer tokens and their Redis sessions live this long.
pub const TOKEN_TTL_HOURS: i64 = 24;
pub const SESSION_TTL_SECONDS: u64 = (TOKEN_TTL_HOURS as u64) * 3600;

/// Path ids that do not parse never match a row.
pub fn path_object_id(raw: &str, what: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(raw).map_err(|_| CustomError::NotFoundError(format!("{} not found", what)))
}
