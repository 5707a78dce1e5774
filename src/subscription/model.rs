use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::category::model::Category;
use crate::utils::forms::{FieldErrors, FormData, parse_id};

/// A user following one category.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubscribersCategory {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub subscriber_id: ObjectId,
    pub category_id: ObjectId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl SubscribersCategory {
    pub fn new(subscriber_id: ObjectId, category_id: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            subscriber_id,
            category_id,
            created_at: Utc::now(),
        }
    }
}

/// Validates the subscribe form; the chosen category must exist.
pub fn validate_subscribe_form(
    data: &FormData,
    categories: &[Category],
) -> Result<ObjectId, FieldErrors> {
    let mut errors = FieldErrors::default();

    let Some(raw) = data.first("category") else {
        errors.add("category", "This field is required.");
        return Err(errors);
    };

    match parse_id(raw).filter(|id| categories.iter().any(|c| c.id == *id)) {
        Some(id) => Ok(id),
        None => {
            errors.add("category", "Select a valid choice.");
            Err(errors)
        }
    }
}
