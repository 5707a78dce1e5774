use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

/// Looks up display names for `ids`, skipping ids that are not in `categories`.
pub fn category_names(ids: &[ObjectId], categories: &[Category]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| categories.iter().find(|c| c.id == *id))
        .map(|c| c.name.clone())
        .collect()
}
