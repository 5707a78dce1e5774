use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

use crate::category::model::Category;
use crate::utils::error::CustomError;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, CustomError>;
}

pub struct CategoryService {
    collection: Collection<Category>,
}

impl CategoryService {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Category>("categories");
        CategoryService { collection }
    }
}

#[async_trait]
impl CategoryRepository for CategoryService {
    async fn list(&self) -> Result<Vec<Category>, CustomError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch categories", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::storage("Failed to collect categories", e))
    }
}
