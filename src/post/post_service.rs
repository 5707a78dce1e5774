use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::post::post_filter::PostFilter;
use crate::post::post_model::Post;
use crate::utils::error::CustomError;
use crate::utils::pagination::PageWindow;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn count(&self, filter: &PostFilter) -> Result<u64, CustomError>;

    /// Posts matching `filter`, newest first. `window` limits the slice.
    async fn list(
        &self,
        filter: &PostFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Post>, CustomError>;

    async fn get(&self, id: &ObjectId) -> Result<Option<Post>, CustomError>;

    async fn insert(&self, post: Post) -> Result<Post, CustomError>;

    /// Returns `false` when no stored post has `post.id`.
    async fn update(&self, post: &Post) -> Result<bool, CustomError>;

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError>;
}

pub struct PostService {
    collection: Collection<Post>,
}

impl PostService {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Post>("posts");
        PostService { collection }
    }
}

#[async_trait]
impl PostRepository for PostService {
    async fn count(&self, filter: &PostFilter) -> Result<u64, CustomError> {
        self.collection
            .count_documents(filter.to_document())
            .await
            .map_err(|e| CustomError::storage("Failed to count posts", e))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        window: Option<PageWindow>,
    ) -> Result<Vec<Post>, CustomError> {
        let mut find = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "datetime_post": -1, "_id": -1 });

        if let Some(window) = window {
            find = find.skip(window.skip).limit(window.limit as i64);
        }

        let cursor = find
            .await
            .map_err(|e| CustomError::storage("Failed to fetch posts", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::storage("Failed to collect posts", e))
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<Post>, CustomError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch post", e))
    }

    async fn insert(&self, post: Post) -> Result<Post, CustomError> {
        self.collection
            .insert_one(&post)
            .await
            .map_err(|e| CustomError::storage("Failed to create post", e))?;

        Ok(post)
    }

    async fn update(&self, post: &Post) -> Result<bool, CustomError> {
        let result = self
            .collection
            .replace_one(doc! { "_id": post.id }, post)
            .await
            .map_err(|e| CustomError::storage("Failed to update post", e))?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| CustomError::storage("Failed to delete post", e))?;

        Ok(result.deleted_count > 0)
    }
}
