use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

use crate::subscription::model::SubscribersCategory;
use crate::utils::error::CustomError;

const DUPLICATE_KEY: i32 = 11000;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn list_for_subscriber(
        &self,
        subscriber_id: &ObjectId,
    ) -> Result<Vec<SubscribersCategory>, CustomError>;

    /// Stores the subscription unless the subscriber already follows the
    /// category. Returns whether a row was written.
    async fn subscribe(&self, subscription: SubscribersCategory) -> Result<bool, CustomError>;
}

pub struct SubscriptionService {
    collection: Collection<SubscribersCategory>,
}

impl SubscriptionService {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<SubscribersCategory>("subscribers_categories");
        SubscriptionService { collection }
    }

    /// One row per (subscriber, category), enforced by the store.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! { "subscriber_id": 1, "category_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl SubscriptionRepository for SubscriptionService {
    async fn list_for_subscriber(
        &self,
        subscriber_id: &ObjectId,
    ) -> Result<Vec<SubscribersCategory>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "subscriber_id": subscriber_id })
            .await
            .map_err(|e| CustomError::storage("Failed to fetch subscriptions", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::storage("Failed to collect subscriptions", e))
    }

    async fn subscribe(&self, subscription: SubscribersCategory) -> Result<bool, CustomError> {
        let mut on_insert = to_document(&subscription)
            .map_err(|e| CustomError::storage("Failed to encode subscription", e))?;
        on_insert.remove("subscriber_id");
        on_insert.remove("category_id");

        let result = self
            .collection
            .update_one(
                doc! {
                    "subscriber_id": subscription.subscriber_id,
                    "category_id": subscription.category_id,
                },
                doc! { "$setOnInsert": on_insert },
            )
            .upsert(true)
            .await;

        match result {
            Ok(result) => Ok(result.upserted_id.is_some()),
            // A concurrent upsert won the race on the unique index.
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(CustomError::storage("Failed to create subscription", e)),
        }
    }
}
