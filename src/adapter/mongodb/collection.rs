//! MongoDB 集合适配

use crate::adapter::{DriverCollection, DriverCursor};
use crate::adapter::mongodb::{utils, MongoCursor};
use crate::error::QuickDocResult;
use crate::types::*;
use async_trait::async_trait;
use bson::Document;
use ::mongodb::options as mongo_options;
use ::mongodb::Collection;
use rat_logger::debug;

/// MongoDB 集合适配器
#[derive(Debug, Clone)]
pub struct MongoCollectionAdapter {
    collection: Collection<Document>,
}

impl MongoCollectionAdapter {
    pub fn new(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    fn update_options(options: &UpdateOptions) -> mongo_options::UpdateOptions {
        let mut update_options = mongo_options::UpdateOptions::default();
        update_options.upsert = Some(options.upsert);
        update_options.write_concern = options.write_concern.as_ref().map(utils::to_write_concern);
        update_options
    }

    fn delete_options(options: &DeleteOptions) -> mongo_options::DeleteOptions {
        let mut delete_options = mongo_options::DeleteOptions::default();
        delete_options.write_concern = options.write_concern.as_ref().map(utils::to_write_concern);
        delete_options
    }
}

#[async_trait]
impl DriverCollection for MongoCollectionAdapter {
    fn name(&self) -> &str {
        self.collection.name()
    }

    async fn count_documents(&self, filter: Document) -> QuickDocResult<u64> {
        Ok(self.collection.count_documents(filter, None).await?)
    }

    async fn create_indexes(&self, indexes: Vec<IndexModel>) -> QuickDocResult<Vec<String>> {
        let models = indexes.into_iter().map(utils::to_index_model).collect::<Vec<_>>();
        debug!("创建MongoDB索引: 集合={}, 数量={}", self.name(), models.len());
        let result = self.collection.create_indexes(models, None).await?;
        Ok(result.index_names)
    }

    async fn insert_one(
        &self,
        document: Document,
        write_concern: &WriteConcernLevel,
    ) -> QuickDocResult<InsertOutcome> {
        let mut options = mongo_options::InsertOneOptions::default();
        options.write_concern = Some(utils::to_write_concern(write_concern));

        let result = self.collection.insert_one(document, options).await?;
        Ok(InsertOutcome {
            inserted_id: result.inserted_id,
        })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome> {
        let result = self
            .collection
            .update_one(filter, update, Self::update_options(options))
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome> {
        let result = self
            .collection
            .update_many(filter, update, Self::update_options(options))
            .await?;
        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(
        &self,
        filter: Document,
        options: &DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        let result = self
            .collection
            .delete_one(filter, Self::delete_options(options))
            .await?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn delete_many(
        &self,
        filter: Document,
        options: &DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        let result = self
            .collection
            .delete_many(filter, Self::delete_options(options))
            .await?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn find_one(&self, filter: Document) -> QuickDocResult<Option<Document>> {
        Ok(self.collection.find_one(filter, None).await?)
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> QuickDocResult<Option<Box<dyn DriverCursor>>> {
        Ok(Some(Box::new(MongoCursor::new(
            self.collection.clone(),
            filter,
            options,
        ))))
    }
}
