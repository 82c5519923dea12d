//! MongoDB 惰性游标
//!
//! 驱动游标在首次消费时才打开，之前的塑形调用只修改查询参数

use crate::adapter::DriverCursor;
use crate::adapter::mongodb::utils;
use crate::error::QuickDocResult;
use crate::types::FindOptions;
use async_trait::async_trait;
use bson::Document;
use futures::TryStreamExt;
use ::mongodb::{Collection, Cursor};

pub struct MongoCursor {
    collection: Collection<Document>,
    filter: Document,
    options: FindOptions,
    cursor: Option<Cursor<Document>>,
    peeked: Option<Document>,
}

impl MongoCursor {
    pub fn new(collection: Collection<Document>, filter: Document, options: FindOptions) -> Self {
        Self {
            collection,
            filter,
            options,
            cursor: None,
            peeked: None,
        }
    }

    async fn pull(&mut self) -> QuickDocResult<Option<Document>> {
        if self.cursor.is_none() {
            let opened = self
                .collection
                .find(self.filter.clone(), utils::to_find_options(&self.options))
                .await?;
            self.cursor = Some(opened);
        }

        match self.cursor.as_mut() {
            Some(cursor) => Ok(cursor.try_next().await?),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DriverCursor for MongoCursor {
    fn filter(&mut self, filter: Document) {
        self.filter = filter;
    }

    fn projection(&mut self, projection: Document) {
        self.options.projection = Some(projection);
    }

    fn sort(&mut self, sort: Document) {
        self.options.sort = Some(sort);
    }

    fn skip(&mut self, skip: u64) {
        self.options.skip = Some(skip);
    }

    fn limit(&mut self, limit: i64) {
        self.options.limit = Some(limit);
    }

    async fn count(&mut self) -> QuickDocResult<u64> {
        Ok(self
            .collection
            .count_documents(self.filter.clone(), None)
            .await?)
    }

    async fn has_next(&mut self) -> QuickDocResult<bool> {
        if self.peeked.is_none() {
            self.peeked = self.pull().await?;
        }
        Ok(self.peeked.is_some())
    }

    async fn next(&mut self) -> QuickDocResult<Option<Document>> {
        if let Some(document) = self.peeked.take() {
            return Ok(Some(document));
        }
        self.pull().await
    }
}
