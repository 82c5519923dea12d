//! # 操作分发
//!
//! 文档类型上的每个操作都按同样的步骤执行：
//! 1. 在 `connection_wait` 内获取连接，不可用时直接返回 `ConnectionUnavailable`
//! 2. 在连接的目标库中定位集合
//! 3. 驱动调用与 `operation_timeout` 竞速，超时返回 `OperationTimeout`
//! 4. 用描述中的工厂函数还原结果
//!
//! 超时只是放弃等待，底层请求可能仍然在服务端生效

use crate::adapter::DriverCollection;
use crate::connection::{race_timeout, Raced};
use crate::error::{QuickDocError, QuickDocResult};
use crate::odm::cursor::DocumentCursor;
use crate::odm::document::DocumentType;
use crate::odm::traits::Document;
use crate::types::*;
use bson::{doc, Document as BsonDocument};
use rat_logger::warn;
use std::future::Future;
use std::sync::Arc;

impl<T: Send + 'static> DocumentType<T> {
    fn timeout_error(&self, operation: &str) -> QuickDocError {
        QuickDocError::OperationTimeout {
            operation: operation.to_string(),
            collection: self.collection.clone(),
            timeout_ms: self.options.operation_timeout_ms,
        }
    }

    /// 获取连接并在超时限制内执行驱动调用
    async fn run<R, F, Fut>(&self, operation: &'static str, body: F) -> QuickDocResult<R>
    where
        F: FnOnce(Arc<dyn DriverCollection>) -> Fut,
        Fut: Future<Output = QuickDocResult<R>>,
    {
        let client = self.connection.acquire(self.options.connection_wait()).await?;
        let collection = client.collection(&self.collection);
        crate::debug_log!(
            "执行操作: {} 集合={}.{}",
            operation,
            client.database_name(),
            self.collection
        );

        match race_timeout(self.options.operation_timeout(), body(collection)).await {
            Raced::Settled(result) => result,
            Raced::Elapsed => {
                warn!(
                    "操作超时: {} 集合={} 超过 {}ms",
                    operation, self.collection, self.options.operation_timeout_ms
                );
                Err(self.timeout_error(operation))
            }
        }
    }

    fn update_options(&self, mut options: UpdateOptions) -> UpdateOptions {
        if options.write_concern.is_none() {
            options.write_concern = Some(self.options.write_concern.clone());
        }
        options
    }

    fn delete_options(&self, mut options: DeleteOptions) -> DeleteOptions {
        if options.write_concern.is_none() {
            options.write_concern = Some(self.options.write_concern.clone());
        }
        options
    }

    /// 统计匹配的文档数
    pub async fn count(&self, filter: BsonDocument) -> QuickDocResult<u64> {
        self.run("count", |collection| async move {
            collection.count_documents(filter).await
        })
        .await
    }

    /// 批量创建索引，返回索引名
    pub async fn create_indexes(&self, indexes: Vec<IndexModel>) -> QuickDocResult<Vec<String>> {
        self.run("create_indexes", |collection| async move {
            collection.create_indexes(indexes).await
        })
        .await
    }

    /// 创建单个索引，返回索引名
    pub async fn create_index(
        &self,
        keys: BsonDocument,
        options: IndexOptions,
    ) -> QuickDocResult<String> {
        let index = IndexModel::new(keys, options);
        let fallback = index.resolved_name();
        let names = self.create_indexes(vec![index]).await?;
        Ok(names.into_iter().next().unwrap_or(fallback))
    }

    pub async fn update_one(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
        options: UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome> {
        let options = self.update_options(options);
        self.run("update_one", |collection| async move {
            collection.update_one(filter, update, &options).await
        })
        .await
    }

    pub async fn update_many(
        &self,
        filter: BsonDocument,
        update: BsonDocument,
        options: UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome> {
        let options = self.update_options(options);
        self.run("update_many", |collection| async move {
            collection.update_many(filter, update, &options).await
        })
        .await
    }

    pub async fn delete_one(
        &self,
        filter: BsonDocument,
        options: DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        let options = self.delete_options(options);
        self.run("delete_one", |collection| async move {
            collection.delete_one(filter, &options).await
        })
        .await
    }

    pub async fn delete_many(
        &self,
        filter: BsonDocument,
        options: DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        let options = self.delete_options(options);
        self.run("delete_many", |collection| async move {
            collection.delete_many(filter, &options).await
        })
        .await
    }

    /// `delete_many` 的别名
    pub async fn remove(
        &self,
        filter: BsonDocument,
        options: DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        self.delete_many(filter, options).await
    }

    /// 查询单个文档并还原为该类型
    pub async fn find_one(&self, filter: BsonDocument) -> QuickDocResult<Option<T>> {
        let found = self
            .run("find_one", |collection| async move {
                collection.find_one(filter).await
            })
            .await?;
        Ok(self.from_object(found))
    }

    /// 多文档查询，驱动没有给出游标时返回空游标
    pub async fn find(
        &self,
        filter: BsonDocument,
        options: FindOptions,
    ) -> QuickDocResult<DocumentCursor<T>> {
        let cursor = self
            .run("find", |collection| async move {
                collection.find(filter, options).await
            })
            .await?;

        Ok(match cursor {
            Some(cursor) => DocumentCursor::new(cursor, self.rehydrate),
            None => {
                crate::debug_log!("集合 {} 没有可用游标，使用空游标", self.collection);
                DocumentCursor::empty(self.rehydrate)
            }
        })
    }

    /// 按字段查找，找不到时返回由这些字段构造的新实例
    ///
    /// 新实例不会被保存，需要时调用方自行 `save`。
    /// 查找与创建之间没有原子性，并发调用可能各自得到一个未保存的实例
    pub async fn get_or_create(&self, fields: Fields) -> QuickDocResult<T> {
        let lookup = self.find_one(fields.clone());
        match race_timeout(self.options.operation_timeout(), lookup).await {
            Raced::Settled(Ok(Some(found))) => Ok(found),
            Raced::Settled(Ok(None)) => Ok((self.rehydrate)(fields)),
            Raced::Settled(Err(e)) => Err(e),
            Raced::Elapsed => Err(self.timeout_error("get_or_create")),
        }
    }
}

impl<T: Document> DocumentType<T> {
    /// 保存实例
    ///
    /// 没有 `_id` 时插入并把生成的 `_id` 写回实例；已有 `_id` 时按 `_id` upsert，
    /// 用 `$set` 覆盖全部字段。两种情况都使用配置的写关注，可以重复调用
    pub async fn save<'a>(&self, document: &'a mut T) -> QuickDocResult<&'a mut T> {
        let write_concern = self.options.write_concern.clone();
        let fields = document.fields().clone();

        match document.id().cloned() {
            None => {
                let outcome = self
                    .run("save", |collection| async move {
                        collection.insert_one(fields, &write_concern).await
                    })
                    .await?;
                document.fields_mut().insert(ID_FIELD, outcome.inserted_id);
            }
            Some(id) => {
                let options = UpdateOptions {
                    upsert: true,
                    write_concern: Some(write_concern),
                };
                self.run("save", |collection| async move {
                    collection
                        .update_one(doc! { ID_FIELD: id }, doc! { "$set": fields }, &options)
                        .await
                })
                .await?;
            }
        }
        Ok(document)
    }
}
