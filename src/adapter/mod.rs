//! 驱动适配器模块
//!
//! 文档映射层只通过这里的几个trait访问底层存储，屏蔽驱动实现差异：
//! - `DriverConnector`: 根据连接串建立客户端
//! - `DriverClient`: 已连接的客户端，提供集合句柄和库级操作
//! - `DriverCollection`: 单个集合上的增删改查与索引
//! - `DriverCursor`: 惰性游标，首次消费前可以继续调整查询

use crate::error::{QuickDocError, QuickDocResult};
use crate::types::*;
use async_trait::async_trait;
use bson::Document;
use std::sync::Arc;

pub mod memory;
#[cfg(feature = "mongodb-support")]
pub mod mongodb;

pub use memory::{MemoryClient, MemoryConnector};
#[cfg(feature = "mongodb-support")]
pub use self::mongodb::MongoConnector;

/// 连接器：根据连接串建立客户端
#[async_trait]
pub trait DriverConnector: Send + Sync {
    /// 建立连接，返回可用的客户端
    async fn connect(&self, url: &str) -> QuickDocResult<Arc<dyn DriverClient>>;
}

/// 已连接的驱动客户端
#[async_trait]
pub trait DriverClient: Send + Sync {
    /// 后端名称，用于日志
    fn backend_name(&self) -> &'static str;

    /// 获取指定库中的集合句柄
    fn collection(&self, database: &str, name: &str) -> Arc<dyn DriverCollection>;

    /// 删除整个数据库
    async fn drop_database(
        &self,
        database: &str,
        write_concern: &WriteConcernLevel,
    ) -> QuickDocResult<DropOutcome>;
}

/// 集合上的驱动操作
///
/// 写关注在调用前已经由文档类型补齐
#[async_trait]
pub trait DriverCollection: Send + Sync {
    /// 集合名
    fn name(&self) -> &str;

    /// 统计匹配的文档数
    async fn count_documents(&self, filter: Document) -> QuickDocResult<u64>;

    /// 创建索引，返回索引名
    async fn create_indexes(&self, indexes: Vec<IndexModel>) -> QuickDocResult<Vec<String>>;

    /// 插入单个文档，文档没有 `_id` 时由驱动生成
    async fn insert_one(
        &self,
        document: Document,
        write_concern: &WriteConcernLevel,
    ) -> QuickDocResult<InsertOutcome>;

    /// 更新第一个匹配的文档
    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome>;

    /// 更新所有匹配的文档
    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome>;

    /// 删除第一个匹配的文档
    async fn delete_one(
        &self,
        filter: Document,
        options: &DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome>;

    /// 删除所有匹配的文档
    async fn delete_many(
        &self,
        filter: Document,
        options: &DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome>;

    /// 查询单个文档
    async fn find_one(&self, filter: Document) -> QuickDocResult<Option<Document>>;

    /// 多文档查询
    ///
    /// 返回 `None` 表示驱动没有给出可用游标（例如集合不存在），调用方会换成空游标
    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> QuickDocResult<Option<Box<dyn DriverCursor>>>;
}

/// 驱动游标
///
/// 塑形方法只在首次消费前有效，是否已开始消费由上层游标适配器把关
#[async_trait]
pub trait DriverCursor: Send {
    fn filter(&mut self, filter: Document);

    fn projection(&mut self, projection: Document);

    fn sort(&mut self, sort: Document);

    fn skip(&mut self, skip: u64);

    fn limit(&mut self, limit: i64);

    /// 匹配总数，与当前位置无关
    async fn count(&mut self) -> QuickDocResult<u64>;

    /// 是否还有下一个元素
    async fn has_next(&mut self) -> QuickDocResult<bool>;

    /// 取出下一个元素，耗尽后返回 `None`
    async fn next(&mut self) -> QuickDocResult<Option<Document>>;
}

/// 空游标
///
/// 驱动没有返回游标时的替身：没有元素，计数为零，塑形方法什么也不做
#[derive(Debug, Default)]
pub struct EmptyCursor;

#[async_trait]
impl DriverCursor for EmptyCursor {
    fn filter(&mut self, _filter: Document) {}

    fn projection(&mut self, _projection: Document) {}

    fn sort(&mut self, _sort: Document) {}

    fn skip(&mut self, _skip: u64) {}

    fn limit(&mut self, _limit: i64) {}

    async fn count(&mut self) -> QuickDocResult<u64> {
        Ok(0)
    }

    async fn has_next(&mut self) -> QuickDocResult<bool> {
        Ok(false)
    }

    async fn next(&mut self) -> QuickDocResult<Option<Document>> {
        Ok(None)
    }
}

/// 根据连接串选择连接器
///
/// - `mongodb://`、`mongodb+srv://` 使用 MongoDB 驱动（需要 `mongodb-support` 特性）
/// - `memory://` 使用进程内存后端
pub fn create_connector(url: &str) -> QuickDocResult<Box<dyn DriverConnector>> {
    let scheme = url.split("://").next().unwrap_or_default();
    match scheme {
        "memory" => Ok(Box::new(MemoryConnector::new())),
        #[cfg(feature = "mongodb-support")]
        "mongodb" | "mongodb+srv" => Ok(Box::new(MongoConnector::new())),
        _ => Err(QuickDocError::UnsupportedBackend {
            url: url.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_connector_by_scheme() {
        assert!(create_connector("memory://localhost/app").is_ok());
        #[cfg(feature = "mongodb-support")]
        assert!(create_connector("mongodb://localhost:27017/app").is_ok());
        assert!(matches!(
            create_connector("redis://localhost/0"),
            Err(QuickDocError::UnsupportedBackend { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_cursor_contract() {
        let mut cursor = EmptyCursor;
        cursor.sort(bson::doc! { "name": 1 });
        cursor.limit(3);
        assert_eq!(cursor.count().await.unwrap(), 0);
        assert!(!cursor.has_next().await.unwrap());
        assert!(cursor.next().await.unwrap().is_none());
    }
}
