//! 操作选项
//!
//! 这些选项原样交给驱动层，写关注留空时由文档类型的默认配置补齐

use crate::types::WriteConcernLevel;
use bson::Document;
use serde::{Deserialize, Serialize};

/// 查询选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// 投影
    pub projection: Option<Document>,
    /// 排序键
    pub sort: Option<Document>,
    /// 跳过条数
    pub skip: Option<u64>,
    /// 返回条数上限
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn with_projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// 更新选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    /// 没有匹配时是否插入
    pub upsert: bool,
    /// 写关注，None 时使用文档类型配置
    pub write_concern: Option<WriteConcernLevel>,
}

impl UpdateOptions {
    /// 开启 upsert 的更新选项
    pub fn upsert() -> Self {
        Self {
            upsert: true,
            write_concern: None,
        }
    }
}

/// 删除选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    /// 写关注，None 时使用文档类型配置
    pub write_concern: Option<WriteConcernLevel>,
}

/// 索引选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// 索引名，不设置时按 `字段_方向` 规则生成
    #[serde(default)]
    pub name: Option<String>,
    /// 是否唯一
    #[serde(default)]
    pub unique: bool,
    /// 是否稀疏索引
    #[serde(default)]
    pub sparse: bool,
}

impl IndexOptions {
    /// 唯一索引
    pub fn unique() -> Self {
        Self {
            unique: true,
            ..Default::default()
        }
    }
}

/// 索引定义
#[derive(Debug, Clone, PartialEq)]
pub struct IndexModel {
    /// 索引键，例如 `{ "name": 1 }`
    pub keys: Document,
    /// 索引选项
    pub options: IndexOptions,
}

impl IndexModel {
    pub fn new(keys: Document, options: IndexOptions) -> Self {
        Self { keys, options }
    }

    /// 索引名，未显式指定时与 MongoDB 默认规则一致，如 `name_1`
    pub fn resolved_name(&self) -> String {
        if let Some(name) = &self.options.name {
            return name.clone();
        }
        self.keys
            .iter()
            .map(|(field, direction)| format!("{}_{}", field, direction))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// 删除数据库选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropDatabaseOptions {
    /// 写关注，默认 w:1
    pub write_concern: WriteConcernLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_index_name_resolution() {
        let index = IndexModel::new(doc! { "name": 1 }, IndexOptions::unique());
        assert_eq!(index.resolved_name(), "name_1");

        let compound = IndexModel::new(doc! { "a": 1, "b": -1 }, IndexOptions::default());
        assert_eq!(compound.resolved_name(), "a_1_b_-1");

        let named = IndexModel::new(
            doc! { "a": 1 },
            IndexOptions {
                name: Some("by_a".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(named.resolved_name(), "by_a");
    }
}
