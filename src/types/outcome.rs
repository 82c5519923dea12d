//! 写操作结果

use bson::Bson;

/// 插入结果
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    /// 新文档的 `_id`
    pub inserted_id: Bson,
}

/// 更新结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    /// 匹配的文档数
    pub matched_count: u64,
    /// 实际修改的文档数
    pub modified_count: u64,
    /// upsert 插入时新文档的 `_id`
    pub upserted_id: Option<Bson>,
}

/// 删除结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    /// 删除的文档数
    pub deleted_count: u64,
}

/// 删除数据库的确认
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    /// 数据库名
    pub database: String,
    /// 服务端是否确认
    pub acknowledged: bool,
}
