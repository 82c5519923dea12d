//! 通用类型定义
//!
//! 文档字段、写关注级别、操作选项以及各类写操作的结果

pub mod write_concern;
pub mod options;
pub mod outcome;

// 重新导出所有公共类型
pub use write_concern::WriteConcernLevel;
pub use options::{
    FindOptions, UpdateOptions, DeleteOptions, IndexModel, IndexOptions, DropDatabaseOptions,
};
pub use outcome::{InsertOutcome, UpdateOutcome, DeleteOutcome, DropOutcome};

/// 文档字段映射
///
/// 文档实例就是一个开放的字段映射，直接使用 BSON 文档表示
pub type Fields = bson::Document;

/// 标识字段名，存在即表示文档已持久化
pub const ID_FIELD: &str = "_id";
