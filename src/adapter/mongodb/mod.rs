//! MongoDB适配器模块
//!
//! 基于官方驱动的实现，按职责拆分：
//! - connector.rs: 解析连接串、建立客户端并确认可达
//! - client.rs: 客户端与库级操作
//! - collection.rs: 集合上的增删改查与索引
//! - cursor.rs: 惰性游标
//! - utils.rs: 选项转换工具函数

pub mod connector;
pub mod client;
pub mod collection;
pub mod cursor;
pub mod utils;

// 重新导出核心类型
pub use connector::MongoConnector;
pub use client::MongoClientAdapter;
pub use collection::MongoCollectionAdapter;
pub use cursor::MongoCursor;
