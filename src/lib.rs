//! rat_quickdoc - 轻量级文档映射库
//!
//! 在文档数据库之上定义绑定到集合的文档类型，提供增删改查、索引管理和游标查询。
//! 连接通过单次赋值的延迟句柄共享，每个操作都受连接等待和操作超时约束。
//! 支持 MongoDB 和进程内存两种后端

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod config;
pub mod adapter;
pub mod connection;
pub mod odm;
pub mod i18n;

// 宏内部使用
#[doc(hidden)]
pub use once_cell;
pub use bson;
pub use bson::doc;

// 重新导出常用类型和函数
pub use error::{QuickDocError, QuickDocResult};
pub use types::*;
pub use config::{
    ConnectionConfig, ConnectionConfigBuilder, DocumentOptions, DocumentOptionsBuilder,
    QuickDocConfig,
};
pub use adapter::{
    create_connector, DriverClient, DriverCollection, DriverConnector, DriverCursor, EmptyCursor,
    MemoryClient, MemoryConnector,
};
#[cfg(feature = "mongodb-support")]
pub use adapter::MongoConnector;
pub use connection::{
    connect, connect_with, connect_with_config, drop_database, get_client, global_connection,
    ConnectedClient, ConnectionHandle, ConnectionState,
};
pub use odm::{Document, DocumentCursor, DocumentType};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quickdoc库
///
/// 注册多语言错误消息。日志系统由调用者自行初始化
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
