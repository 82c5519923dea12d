//! # 连接管理模块
//!
//! 延迟连接句柄、连接启动、超时竞速以及进程级的全局连接

pub mod race;
pub mod handle;
pub mod bootstrap;
pub mod global;

// 重新导出所有公共类型
pub use race::{race_first, race_timeout, timeout_value, Raced};
pub use handle::{ConnectedClient, ConnectionHandle, ConnectionState};
pub use bootstrap::derive_database_name;
pub use global::*;
