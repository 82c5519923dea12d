//! # 配置管理模块
//!
//! 提供文档类型选项和连接配置，支持构建器模式和从 TOML/JSON 文件加载

pub mod builders;
pub mod core;

// 重新导出所有公共类型
pub use builders::{ConnectionConfigBuilder, DocumentOptionsBuilder};
pub use core::{
    ConnectionConfig, DocumentOptions, QuickDocConfig, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_CONNECTION_WAIT_MS, DEFAULT_OPERATION_TIMEOUT_MS,
};
