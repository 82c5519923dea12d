//! # 配置构建器模块
//!
//! 提供所有配置类型的构建器实现，支持链式调用和校验

pub mod connection_builder;
pub mod document_options_builder;

// 重新导出所有Builder类型
pub use connection_builder::ConnectionConfigBuilder;
pub use document_options_builder::DocumentOptionsBuilder;
