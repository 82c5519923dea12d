//! # 文档选项构建器模块
//!
//! 未设置的选项回落到默认值：操作超时 1000ms、写关注 w:1、连接等待 1000ms

use crate::config::core::DocumentOptions;
use crate::error::QuickDocResult;
use crate::types::WriteConcernLevel;
use std::time::Duration;

/// 文档选项构建器
#[derive(Debug, Default)]
pub struct DocumentOptionsBuilder {
    operation_timeout_ms: Option<u64>,
    write_concern: Option<WriteConcernLevel>,
    connection_wait_ms: Option<u64>,
}

impl DocumentOptionsBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置单个操作的超时
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// 设置写关注级别
    pub fn write_concern(mut self, level: impl Into<WriteConcernLevel>) -> Self {
        self.write_concern = Some(level.into());
        self
    }

    /// 设置等待连接就绪的上限
    pub fn connection_wait(mut self, wait: Duration) -> Self {
        self.connection_wait_ms = Some(wait.as_millis() as u64);
        self
    }

    /// 构建文档选项
    ///
    /// # 错误
    ///
    /// 操作超时为零时返回配置错误
    pub fn build(self) -> QuickDocResult<DocumentOptions> {
        let defaults = DocumentOptions::default();
        let options = DocumentOptions {
            operation_timeout_ms: self
                .operation_timeout_ms
                .unwrap_or(defaults.operation_timeout_ms),
            write_concern: self.write_concern.unwrap_or(defaults.write_concern),
            connection_wait_ms: self.connection_wait_ms.unwrap_or(defaults.connection_wait_ms),
        };

        if options.operation_timeout_ms == 0 {
            return Err(crate::quick_error!(config, "操作超时不能为零"));
        }

        Ok(options)
    }
}
