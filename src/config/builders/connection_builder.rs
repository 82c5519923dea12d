//! # 连接配置构建器模块

use crate::config::core::{ConnectionConfig, DEFAULT_CONNECT_TIMEOUT_MS};
use crate::error::QuickDocResult;
use rat_logger::info;
use std::time::Duration;

/// 连接配置构建器
///
/// 连接串必须显式设置
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    url: Option<String>,
    connect_timeout_ms: Option<u64>,
}

impl ConnectionConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置连接串
    ///
    /// # 参数
    ///
    /// * `url` - 例如 `mongodb://localhost:27017/document_test`
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// 设置建立连接的上限
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// 构建连接配置
    ///
    /// # 错误
    ///
    /// 未设置连接串或连接超时为零时返回配置错误
    pub fn build(self) -> QuickDocResult<ConnectionConfig> {
        let url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| crate::quick_error!(config, "连接串必须设置"))?;

        let connect_timeout_ms = self.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS);
        if connect_timeout_ms == 0 {
            return Err(crate::quick_error!(config, "连接超时不能为零"));
        }

        info!("创建连接配置: url={}, 连接超时={}ms", url, connect_timeout_ms);

        Ok(ConnectionConfig {
            url,
            connect_timeout_ms,
        })
    }
}
