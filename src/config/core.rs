//! # 配置管理模块 - 核心配置类型
//!
//! 文档类型选项、连接配置以及可从文件加载的全局配置

use crate::error::{QuickDocError, QuickDocResult};
use crate::types::WriteConcernLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use rat_logger::info;

/// 单个操作的默认超时（毫秒）
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 1000;
/// 操作等待连接的默认上限（毫秒）
pub const DEFAULT_CONNECTION_WAIT_MS: u64 = 1000;
/// 建立连接的默认上限（毫秒）
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;

fn default_operation_timeout_ms() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_MS
}

fn default_connection_wait_ms() -> u64 {
    DEFAULT_CONNECTION_WAIT_MS
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// 文档类型选项
///
/// 每个文档类型创建时固定下来，之后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOptions {
    /// 单个操作的超时（毫秒）
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    /// 写操作的写关注级别
    #[serde(default)]
    pub write_concern: WriteConcernLevel,
    /// 操作等待连接就绪的上限（毫秒）
    #[serde(default = "default_connection_wait_ms")]
    pub connection_wait_ms: u64,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT_MS,
            write_concern: WriteConcernLevel::default(),
            connection_wait_ms: DEFAULT_CONNECTION_WAIT_MS,
        }
    }
}

impl DocumentOptions {
    /// 创建文档选项构建器
    pub fn builder() -> super::builders::DocumentOptionsBuilder {
        super::builders::DocumentOptionsBuilder::new()
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn connection_wait(&self) -> Duration {
        Duration::from_millis(self.connection_wait_ms)
    }
}

/// 连接配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// 连接串，例如 `mongodb://localhost:27017/document_test`
    pub url: String,
    /// 建立连接的上限（毫秒）
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl ConnectionConfig {
    /// 创建连接配置构建器
    pub fn builder() -> super::builders::ConnectionConfigBuilder {
        super::builders::ConnectionConfigBuilder::new()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// 全局配置
///
/// 连接配置、文档类型的默认选项以及按集合名的覆盖项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickDocConfig {
    /// 连接配置
    pub connection: ConnectionConfig,
    /// 文档类型默认选项
    #[serde(default)]
    pub documents: DocumentOptions,
    /// 按集合名覆盖的选项
    #[serde(default)]
    pub collections: HashMap<String, DocumentOptions>,
}

impl QuickDocConfig {
    pub fn new(connection: ConnectionConfig) -> Self {
        Self {
            connection,
            documents: DocumentOptions::default(),
            collections: HashMap::new(),
        }
    }

    /// 从配置文件加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径，`.toml` 按 TOML 解析，其他按 JSON 解析
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> QuickDocResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref())
            .map_err(QuickDocError::IoError)?;

        let config: QuickDocConfig = if is_toml(config_path.as_ref()) {
            toml::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        config.validate()?;
        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> QuickDocResult<()> {
        let content = if is_toml(config_path.as_ref()) {
            toml::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)
            .map_err(QuickDocError::IoError)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }

    /// 获取指定集合的文档选项，没有覆盖项时使用默认选项
    pub fn options_for(&self, collection: &str) -> DocumentOptions {
        self.collections
            .get(collection)
            .cloned()
            .unwrap_or_else(|| self.documents.clone())
    }

    /// 校验配置
    pub fn validate(&self) -> QuickDocResult<()> {
        if self.connection.url.trim().is_empty() {
            return Err(crate::quick_error!(config, "连接串不能为空"));
        }
        if self.connection.connect_timeout_ms == 0 {
            return Err(crate::quick_error!(config, "连接超时不能为零"));
        }
        for (name, options) in std::iter::once(("<default>", &self.documents))
            .chain(self.collections.iter().map(|(k, v)| (k.as_str(), v)))
        {
            if options.operation_timeout_ms == 0 {
                return Err(crate::quick_error!(config, format!("集合 {} 的操作超时不能为零", name)));
            }
        }
        Ok(())
    }
}

fn is_toml(path: &std::path::Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}
