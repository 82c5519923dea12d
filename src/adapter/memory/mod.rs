//! 内存后端
//!
//! 进程内的文档存储，实现与 MongoDB 相同的驱动接口，连接串形如 `memory://localhost/<库名>`。
//! 用于测试和演示，也可以通过延迟和失败开关模拟慢速或不可达的服务端

pub mod cursor;
pub mod matcher;
pub mod store;
pub mod update;

pub use cursor::MemoryCursor;
pub use store::{MemoryClient, MemoryCollection};

use crate::adapter::{DriverClient, DriverConnector};
use crate::error::QuickDocResult;
use async_trait::async_trait;
use rat_logger::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// 内存连接器
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    client: MemoryClient,
    connect_delay: Option<Duration>,
    failure: Option<String>,
}

impl MemoryConnector {
    /// 使用全新的空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 连接到已有的内存存储
    pub fn with_client(client: MemoryClient) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    /// 建立连接前等待一段时间
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    /// 每次集合操作前等待一段时间
    pub fn with_operation_delay(self, delay: Duration) -> Self {
        self.client.set_operation_delay(Some(delay));
        self
    }

    /// 连接总是失败，返回给定的错误信息
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// 连接成功后交出的客户端
    pub fn client(&self) -> &MemoryClient {
        &self.client
    }
}

#[async_trait]
impl DriverConnector for MemoryConnector {
    async fn connect(&self, url: &str) -> QuickDocResult<Arc<dyn DriverClient>> {
        if let Some(delay) = self.connect_delay {
            debug!("内存连接延迟 {:?}: {}", delay, url);
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            warn!("内存连接失败: {}", message);
            return Err(crate::quick_error!(connection, message));
        }
        Ok(Arc::new(self.client.clone()))
    }
}
