//! 延迟连接句柄
//!
//! 单次赋值的连接状态：`Unsettled` 只会转变一次到 `Connected` 或 `Failed`，之后不再变化。
//! 任意多个等待者可以同时与它竞速，状态确定后每次读取都立即得到同一结果

use crate::adapter::{DriverClient, DriverCollection};
use crate::connection::race::{race_timeout, Raced};
use crate::error::{QuickDocError, QuickDocResult};
use crate::types::{DropDatabaseOptions, DropOutcome};
use rat_logger::{debug, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 已建立的连接：连接串、库名与驱动客户端
pub struct ConnectedClient {
    url: String,
    database_name: String,
    client: Arc<dyn DriverClient>,
}

impl ConnectedClient {
    pub fn new(
        url: impl Into<String>,
        database_name: impl Into<String>,
        client: Arc<dyn DriverClient>,
    ) -> Self {
        Self {
            url: url.into(),
            database_name: database_name.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 从连接串推导出的目标库名
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn client(&self) -> &Arc<dyn DriverClient> {
        &self.client
    }

    /// 目标库中的集合
    pub fn collection(&self, name: &str) -> Arc<dyn DriverCollection> {
        self.client.collection(&self.database_name, name)
    }

    /// 删除指定数据库（不限于目标库）
    pub async fn drop_database(
        &self,
        name: &str,
        options: &DropDatabaseOptions,
    ) -> QuickDocResult<DropOutcome> {
        self.client.drop_database(name, &options.write_concern).await
    }
}

impl fmt::Debug for ConnectedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedClient")
            .field("url", &self.url)
            .field("database_name", &self.database_name)
            .field("backend", &self.client.backend_name())
            .finish()
    }
}

/// 连接状态
#[derive(Debug, Clone)]
pub enum ConnectionState {
    /// 尚未确定
    Unsettled,
    /// 已连接
    Connected(Arc<ConnectedClient>),
    /// 启动失败，附带原因
    Failed(String),
}

impl ConnectionState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, ConnectionState::Unsettled)
    }
}

/// 延迟连接句柄
///
/// 克隆得到的句柄共享同一个状态
#[derive(Clone)]
pub struct ConnectionHandle {
    state: Arc<watch::Sender<ConnectionState>>,
}

impl Default for ConnectionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl ConnectionHandle {
    /// 创建一个未确定的句柄
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ConnectionState::Unsettled);
        Self {
            state: Arc::new(sender),
        }
    }

    /// 当前状态的快照
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().is_settled()
    }

    /// 以已连接状态确定句柄，句柄已确定时返回 `false` 且不做任何修改
    pub fn settle_connected(&self, client: Arc<ConnectedClient>) -> bool {
        let settled = self.settle(ConnectionState::Connected(client));
        if settled {
            info!("连接句柄已确定: 已连接");
        }
        settled
    }

    /// 以失败状态确定句柄，句柄已确定时返回 `false` 且不做任何修改
    pub fn settle_failed(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        let settled = self.settle(ConnectionState::Failed(reason.clone()));
        if settled {
            info!("连接句柄已确定: 失败 ({})", reason);
        }
        settled
    }

    fn settle(&self, next: ConnectionState) -> bool {
        let mut next = Some(next);
        self.state.send_if_modified(|current| {
            if current.is_settled() {
                return false;
            }
            match next.take() {
                Some(state) => {
                    *current = state;
                    true
                }
                None => false,
            }
        })
    }

    /// 等待句柄确定，不设上限
    pub async fn wait_settled(&self) -> ConnectionState {
        let mut receiver = self.state.subscribe();
        let settled = match receiver.wait_for(ConnectionState::is_settled).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.state())
    }

    /// 在 `wait` 时限内获取客户端
    ///
    /// 时限先到或连接已失败时返回 `None`，调用方应把它当作连接不可用
    pub async fn get_client(&self, wait: Duration) -> Option<Arc<ConnectedClient>> {
        match race_timeout(wait, self.wait_settled()).await {
            Raced::Settled(ConnectionState::Connected(client)) => Some(client),
            Raced::Settled(ConnectionState::Failed(reason)) => {
                debug!("连接不可用: {}", reason);
                None
            }
            Raced::Settled(ConnectionState::Unsettled) | Raced::Elapsed => {
                debug!("等待连接超过 {:?}", wait);
                None
            }
        }
    }

    /// 在 `wait` 时限内获取客户端，不可用时返回 `ConnectionUnavailable` 并说明原因
    pub async fn acquire(&self, wait: Duration) -> QuickDocResult<Arc<ConnectedClient>> {
        match race_timeout(wait, self.wait_settled()).await {
            Raced::Settled(ConnectionState::Connected(client)) => Ok(client),
            Raced::Settled(ConnectionState::Failed(reason)) => {
                let message =
                    crate::i18n::tf("error.connection_failed", &[("message", reason.as_str())]);
                Err(QuickDocError::ConnectionUnavailable { message })
            }
            Raced::Settled(ConnectionState::Unsettled) | Raced::Elapsed => {
                let timeout_ms = wait.as_millis().to_string();
                Err(QuickDocError::ConnectionUnavailable {
                    message: crate::i18n::tf(
                        "error.connection_wait_elapsed",
                        &[("timeout_ms", timeout_ms.as_str())],
                    ),
                })
            }
        }
    }

    /// 删除指定数据库
    ///
    /// 等待连接的上限使用默认值
    pub async fn drop_database(
        &self,
        name: &str,
        options: DropDatabaseOptions,
    ) -> QuickDocResult<DropOutcome> {
        let wait = Duration::from_millis(crate::config::DEFAULT_CONNECTION_WAIT_MS);
        let client = self.acquire(wait).await?;
        client.drop_database(name, &options).await
    }
}
