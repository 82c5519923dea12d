//! # 全局连接和便捷函数
//!
//! 进程级的连接句柄，文档类型默认绑定到它

use crate::adapter::DriverConnector;
use crate::config::{ConnectionConfig, DEFAULT_CONNECTION_WAIT_MS};
use crate::connection::handle::{ConnectedClient, ConnectionHandle};
use crate::error::QuickDocResult;
use crate::types::{DropDatabaseOptions, DropOutcome};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

/// 全局连接句柄实例
static GLOBAL_CONNECTION: Lazy<ConnectionHandle> = Lazy::new(ConnectionHandle::new);

/// 获取全局连接句柄
pub fn global_connection() -> &'static ConnectionHandle {
    &GLOBAL_CONNECTION
}

/// 连接全局句柄
///
/// 进程内只有第一次调用有效，之后的调用直接返回已确定的结果
pub async fn connect(url: &str) -> QuickDocResult<()> {
    GLOBAL_CONNECTION.connect(url).await
}

/// 使用指定驱动连接全局句柄
pub async fn connect_with(
    url: &str,
    connector: &dyn DriverConnector,
    connect_timeout: Duration,
) -> QuickDocResult<()> {
    GLOBAL_CONNECTION.connect_with(url, connector, connect_timeout).await
}

/// 按配置连接全局句柄
pub async fn connect_with_config(config: &ConnectionConfig) -> QuickDocResult<()> {
    GLOBAL_CONNECTION.connect_with_config(config).await
}

/// 获取全局客户端，`wait` 为空时等待 1000ms
///
/// 返回 `None` 表示连接不可用
pub async fn get_client(wait: Option<Duration>) -> Option<Arc<ConnectedClient>> {
    let wait = wait.unwrap_or(Duration::from_millis(DEFAULT_CONNECTION_WAIT_MS));
    GLOBAL_CONNECTION.get_client(wait).await
}

/// 删除数据库，写关注默认为 w:1
pub async fn drop_database(
    name: &str,
    options: DropDatabaseOptions,
) -> QuickDocResult<DropOutcome> {
    GLOBAL_CONNECTION.drop_database(name, options).await
}
