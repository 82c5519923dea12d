//! 连接启动
//!
//! 解析连接串、建立驱动客户端并确定连接句柄

use crate::adapter::{create_connector, DriverClient, DriverConnector};
use crate::config::{ConnectionConfig, DEFAULT_CONNECT_TIMEOUT_MS};
use crate::connection::handle::{ConnectedClient, ConnectionHandle, ConnectionState};
use crate::connection::race::{race_first, timeout_value};
use crate::error::{QuickDocError, QuickDocResult};
use futures::FutureExt;
use rat_logger::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// 从连接串推导库名
///
/// 按 `/` 切分后取第 4 段，不做任何校验，格式不对时得到错误的名字或空字符串
pub fn derive_database_name(url: &str) -> String {
    url.split('/').nth(3).unwrap_or_default().to_string()
}

/// 已确定状态对应的启动结果
fn settled_outcome(state: &ConnectionState) -> Option<QuickDocResult<()>> {
    match state {
        ConnectionState::Unsettled => None,
        ConnectionState::Connected(_) => Some(Ok(())),
        ConnectionState::Failed(reason) => Some(Err(QuickDocError::BootstrapFailure {
            message: reason.clone(),
        })),
    }
}

impl ConnectionHandle {
    /// 按连接串选择驱动并连接，使用默认的连接上限
    pub async fn connect(&self, url: &str) -> QuickDocResult<()> {
        let connector = match create_connector(url) {
            Ok(connector) => connector,
            Err(e) => {
                error!("无法为连接串选择驱动: {}", e);
                self.settle_failed(e.to_string());
                return Err(e);
            }
        };
        self.connect_with(
            url,
            connector.as_ref(),
            Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        )
        .await
    }

    /// 按配置连接
    pub async fn connect_with_config(&self, config: &ConnectionConfig) -> QuickDocResult<()> {
        let connector = match create_connector(&config.url) {
            Ok(connector) => connector,
            Err(e) => {
                self.settle_failed(e.to_string());
                return Err(e);
            }
        };
        self.connect_with(&config.url, connector.as_ref(), config.connect_timeout())
            .await
    }

    /// 使用指定驱动连接
    ///
    /// 驱动连接与 `connect_timeout` 竞速：驱动先完成则句柄确定为已连接，
    /// 时限先到或驱动报错则句柄确定为失败。句柄已经确定时不会再次连接，直接返回已确定的结果
    pub async fn connect_with(
        &self,
        url: &str,
        connector: &dyn DriverConnector,
        connect_timeout: Duration,
    ) -> QuickDocResult<()> {
        if let Some(outcome) = settled_outcome(&self.state()) {
            warn!("连接句柄已确定，忽略对 {} 的重复连接", url);
            return outcome;
        }

        let database_name = derive_database_name(url);
        info!(
            "开始连接: url={}, 库={}, 上限={}ms",
            url,
            database_name,
            connect_timeout.as_millis()
        );

        let timeout_ms = connect_timeout.as_millis().to_string();
        let elapsed: QuickDocResult<Arc<dyn DriverClient>> = Err(QuickDocError::BootstrapFailure {
            message: crate::i18n::tf(
                "error.bootstrap_timeout",
                &[("url", url), ("timeout_ms", timeout_ms.as_str())],
            ),
        });

        let attempt = race_first(vec![
            connector.connect(url),
            timeout_value(connect_timeout, elapsed).boxed(),
        ])
        .await;

        let outcome = match attempt {
            Some(outcome) => outcome,
            None => Err(crate::quick_error!(bootstrap, "连接竞速没有参与者")),
        };

        match outcome {
            Ok(client) => {
                let backend = client.backend_name();
                let connected = Arc::new(ConnectedClient::new(url, database_name, client));
                if self.settle_connected(connected) {
                    info!("连接成功: 后端={}, url={}", backend, url);
                    Ok(())
                } else {
                    warn!("另一个连接已先确定句柄，丢弃本次建立的客户端");
                    settled_outcome(&self.state()).unwrap_or(Ok(()))
                }
            }
            Err(e) => {
                let reason = match e {
                    QuickDocError::BootstrapFailure { message } => message,
                    other => crate::i18n::tf(
                        "error.bootstrap_failed",
                        &[("url", url), ("message", other.to_string().as_str())],
                    ),
                };
                error!("连接失败: {}", reason);
                if self.settle_failed(reason.clone()) {
                    Err(QuickDocError::BootstrapFailure { message: reason })
                } else {
                    settled_outcome(&self.state()).unwrap_or(Ok(()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryConnector;

    #[test]
    fn test_derive_database_name() {
        assert_eq!(
            derive_database_name("mongodb://localhost:27017/document_test"),
            "document_test"
        );
        assert_eq!(derive_database_name("memory://localhost/app"), "app");
        assert_eq!(derive_database_name("mongodb://localhost:27017"), "");
        assert_eq!(derive_database_name("garbage"), "");
    }

    #[tokio::test]
    async fn test_connect_resolves_handle() {
        let handle = ConnectionHandle::new();
        handle
            .connect_with(
                "memory://localhost/boot",
                &MemoryConnector::new(),
                Duration::from_millis(200),
            )
            .await
            .unwrap();

        let client = handle.get_client(Duration::from_millis(10)).await.unwrap();
        assert_eq!(client.database_name(), "boot");
        assert_eq!(client.url(), "memory://localhost/boot");
    }

    #[tokio::test]
    async fn test_connect_bound_rejects_handle() {
        let handle = ConnectionHandle::new();
        let slow = MemoryConnector::new().with_connect_delay(Duration::from_millis(500));

        let error = handle
            .connect_with("memory://localhost/slow", &slow, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(error, QuickDocError::BootstrapFailure { .. }));
        assert!(matches!(handle.state(), ConnectionState::Failed(_)));

        let unavailable = handle.acquire(Duration::from_millis(10)).await.unwrap_err();
        assert!(unavailable.is_connection_unavailable());
    }

    #[tokio::test]
    async fn test_connector_error_rejects_handle() {
        let handle = ConnectionHandle::new();
        let refused = MemoryConnector::new().failing("refused");

        let result = handle
            .connect_with("memory://localhost/refused", &refused, Duration::from_millis(200))
            .await;
        assert!(result.is_err());
        assert!(handle.get_client(Duration::from_millis(10)).await.is_none());
    }

    #[tokio::test]
    async fn test_settled_handle_is_not_reconnected() {
        let handle = ConnectionHandle::new();
        handle
            .connect_with(
                "memory://localhost/first",
                &MemoryConnector::new(),
                Duration::from_millis(200),
            )
            .await
            .unwrap();
        handle
            .connect_with(
                "memory://localhost/second",
                &MemoryConnector::new(),
                Duration::from_millis(200),
            )
            .await
            .unwrap();

        let client = handle.get_client(Duration::from_millis(10)).await.unwrap();
        assert_eq!(client.database_name(), "first");
    }

    #[tokio::test]
    async fn test_unsupported_scheme_rejects_handle() {
        let handle = ConnectionHandle::new();
        let error = handle.connect("redis://localhost/0").await.unwrap_err();
        assert!(matches!(error, QuickDocError::UnsupportedBackend { .. }));
        assert!(matches!(handle.state(), ConnectionState::Failed(_)));
    }
}
