//! MongoDB 连接器

use crate::adapter::{DriverClient, DriverConnector};
use crate::adapter::mongodb::MongoClientAdapter;
use crate::error::QuickDocResult;
use async_trait::async_trait;
use bson::doc;
use ::mongodb::Client;
use rat_logger::{debug, info};
use std::sync::Arc;

/// MongoDB 连接器
///
/// 驱动本身是惰性连接的，这里额外发送一次 `ping` 确认服务端可达，
/// 这样启动阶段的失败和超时才有意义
#[derive(Debug, Default)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DriverConnector for MongoConnector {
    async fn connect(&self, url: &str) -> QuickDocResult<Arc<dyn DriverClient>> {
        debug!("解析MongoDB连接串: {}", url);
        let client = Client::with_uri_str(url).await?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;

        info!("MongoDB连接已建立");
        Ok(Arc::new(MongoClientAdapter::new(client)))
    }
}
