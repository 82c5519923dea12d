//! MongoDB 客户端适配

use crate::adapter::{DriverClient, DriverCollection};
use crate::adapter::mongodb::{utils, MongoCollectionAdapter};
use crate::error::QuickDocResult;
use crate::types::{DropOutcome, WriteConcernLevel};
use async_trait::async_trait;
use bson::Document;
use ::mongodb::options::DropDatabaseOptions;
use ::mongodb::Client;
use rat_logger::info;
use std::sync::Arc;

/// MongoDB 客户端适配器
#[derive(Debug, Clone)]
pub struct MongoClientAdapter {
    client: Client,
}

impl MongoClientAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 底层驱动客户端
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DriverClient for MongoClientAdapter {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn collection(&self, database: &str, name: &str) -> Arc<dyn DriverCollection> {
        let collection = self.client.database(database).collection::<Document>(name);
        Arc::new(MongoCollectionAdapter::new(collection))
    }

    async fn drop_database(
        &self,
        database: &str,
        write_concern: &WriteConcernLevel,
    ) -> QuickDocResult<DropOutcome> {
        let mut options = DropDatabaseOptions::default();
        options.write_concern = Some(utils::to_write_concern(write_concern));

        self.client.database(database).drop(options).await?;
        info!("已删除MongoDB数据库: {} ({})", database, write_concern);

        Ok(DropOutcome {
            database: database.to_string(),
            acknowledged: write_concern.is_acknowledged(),
        })
    }
}
