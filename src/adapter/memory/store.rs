//! 内存存储：客户端、集合与唯一索引检查

use crate::adapter::memory::cursor::MemoryCursor;
use crate::adapter::memory::matcher::{self, lookup};
use crate::adapter::memory::update::{apply_update, seed_from_filter};
use crate::adapter::{DriverClient, DriverCollection, DriverCursor};
use crate::error::{QuickDocError, QuickDocResult};
use crate::types::*;
use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use dashmap::DashMap;
use parking_lot::RwLock;
use rat_logger::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// 单个集合的数据
#[derive(Debug, Default)]
pub(crate) struct CollectionData {
    pub(crate) documents: Vec<Document>,
    pub(crate) indexes: Vec<IndexModel>,
}

pub(crate) type CollectionState = RwLock<CollectionData>;

type Database = DashMap<String, Arc<CollectionState>>;

#[derive(Debug, Default)]
struct MemoryStore {
    databases: DashMap<String, Database>,
    operation_delay: RwLock<Option<Duration>>,
}

/// 内存客户端
///
/// 数据按 库 -> 集合 组织，集合在第一次写入或建索引时创建
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    store: Arc<MemoryStore>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为每个集合操作增加固定延迟，用于模拟慢速服务端
    pub fn set_operation_delay(&self, delay: Option<Duration>) {
        *self.store.operation_delay.write() = delay;
    }

    /// 数据库是否存在
    pub fn has_database(&self, database: &str) -> bool {
        self.store.databases.contains_key(database)
    }

    /// 库中已存在的集合名
    pub fn collection_names(&self, database: &str) -> Vec<String> {
        let mut names = self
            .store
            .databases
            .get(database)
            .map(|db| db.iter().map(|entry| entry.key().clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[async_trait]
impl DriverClient for MemoryClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn collection(&self, database: &str, name: &str) -> Arc<dyn DriverCollection> {
        Arc::new(MemoryCollection {
            store: self.store.clone(),
            database: database.to_string(),
            name: name.to_string(),
        })
    }

    async fn drop_database(
        &self,
        database: &str,
        write_concern: &WriteConcernLevel,
    ) -> QuickDocResult<DropOutcome> {
        let removed = self.store.databases.remove(database).is_some();
        info!("删除内存数据库: {} (存在={}, {})", database, removed, write_concern);
        Ok(DropOutcome {
            database: database.to_string(),
            acknowledged: write_concern.is_acknowledged(),
        })
    }
}

/// 内存集合句柄
///
/// 句柄本身不持有数据，每次操作时按名字解析集合
pub struct MemoryCollection {
    store: Arc<MemoryStore>,
    database: String,
    name: String,
}

impl MemoryCollection {
    async fn delay(&self) {
        let delay = *self.store.operation_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn existing(&self) -> Option<Arc<CollectionState>> {
        self.store
            .databases
            .get(&self.database)
            .and_then(|db| db.get(&self.name).map(|state| Arc::clone(state.value())))
    }

    fn get_or_create(&self) -> Arc<CollectionState> {
        let db = self.store.databases.entry(self.database.clone()).or_default();
        let state = db.entry(self.name.clone()).or_default();
        Arc::clone(state.value())
    }

    fn duplicate_key(&self, index: &str, key: &Document) -> QuickDocError {
        let message = crate::i18n::tf(
            "error.duplicate_key",
            &[
                ("collection", self.name.as_str()),
                ("index", index),
                ("key", key.to_string().as_str()),
            ],
        );
        QuickDocError::DuplicateKey {
            collection: self.name.clone(),
            index: index.to_string(),
            message,
        }
    }

    /// 检查候选文档是否与其他文档冲突，`skip` 为被替换文档的位置
    fn check_unique(
        &self,
        data: &CollectionData,
        candidate: &Document,
        skip: Option<usize>,
    ) -> QuickDocResult<()> {
        if let Some(id) = candidate.get(ID_FIELD) {
            let clash = data.documents.iter().enumerate().any(|(i, existing)| {
                Some(i) != skip
                    && existing
                        .get(ID_FIELD)
                        .map(|e| matcher::values_equal(e, id))
                        .unwrap_or(false)
            });
            if clash {
                let mut key = Document::new();
                key.insert(ID_FIELD, id.clone());
                return Err(self.duplicate_key("_id_", &key));
            }
        }

        for index in data.indexes.iter().filter(|index| index.options.unique) {
            let key = match index_key(index, candidate) {
                Some(key) => key,
                None => continue,
            };
            let clash = data.documents.iter().enumerate().any(|(i, existing)| {
                Some(i) != skip
                    && index_key(index, existing)
                        .map(|other| same_key(&other, &key))
                        .unwrap_or(false)
            });
            if clash {
                return Err(self.duplicate_key(&index.resolved_name(), &key));
            }
        }
        Ok(())
    }

    fn update_matching(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
        multi: bool,
    ) -> QuickDocResult<UpdateOutcome> {
        let state = self.get_or_create();
        let mut data = state.write();

        let mut outcome = UpdateOutcome::default();
        let mut positions = Vec::new();
        for (i, document) in data.documents.iter().enumerate() {
            if matcher::matches(document, &filter)? {
                positions.push(i);
                if !multi {
                    break;
                }
            }
        }

        for position in positions {
            let updated = apply_update(&data.documents[position], &update, false)?;
            outcome.matched_count += 1;
            if updated != data.documents[position] {
                self.check_unique(&data, &updated, Some(position))?;
                data.documents[position] = updated;
                outcome.modified_count += 1;
            }
        }

        if outcome.matched_count == 0 && options.upsert {
            let seed = seed_from_filter(&filter)?;
            let mut inserted = apply_update(&seed, &update, true)?;
            if !inserted.contains_key(ID_FIELD) {
                inserted.insert(ID_FIELD, ObjectId::new());
            }
            self.check_unique(&data, &inserted, None)?;
            outcome.upserted_id = inserted.get(ID_FIELD).cloned();
            data.documents.push(inserted);
        }

        debug!(
            "内存更新: 集合={}, 匹配={}, 修改={}, upsert={:?}",
            self.name, outcome.matched_count, outcome.modified_count, outcome.upserted_id
        );
        Ok(outcome)
    }

    fn delete_matching(&self, filter: Document, multi: bool) -> QuickDocResult<DeleteOutcome> {
        let state = match self.existing() {
            Some(state) => state,
            None => return Ok(DeleteOutcome::default()),
        };
        let mut data = state.write();

        let mut positions = Vec::new();
        for (i, document) in data.documents.iter().enumerate() {
            if matcher::matches(document, &filter)? {
                positions.push(i);
                if !multi {
                    break;
                }
            }
        }
        for position in positions.iter().rev() {
            data.documents.remove(*position);
        }

        Ok(DeleteOutcome {
            deleted_count: positions.len() as u64,
        })
    }
}

fn index_key(index: &IndexModel, document: &Document) -> Option<Document> {
    let mut key = Document::new();
    let mut present = false;
    for (field, _) in &index.keys {
        match lookup(document, field) {
            Some(value) => {
                present = true;
                key.insert(field.clone(), value.clone());
            }
            None => {
                key.insert(field.clone(), Bson::Null);
            }
        }
    }
    if index.options.sparse && !present {
        None
    } else {
        Some(key)
    }
}

fn same_key(left: &Document, right: &Document) -> bool {
    left.iter()
        .zip(right.iter())
        .all(|((_, a), (_, b))| matcher::values_equal(a, b))
}

#[async_trait]
impl DriverCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count_documents(&self, filter: Document) -> QuickDocResult<u64> {
        self.delay().await;
        let state = match self.existing() {
            Some(state) => state,
            None => return Ok(0),
        };
        let data = state.read();
        let mut count = 0;
        for document in &data.documents {
            if matcher::matches(document, &filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn create_indexes(&self, indexes: Vec<IndexModel>) -> QuickDocResult<Vec<String>> {
        self.delay().await;
        let state = self.get_or_create();
        let mut data = state.write();

        let mut names = Vec::with_capacity(indexes.len());
        for index in indexes {
            let name = index.resolved_name();
            if data.indexes.iter().any(|existing| existing.resolved_name() == name) {
                names.push(name);
                continue;
            }

            if index.options.unique {
                let mut seen: Vec<Document> = Vec::new();
                for document in &data.documents {
                    if let Some(key) = index_key(&index, document) {
                        if seen.iter().any(|other| same_key(other, &key)) {
                            return Err(self.duplicate_key(&name, &key));
                        }
                        seen.push(key);
                    }
                }
            }

            debug!("内存索引已创建: 集合={}, 索引={}", self.name, name);
            data.indexes.push(index);
            names.push(name);
        }
        Ok(names)
    }

    async fn insert_one(
        &self,
        document: Document,
        _write_concern: &WriteConcernLevel,
    ) -> QuickDocResult<InsertOutcome> {
        self.delay().await;
        let mut document = document;
        if !document.contains_key(ID_FIELD) {
            let mut with_id = Document::new();
            with_id.insert(ID_FIELD, ObjectId::new());
            for (field, value) in document {
                with_id.insert(field, value);
            }
            document = with_id;
        }

        let state = self.get_or_create();
        let mut data = state.write();
        self.check_unique(&data, &document, None)?;

        let inserted_id = document.get(ID_FIELD).cloned().unwrap_or(Bson::Null);
        data.documents.push(document);
        Ok(InsertOutcome { inserted_id })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome> {
        self.delay().await;
        self.update_matching(filter, update, options, false)
    }

    async fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> QuickDocResult<UpdateOutcome> {
        self.delay().await;
        self.update_matching(filter, update, options, true)
    }

    async fn delete_one(
        &self,
        filter: Document,
        _options: &DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        self.delay().await;
        self.delete_matching(filter, false)
    }

    async fn delete_many(
        &self,
        filter: Document,
        _options: &DeleteOptions,
    ) -> QuickDocResult<DeleteOutcome> {
        self.delay().await;
        self.delete_matching(filter, true)
    }

    async fn find_one(&self, filter: Document) -> QuickDocResult<Option<Document>> {
        self.delay().await;
        let state = match self.existing() {
            Some(state) => state,
            None => return Ok(None),
        };
        let data = state.read();
        for document in &data.documents {
            if matcher::matches(document, &filter)? {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> QuickDocResult<Option<Box<dyn DriverCursor>>> {
        self.delay().await;
        // 集合还不存在时不给游标
        Ok(self.existing().map(|state| {
            Box::new(MemoryCursor::new(state, filter, options)) as Box<dyn DriverCursor>
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn collection(client: &MemoryClient, name: &str) -> Arc<dyn DriverCollection> {
        client.collection("store_test", name)
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_enforces_uniqueness() {
        let client = MemoryClient::new();
        let bars = collection(&client, "bars");
        let w1 = WriteConcernLevel::default();

        let outcome = bars.insert_one(doc! { "name": "Bill" }, &w1).await.unwrap();
        assert!(matches!(outcome.inserted_id, Bson::ObjectId(_)));

        let names = bars
            .create_indexes(vec![IndexModel::new(doc! { "name": 1 }, IndexOptions::unique())])
            .await
            .unwrap();
        assert_eq!(names, vec!["name_1".to_string()]);

        let error = bars.insert_one(doc! { "name": "Bill" }, &w1).await.unwrap_err();
        assert!(error.is_duplicate_key());
        assert_eq!(bars.count_documents(doc! {}).await.unwrap(), 1);

        let same_id = doc! { "_id": outcome.inserted_id.clone(), "name": "Other" };
        assert!(bars.insert_one(same_id, &w1).await.unwrap_err().is_duplicate_key());
    }

    #[tokio::test]
    async fn test_unique_index_rejects_existing_duplicates() {
        let client = MemoryClient::new();
        let bars = collection(&client, "dupes");
        let w1 = WriteConcernLevel::default();
        bars.insert_one(doc! { "name": "a" }, &w1).await.unwrap();
        bars.insert_one(doc! { "name": "a" }, &w1).await.unwrap();

        let result = bars
            .create_indexes(vec![IndexModel::new(doc! { "name": 1 }, IndexOptions::unique())])
            .await;
        assert!(result.unwrap_err().is_duplicate_key());
    }

    #[tokio::test]
    async fn test_update_upsert_and_delete() {
        let client = MemoryClient::new();
        let foos = collection(&client, "foos");

        let outcome = foos
            .update_one(doc! { "_id": 5 }, doc! { "$set": { "x": 1 } }, &UpdateOptions::upsert())
            .await
            .unwrap();
        assert_eq!(outcome.matched_count, 0);
        assert_eq!(outcome.upserted_id, Some(Bson::Int32(5)));
        assert_eq!(
            foos.find_one(doc! { "_id": 5 }).await.unwrap(),
            Some(doc! { "_id": 5, "x": 1 })
        );

        let outcome = foos
            .update_one(doc! { "_id": 5 }, doc! { "$set": { "x": 1 } }, &UpdateOptions::upsert())
            .await
            .unwrap();
        assert_eq!((outcome.matched_count, outcome.modified_count), (1, 0));

        foos.insert_one(doc! { "x": 2 }, &WriteConcernLevel::default()).await.unwrap();
        let outcome = foos
            .update_many(doc! {}, doc! { "$inc": { "x": 10 } }, &UpdateOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.modified_count, 2);

        let deleted = foos.delete_one(doc! {}, &DeleteOptions::default()).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
        let deleted = foos.delete_many(doc! {}, &DeleteOptions::default()).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
    }

    #[tokio::test]
    async fn test_update_cannot_change_id() {
        let client = MemoryClient::new();
        let foos = collection(&client, "foos");
        foos.insert_one(doc! { "_id": 1, "name": "Adam" }, &WriteConcernLevel::default())
            .await
            .unwrap();

        let error = foos
            .update_one(doc! { "_id": 1 }, doc! { "$set": { "_id": 2 } }, &UpdateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(error, QuickDocError::QueryError { .. }));

        let unset = foos
            .update_many(doc! {}, doc! { "$unset": { "_id": "" } }, &UpdateOptions::default())
            .await;
        assert!(unset.is_err());

        assert_eq!(
            foos.find_one(doc! {}).await.unwrap(),
            Some(doc! { "_id": 1, "name": "Adam" })
        );

        let outcome = foos
            .update_one(
                doc! { "_id": 1 },
                doc! { "$set": { "_id": 1, "name": "Bill" } },
                &UpdateOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.modified_count, 1);
    }

    #[tokio::test]
    async fn test_missing_collection_has_no_cursor() {
        let client = MemoryClient::new();
        let ghosts = collection(&client, "ghosts");
        assert!(ghosts.find(doc! {}, FindOptions::default()).await.unwrap().is_none());
        assert_eq!(ghosts.count_documents(doc! {}).await.unwrap(), 0);
        assert!(client.collection_names("store_test").is_empty());

        ghosts.insert_one(doc! { "a": 1 }, &WriteConcernLevel::default()).await.unwrap();
        assert!(ghosts.find(doc! {}, FindOptions::default()).await.unwrap().is_some());
        assert_eq!(client.collection_names("store_test"), vec!["ghosts".to_string()]);
    }

    #[tokio::test]
    async fn test_drop_database() {
        let client = MemoryClient::new();
        collection(&client, "foos")
            .insert_one(doc! { "a": 1 }, &WriteConcernLevel::default())
            .await
            .unwrap();
        assert!(client.has_database("store_test"));

        let outcome = client
            .drop_database("store_test", &WriteConcernLevel::default())
            .await
            .unwrap();
        assert!(outcome.acknowledged);
        assert!(!client.has_database("store_test"));
    }
}
