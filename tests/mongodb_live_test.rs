//! MongoDB 实机测试
//!
//! 需要本地运行的 MongoDB（`mongodb://localhost:27017`），默认忽略：
//! `cargo test --test mongodb_live_test -- --ignored`
//!
//! 每个测试使用独立的库和连接句柄，结束时删除该库

#![cfg(feature = "mongodb-support")]

use rat_quickdoc::{
    define_document, doc, ConnectionHandle, DeleteOptions, Document, DocumentOptions,
    DocumentType, DropDatabaseOptions, FindOptions, IndexOptions, QuickDocError,
};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const SERVER: &str = "mongodb://localhost:27017";

define_document! {
    pub struct Bar;
    collection = "bars",
}

define_document! {
    pub struct Row;
    collection = "rows",
}

async fn connected(database: &str) -> ConnectionHandle {
    rat_quickdoc::init();
    let handle = ConnectionHandle::new();
    handle
        .connect(&format!("{}/{}", SERVER, database))
        .await
        .expect("连接本地 MongoDB 失败");
    handle
}

fn bound<T: Document>(handle: &ConnectionHandle) -> DocumentType<T> {
    let options = DocumentOptions::builder()
        .operation_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    DocumentType::new(T::document_type().collection(), options).with_connection(handle.clone())
}

async fn cleanup(handle: &ConnectionHandle, database: &str) {
    let outcome = assert_ok!(handle.drop_database(database, DropDatabaseOptions::default()).await);
    assert_eq!(outcome.database, database);
    assert!(outcome.acknowledged);
}

#[tokio::test]
#[ignore]
async fn test_unique_index_rejects_second_bill() {
    let database = "rat_quickdoc_live_unique";
    let handle = connected(database).await;
    let bars = bound::<Bar>(&handle);

    let name = assert_ok!(bars.create_index(doc! { "name": 1 }, IndexOptions::unique()).await);
    assert_eq!(name, "name_1");
    assert_ok!(bars.delete_many(doc! {}, DeleteOptions::default()).await);

    let mut bill = Bar::from(doc! { "name": "Bill" });
    let mut bob = Bar::from(doc! { "name": "Bob" });
    assert_ok!(bars.save(&mut bill).await);
    assert!(bill.id().is_some());
    assert_ok!(bars.save(&mut bob).await);
    assert!(bob.id().is_some());

    let mut second_bill = Bar::from(doc! { "name": "Bill" });
    let error = assert_err!(bars.save(&mut second_bill).await);
    assert!(matches!(error, QuickDocError::Mongo(_)), "驱动错误应原样返回: {}", error);
    assert!(error.is_duplicate_key());
    assert!(!second_bill.is_persisted());
    assert_eq!(assert_ok!(bars.count(doc! { "name": "Bill" }).await), 1);

    cleanup(&handle, database).await;
}

#[tokio::test]
#[ignore]
async fn test_save_twice_then_get_or_create() {
    let database = "rat_quickdoc_live_save";
    let handle = connected(database).await;
    let rows = bound::<Row>(&handle);

    let mut row = Row::from(doc! { "name": "Bob" });
    assert_ok!(rows.save(&mut row).await);
    row.insert("magic", "xyzzy");
    assert_ok!(rows.save(&mut row).await);

    let found = assert_ok!(rows.get_or_create(doc! { "name": "Bob" }).await);
    assert_eq!(found.get_str("magic").unwrap(), "xyzzy");
    assert_eq!(found.id(), row.id());

    let fresh = assert_ok!(rows.get_or_create(doc! { "name": "Nobody" }).await);
    assert!(!fresh.is_persisted());

    cleanup(&handle, database).await;
}

#[tokio::test]
#[ignore]
async fn test_cursor_against_server() {
    let database = "rat_quickdoc_live_cursor";
    let handle = connected(database).await;
    let rows = bound::<Row>(&handle);

    for i in 0..10 {
        let mut row = Row::from(doc! { "x": i, "xx": i * i });
        assert_ok!(rows.save(&mut row).await);
    }

    let mut cursor = assert_ok!(rows.find(doc! {}, FindOptions::default()).await);
    assert_ok!(cursor.filter(doc! { "x": { "$gte": 5 } }));
    assert_ok!(cursor.sort(doc! { "x": -1 }));
    assert_ok!(cursor.limit(3));
    assert_eq!(assert_ok!(cursor.count().await), 5);

    assert!(assert_ok!(cursor.has_next().await));
    let first = assert_ok!(cursor.next().await).expect("has_next 之后应该有元素");
    assert_eq!(first.get_i32("x").unwrap(), 9);

    let error = assert_err!(cursor.skip(1));
    assert!(matches!(error, QuickDocError::CursorConsumed { .. }));

    let rest = assert_ok!(cursor.to_array().await);
    let xs: Vec<i32> = rest.iter().map(|row| row.get_i32("x").unwrap()).collect();
    assert_eq!(xs, vec![8, 7]);
    assert!(!assert_ok!(cursor.has_next().await));

    let mut missing = assert_ok!(rows.find(doc! { "x": 100 }, FindOptions::default()).await);
    assert!(assert_ok!(missing.next().await).is_none());

    cleanup(&handle, database).await;
}
