//! 文档类型集成测试
//!
//! 所有测试共享进程级连接，连接到内存后端的 document_test 库，每个测试使用各自的集合

use futures::future::join_all;
use futures::TryStreamExt;
use rat_quickdoc::bson::oid::ObjectId;
use rat_quickdoc::{
    define_document, doc, DeleteOptions, Document, FindOptions, IndexOptions, QuickDocError,
    UpdateOptions,
};
use std::sync::Once;
use tokio_test::{assert_err, assert_ok};

const URL: &str = "memory://localhost/document_test";

static INIT: Once = Once::new();

async fn setup() {
    INIT.call_once(rat_quickdoc::init);
    rat_quickdoc::connect(URL).await.expect("连接内存后端失败");
}

fn random_string() -> String {
    ObjectId::new().to_hex()
}

define_document! {
    /// 带自定义方法的文档类型
    pub struct Foo;
    collection = "foos",
}

impl Foo {
    fn named(name: &str) -> Self {
        let mut foo = Foo::new();
        foo.insert("name", name);
        foo
    }

    fn greet(&self) -> String {
        format!("Hello, {}", self.get_str("name").unwrap_or_default())
    }
}

define_document! {
    pub struct Bar;
    collection = "bars",
}

define_document! {
    pub struct Baz;
    collection = "bazs",
}

define_document! {
    pub struct Late;
    collection = "lates",
}

define_document! {
    pub struct Saved;
    collection = "saved",
}

define_document! {
    pub struct Ghost;
    collection = "ghosts",
}

define_document! {
    pub struct Qux;
    collection = "quxs",
}

define_document! {
    pub struct Counter;
    collection = "counters",
}

#[tokio::test]
async fn test_can_be_extended() {
    setup().await;

    let mut f = Foo::named("Adam");
    assert_eq!(f.get_str("name").unwrap(), "Adam");
    assert_eq!(f.greet(), "Hello, Adam");
    assert!(!f.is_persisted(), "保存前不应该有 _id");

    assert_ok!(f.save().await);
    assert!(f.is_persisted());

    let found = assert_ok!(Foo::find_one(doc! { "name": "Adam" }).await).expect("应该能查到 Adam");
    assert_eq!(found.get_str("name").unwrap(), "Adam");
    assert_eq!(found.greet(), "Hello, Adam");
    assert_eq!(found.id(), f.id());
}

#[tokio::test]
async fn test_can_be_saved_more_than_once() {
    setup().await;

    let mut f = Foo::named("Bob");
    assert!(!f.is_persisted());
    assert_ok!(f.save().await);
    assert!(f.is_persisted());

    let magic = random_string();
    f.insert("magic", magic.clone());
    assert_ok!(f.save().await);

    let g = assert_ok!(Foo::get_or_create(doc! { "name": "Bob" }).await);
    assert_eq!(g.get_str("magic").unwrap(), magic);
    assert!(g.is_persisted());

    let id = f.id().cloned().unwrap();
    assert_eq!(assert_ok!(Foo::count(doc! { "_id": id }).await), 1);
}

#[tokio::test]
async fn test_can_use_a_unique_index() {
    setup().await;

    let name = assert_ok!(Bar::create_index(doc! { "name": 1 }, IndexOptions::unique()).await);
    assert_eq!(name, "name_1");
    assert_ok!(Bar::delete_many(doc! {}, DeleteOptions::default()).await);

    let mut bill = Bar::from(doc! { "name": "Bill" });
    let mut bob = Bar::from(doc! { "name": "Bob" });
    assert_ok!(bill.save().await);
    assert!(bill.id().is_some());
    assert_ok!(bob.save().await);
    assert!(bob.id().is_some());

    let mut second_bill = Bar::from(doc! { "name": "Bill" });
    let error = assert_err!(second_bill.save().await);
    println!("✅ 唯一索引冲突: {}", error);
    assert!(error.is_duplicate_key());
    assert!(!second_bill.is_persisted());
    assert_eq!(assert_ok!(Bar::count(doc! { "name": "Bill" }).await), 1);
}

#[tokio::test]
async fn test_get_or_create() {
    setup().await;

    assert_ok!(Baz::delete_many(doc! {}, DeleteOptions::default()).await);
    let mut docs: Vec<Baz> = (0..10)
        .map(|i: i32| Baz::from(doc! { "x": i, "xx": i * i }))
        .collect();
    let results = join_all(docs.iter_mut().map(|d| d.save())).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let doc = assert_ok!(Baz::get_or_create(doc! { "x": 7 }).await);
    assert_eq!(doc.get_i32("xx").unwrap(), 49);

    let fresh = assert_ok!(Baz::get_or_create(doc! { "x": 70 }).await);
    assert!(!fresh.is_persisted());
    assert_eq!(fresh.fields(), &doc! { "x": 70 });
    assert_eq!(assert_ok!(Baz::count(doc! { "x": 70 }).await), 0);
}

#[tokio::test]
async fn test_get_or_create_after_save_returns_persisted_record() {
    setup().await;

    let mut fresh = assert_ok!(Late::get_or_create(doc! { "k": "late" }).await);
    assert!(!fresh.is_persisted());
    assert_ok!(fresh.save().await);
    fresh.insert("extra", true);
    assert_ok!(fresh.save().await);

    let again = assert_ok!(Late::get_or_create(doc! { "k": "late" }).await);
    assert!(again.is_persisted());
    assert_eq!(again.get_bool("extra").unwrap(), true);
}

#[tokio::test]
async fn test_save_returns_the_saved_document() {
    setup().await;

    let mut s = Saved::from(doc! { "value": random_string() });
    assert!(!s.is_persisted());

    let saved_id = {
        let saved = assert_ok!(s.save().await);
        assert!(saved.is_persisted());
        saved.id().cloned()
    };
    assert_eq!(saved_id.as_ref(), s.id());
}

#[tokio::test]
async fn test_from_object_passes_none_through() {
    setup().await;

    assert!(Foo::from_object(None).is_none());
    assert!(Bar::from_object(None).is_none());

    let foo = Foo::from_object(Some(doc! { "name": "Carl" })).unwrap();
    assert_eq!(foo.greet(), "Hello, Carl");
}

#[tokio::test]
async fn test_find_with_no_matches_is_empty() {
    setup().await;

    let mut cursor = assert_ok!(Ghost::find(doc! {}, FindOptions::default()).await);
    assert_eq!(assert_ok!(cursor.count().await), 0);
    assert!(!assert_ok!(cursor.has_next().await));
    assert!(assert_ok!(cursor.to_array().await).is_empty());

    let mut calls = 0;
    let mut cursor = assert_ok!(Ghost::find(doc! {}, FindOptions::default()).await);
    assert_ok!(cursor.each(|_| calls += 1).await);
    assert_eq!(calls, 0);

    let cursor = assert_ok!(Foo::find(doc! { "name": "nobody" }, FindOptions::default()).await);
    let streamed: Vec<Foo> = assert_ok!(cursor.into_stream().try_collect().await);
    assert!(streamed.is_empty());
}

#[tokio::test]
async fn test_cursor_chaining_and_consumption() {
    setup().await;

    assert_ok!(Qux::delete_many(doc! {}, DeleteOptions::default()).await);
    for i in 0..6 {
        let mut qux = Qux::from(doc! { "n": i });
        assert_ok!(qux.save().await);
    }

    let mut cursor = assert_ok!(Qux::find(doc! {}, FindOptions::default()).await);
    cursor
        .filter(doc! { "n": { "$gte": 1 } })
        .unwrap()
        .sort(doc! { "n": -1 })
        .unwrap()
        .skip(1)
        .unwrap()
        .limit(3)
        .unwrap()
        .projection(doc! { "_id": 0 })
        .unwrap();

    assert_eq!(assert_ok!(cursor.count().await), 5);

    let first: Qux = assert_ok!(cursor.next().await).unwrap();
    assert_eq!(first.fields(), &doc! { "n": 4 });

    let error = assert_err!(cursor.limit(10));
    assert!(matches!(error, QuickDocError::CursorConsumed { .. }));

    let rest = assert_ok!(cursor.to_array().await);
    let values: Vec<i32> = rest.iter().map(|q| q.get_i32("n").unwrap()).collect();
    assert_eq!(values, vec![3, 2]);
    assert!(assert_ok!(cursor.next().await).is_none());
}

#[tokio::test]
async fn test_count_update_delete_remove() {
    setup().await;

    assert_ok!(Counter::remove(doc! {}, DeleteOptions::default()).await);
    for tag in ["a", "a", "b"] {
        let mut counter = Counter::from(doc! { "tag": tag, "hits": 0 });
        assert_ok!(counter.save().await);
    }
    assert_eq!(assert_ok!(Counter::count(doc! { "tag": "a" }).await), 2);

    let bump = doc! { "$inc": { "hits": 1 } };
    let outcome = assert_ok!(
        Counter::update_one(doc! { "tag": "a" }, bump.clone(), UpdateOptions::default()).await
    );
    assert_eq!((outcome.matched_count, outcome.modified_count), (1, 1));

    let outcome = assert_ok!(
        Counter::update_many(doc! { "tag": "a" }, bump, UpdateOptions::default()).await
    );
    assert_eq!(outcome.modified_count, 2);
    assert_eq!(assert_ok!(Counter::count(doc! { "hits": { "$gte": 1 } }).await), 2);

    let seed = doc! { "$set": { "hits": 5 } };
    let outcome =
        assert_ok!(Counter::update_one(doc! { "tag": "c" }, seed, UpdateOptions::upsert()).await);
    assert!(outcome.upserted_id.is_some());

    let deleted =
        assert_ok!(Counter::delete_one(doc! { "tag": "a" }, DeleteOptions::default()).await);
    assert_eq!(deleted.deleted_count, 1);

    let removed = assert_ok!(Counter::remove(doc! {}, DeleteOptions::default()).await);
    assert_eq!(removed.deleted_count, 3);
    assert_eq!(assert_ok!(Counter::count(doc! {}).await), 0);
}

#[tokio::test]
async fn test_global_client_reports_database() {
    setup().await;

    let client = rat_quickdoc::get_client(None).await.expect("连接应该可用");
    assert_eq!(client.database_name(), "document_test");
    assert_eq!(client.client().backend_name(), "memory");
}
