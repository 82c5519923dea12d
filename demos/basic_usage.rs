//! RatQuickDoc 基本使用示例
//!
//! 默认使用内存后端，传入连接串参数可以切换到 MongoDB：
//! `cargo run --example basic_usage -- mongodb://localhost:27017/quickdoc_demo`

use futures::TryStreamExt;
use rat_logger::{handler::term::TermConfig, LoggerBuilder};
use rat_quickdoc::*;

define_document! {
    /// 用户文档
    pub struct User;
    collection = "users",
}

impl User {
    fn name(&self) -> &str {
        self.get_str("name").unwrap_or("<unknown>")
    }
}

#[tokio::main]
async fn main() -> QuickDocResult<()> {
    LoggerBuilder::new()
        .add_terminal_with_config(TermConfig::default())
        .init()
        .expect("日志初始化失败");
    rat_quickdoc::init();

    println!("=== RatQuickDoc 基本使用示例 ===");
    println!("库版本: {}", rat_quickdoc::get_info());

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "memory://localhost/quickdoc_demo".to_string());

    // 1. 建立连接
    println!("\n1. 连接 {} ...", url);
    rat_quickdoc::connect(&url).await?;
    let client = rat_quickdoc::get_client(None).await;
    match &client {
        Some(client) => println!("✅ 已连接数据库: {}", client.database_name()),
        None => println!("❌ 连接不可用"),
    }

    // 2. 索引
    println!("\n2. 创建唯一索引...");
    let index = User::create_index(doc! { "name": 1 }, IndexOptions::unique()).await?;
    println!("✅ 索引: {}", index);

    // 3. 保存与读取
    println!("\n3. 保存文档...");
    for (name, age) in [("alice", 31), ("bob", 27), ("carol", 45)] {
        let mut user = User::from(doc! { "name": name, "age": age });
        user.save().await?;
        println!("✅ 保存 {} -> _id={:?}", user.name(), user.get(ID_FIELD));
    }

    let mut duplicate = User::from(doc! { "name": "alice" });
    match duplicate.save().await {
        Err(e) if e.is_duplicate_key() => println!("✅ 重复的用户名被拒绝: {}", e),
        other => println!("❌ 预期重复键错误，实际成功={}", other.is_ok()),
    }

    if let Some(bob) = User::find_one(doc! { "name": "bob" }).await? {
        println!("✅ 找到 {}，年龄 {:?}", bob.name(), bob.get("age"));
    }

    // 4. 更新
    println!("\n4. 更新文档...");
    let outcome = User::update_many(
        doc! { "age": { "$gte": 30 } },
        doc! { "$set": { "senior": true } },
        UpdateOptions::default(),
    )
    .await?;
    println!("✅ 匹配 {}，修改 {}", outcome.matched_count, outcome.modified_count);

    // 5. 游标
    println!("\n5. 游标查询...");
    let mut cursor = User::find(doc! {}, FindOptions::default()).await?;
    cursor.sort(doc! { "age": -1 })?.limit(2)?;
    println!("匹配总数: {}", cursor.count().await?);
    for user in cursor.to_array().await? {
        println!("  - {} ({:?})", user.name(), user.get("age"));
    }
    if let Err(e) = cursor.skip(1) {
        println!("✅ 消费后不能再调整游标: {}", e);
    }

    let names: Vec<String> = User::find(doc! { "senior": true }, FindOptions::default())
        .await?
        .into_stream()
        .map_ok(|user| user.name().to_string())
        .try_collect()
        .await?;
    println!("流式读取: {:?}", names);

    // 6. 查找或创建
    println!("\n6. 查找或创建...");
    let dave = User::get_or_create(doc! { "name": "dave" }).await?;
    println!("dave 已持久化: {}", dave.is_persisted());

    // 7. 删除
    println!("\n7. 删除与清理...");
    let deleted = User::remove(doc! { "name": "bob" }, DeleteOptions::default()).await?;
    println!("✅ 删除 {} 个文档，剩余 {}", deleted.deleted_count, User::count(doc! {}).await?);

    if let Some(client) = client {
        let dropped = rat_quickdoc::drop_database(
            client.database_name(),
            DropDatabaseOptions::default(),
        )
        .await?;
        println!("✅ 删除数据库 {} (确认={})", dropped.database, dropped.acknowledged);
    }

    println!("\n=== 示例完成 ===");
    Ok(())
}
