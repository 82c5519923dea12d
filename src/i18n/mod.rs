//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册单条消息的三种语言版本
    fn insert(
        translations: &mut HashMap<String, HashMap<String, String>>,
        key: &str,
        zh: &str,
        en: &str,
        ja: &str,
    ) {
        let mut messages = HashMap::new();
        messages.insert("zh-CN".to_string(), zh.to_string());
        messages.insert("en-US".to_string(), en.to_string());
        messages.insert("ja-JP".to_string(), ja.to_string());
        translations.insert(key.to_string(), messages);
    }

    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        // 连接获取失败
        Self::insert(
            &mut translations,
            "error.connection_wait_elapsed",
            "等待数据库连接超时（{timeout_ms}ms），连接尚未建立",
            "Timed out after {timeout_ms}ms waiting for the database connection",
            "データベース接続の待機がタイムアウトしました（{timeout_ms}ms）",
        );
        Self::insert(
            &mut translations,
            "error.connection_failed",
            "数据库连接不可用: {message}",
            "Database connection unavailable: {message}",
            "データベース接続が利用できません: {message}",
        );

        // 连接启动失败
        Self::insert(
            &mut translations,
            "error.bootstrap_timeout",
            "连接 {url} 超时（{timeout_ms}ms）",
            "Connecting to {url} timed out after {timeout_ms}ms",
            "{url} への接続がタイムアウトしました（{timeout_ms}ms）",
        );
        Self::insert(
            &mut translations,
            "error.bootstrap_failed",
            "连接 {url} 失败: {message}",
            "Failed to connect to {url}: {message}",
            "{url} への接続に失敗しました: {message}",
        );

        // 操作超时
        Self::insert(
            &mut translations,
            "error.operation_timeout",
            "集合 {collection} 的 {operation} 操作超时（{timeout_ms}ms）",
            "{operation} on collection {collection} timed out after {timeout_ms}ms",
            "コレクション {collection} の {operation} 操作がタイムアウトしました（{timeout_ms}ms）",
        );

        // 游标
        Self::insert(
            &mut translations,
            "error.cursor_consumed",
            "游标已开始迭代，不能再调用 {method}",
            "Cursor iteration has started, {method} is no longer allowed",
            "カーソルの反復が開始されたため {method} は呼び出せません",
        );

        // 唯一索引冲突
        Self::insert(
            &mut translations,
            "error.duplicate_key",
            "集合 {collection} 的唯一索引 {index} 冲突: {key}",
            "Duplicate key on collection {collection}, index {index}: {key}",
            "コレクション {collection} の一意インデックス {index} が重複しています: {key}",
        );

        // 查询错误
        Self::insert(
            &mut translations,
            "error.query",
            "查询执行失败: {message}",
            "Query execution failed: {message}",
            "クエリ実行が失敗しました: {message}",
        );

        // 不支持的后端
        Self::insert(
            &mut translations,
            "error.unsupported_backend",
            "不支持的连接串: {url}",
            "Unsupported connection string: {url}",
            "サポートされていない接続文字列: {url}",
        );

        // 配置错误
        Self::insert(
            &mut translations,
            "error.config",
            "配置错误: {message}",
            "Configuration error: {message}",
            "設定エラー: {message}",
        );

        // 序列化
        Self::insert(
            &mut translations,
            "error.serialize",
            "序列化失败: {message}",
            "Serialization failed: {message}",
            "シリアライズ失敗: {message}",
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}


/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
