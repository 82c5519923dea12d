//! 错误类型定义
//!
//! 所有操作统一返回 `QuickDocResult<T>`，超时也以错误值返回

use thiserror::Error;

/// rat_quickdoc 错误类型
#[derive(Error, Debug)]
pub enum QuickDocError {
    /// 获取连接失败：等待超时，或者连接在启动阶段已经失败
    #[error("{message}")]
    ConnectionUnavailable { message: String },

    /// 连接启动失败（驱动连接报错或超过启动等待上限）
    #[error("{message}")]
    BootstrapFailure { message: String },

    /// 单个操作超过了文档类型配置的超时时间
    ///
    /// 超时只代表放弃等待，底层请求不保证被取消
    #[error("{}", crate::i18n::tf("error.operation_timeout", &[
        ("operation", .operation.as_str()),
        ("collection", .collection.as_str()),
        ("timeout_ms", .timeout_ms.to_string().as_str()),
    ]))]
    OperationTimeout {
        operation: String,
        collection: String,
        timeout_ms: u64,
    },

    /// 游标已开始迭代后又调用了塑形方法
    #[error("{}", crate::i18n::tf("error.cursor_consumed", &[("method", .method.as_str())]))]
    CursorConsumed { method: String },

    /// 唯一索引冲突（内存后端），MongoDB 的冲突保持为 `Mongo` 原样返回
    #[error("{message}")]
    DuplicateKey {
        collection: String,
        index: String,
        message: String,
    },

    /// 查询执行错误
    #[error("{}", crate::i18n::tf("error.query", &[("message", .message.as_str())]))]
    QueryError { message: String },

    /// 连接串指向不支持的后端
    #[error("{}", crate::i18n::tf("error.unsupported_backend", &[("url", .url.as_str())]))]
    UnsupportedBackend { url: String },

    /// 配置错误
    #[error("{}", crate::i18n::tf("error.config", &[("message", .message.as_str())]))]
    ConfigError { message: String },

    /// 序列化错误
    #[error("{message}")]
    SerializationError { message: String },

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// MongoDB 驱动错误，原样透传
    #[cfg(feature = "mongodb-support")]
    #[error("MongoDB驱动错误: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// rat_quickdoc 结果类型
pub type QuickDocResult<T> = Result<T, QuickDocError>;

impl QuickDocError {
    /// 是否为连接不可用
    pub fn is_connection_unavailable(&self) -> bool {
        matches!(self, QuickDocError::ConnectionUnavailable { .. })
    }

    /// 是否为操作超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, QuickDocError::OperationTimeout { .. })
    }

    /// 是否为唯一索引冲突，同时识别内存后端和 MongoDB 的 E11000
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            QuickDocError::DuplicateKey { .. } => true,
            #[cfg(feature = "mongodb-support")]
            QuickDocError::Mongo(e) => is_mongo_duplicate_key(e),
            _ => false,
        }
    }
}

#[cfg(feature = "mongodb-support")]
fn is_mongo_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    const DUPLICATE_KEY_CODE: i32 = 11000;

    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().any(|e| e.code == DUPLICATE_KEY_CODE))
            .unwrap_or(false),
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

impl From<bson::ser::Error> for QuickDocError {
    fn from(e: bson::ser::Error) -> Self {
        let message = e.to_string();
        crate::quick_error!(
            serialization,
            crate::i18n::tf("error.serialize", &[("message", message.as_str())])
        )
    }
}

impl From<bson::de::Error> for QuickDocError {
    fn from(e: bson::de::Error) -> Self {
        let message = e.to_string();
        crate::quick_error!(
            serialization,
            crate::i18n::tf("error.serialize", &[("message", message.as_str())])
        )
    }
}

/// 便捷宏：构造常用错误
#[macro_export]
macro_rules! quick_error {
    (connection, $msg:expr) => {
        $crate::error::QuickDocError::ConnectionUnavailable {
            message: $msg.to_string(),
        }
    };
    (bootstrap, $msg:expr) => {
        $crate::error::QuickDocError::BootstrapFailure {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::QuickDocError::QueryError {
            message: $msg.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::QuickDocError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::QuickDocError::SerializationError {
            message: $msg.to_string(),
        }
    };
    (cursor_consumed, $method:expr) => {
        $crate::error::QuickDocError::CursorConsumed {
            method: $method.to_string(),
        }
    };
    (unsupported_backend, $url:expr) => {
        $crate::error::QuickDocError::UnsupportedBackend {
            url: $url.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let timeout = QuickDocError::OperationTimeout {
            operation: "find_one".to_string(),
            collection: "foos".to_string(),
            timeout_ms: 10,
        };
        assert!(timeout.is_timeout());
        assert!(!timeout.is_connection_unavailable());

        let unavailable = crate::quick_error!(connection, "未连接");
        assert!(unavailable.is_connection_unavailable());
        assert_eq!(unavailable.to_string(), "未连接");

        let duplicate = QuickDocError::DuplicateKey {
            collection: "bars".to_string(),
            index: "name_1".to_string(),
            message: "dup".to_string(),
        };
        assert!(duplicate.is_duplicate_key());
        assert!(!crate::quick_error!(query, "x").is_duplicate_key());
    }
}
