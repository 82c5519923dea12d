//! # 文档类型描述
//!
//! 每个文档类型对应一个描述：集合名、选项、绑定的连接以及把字段映射还原为具体类型的工厂函数。
//! 描述创建后不可变

use crate::config::DocumentOptions;
use crate::connection::{global_connection, ConnectionHandle};
use crate::odm::traits::Document;
use crate::types::Fields;
use std::fmt;

/// 文档类型描述
pub struct DocumentType<T> {
    pub(crate) collection: String,
    pub(crate) options: DocumentOptions,
    pub(crate) connection: ConnectionHandle,
    pub(crate) rehydrate: fn(Fields) -> T,
}

impl<T: Document> DocumentType<T> {
    /// 创建绑定到全局连接的文档类型，工厂函数使用 `Document::from_fields`
    pub fn new(collection: impl Into<String>, options: DocumentOptions) -> Self {
        Self::with_factory(collection, options, T::from_fields)
    }
}

impl<T> DocumentType<T> {
    /// 使用自定义工厂函数创建文档类型
    pub fn with_factory(
        collection: impl Into<String>,
        options: DocumentOptions,
        factory: fn(Fields) -> T,
    ) -> Self {
        let collection = collection.into();
        crate::debug_log!(
            "定义文档类型: 集合={}, 超时={}ms, 写关注={}",
            collection,
            options.operation_timeout_ms,
            options.write_concern
        );
        Self {
            collection,
            options,
            connection: global_connection().clone(),
            rehydrate: factory,
        }
    }

    /// 绑定到指定的连接句柄
    pub fn with_connection(mut self, connection: ConnectionHandle) -> Self {
        self.connection = connection;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// 把字段映射还原为该类型的实例，`None` 原样返回
    pub fn from_object(&self, fields: Option<Fields>) -> Option<T> {
        fields.map(self.rehydrate)
    }
}

impl<T> fmt::Debug for DocumentType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentType")
            .field("collection", &self.collection)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WriteConcernLevel;
    use bson::doc;

    #[derive(Debug, PartialEq)]
    struct Tagged(Fields);

    #[test]
    fn test_from_object_passes_none_through() {
        let foos = DocumentType::with_factory("foos", DocumentOptions::default(), Tagged);
        assert_eq!(foos.from_object(None), None);
        assert_eq!(
            foos.from_object(Some(doc! { "name": "Adam" })),
            Some(Tagged(doc! { "name": "Adam" }))
        );
    }

    #[test]
    fn test_default_options() {
        let foos = DocumentType::with_factory("foos", DocumentOptions::default(), Tagged);
        assert_eq!(foos.collection(), "foos");
        assert_eq!(foos.options().operation_timeout_ms, 1000);
        assert_eq!(foos.options().write_concern, WriteConcernLevel::Nodes(1));
    }
}
