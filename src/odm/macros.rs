//! 文档类型定义宏

/// 便捷宏：定义文档类型
///
/// 生成包装 `Fields` 的新类型、`Document` 实现（描述在首次使用时创建）、
/// 到 `Fields` 的 `Deref`/`DerefMut`，以及委托给描述的静态操作和 `save`。
/// 生成的类型可以继续添加自己的方法，查询结果会还原为该类型
///
/// ```ignore
/// rat_quickdoc::define_document! {
///     pub struct Foo;
///     collection = "foos",
///     options = DocumentOptions::default(),
/// }
/// ```
#[macro_export]
macro_rules! define_document {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident;
        collection = $collection:expr
        $(, options = $options:expr)?
        $(, connection = $connection:expr)?
        $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name($crate::types::Fields);

        impl $crate::odm::Document for $name {
            fn document_type() -> &'static $crate::odm::DocumentType<Self> {
                static DESCRIPTOR: $crate::once_cell::sync::Lazy<$crate::odm::DocumentType<$name>> =
                    $crate::once_cell::sync::Lazy::new(|| {
                        $crate::odm::DocumentType::new(
                            $collection,
                            $crate::__document_options!($($options)?),
                        )
                        $(.with_connection($connection))?
                    });
                &DESCRIPTOR
            }

            fn from_fields(fields: $crate::types::Fields) -> Self {
                $name(fields)
            }

            fn fields(&self) -> &$crate::types::Fields {
                &self.0
            }

            fn fields_mut(&mut self) -> &mut $crate::types::Fields {
                &mut self.0
            }

            fn into_fields(self) -> $crate::types::Fields {
                self.0
            }
        }

        impl From<$crate::types::Fields> for $name {
            fn from(fields: $crate::types::Fields) -> Self {
                $name(fields)
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::types::Fields;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        #[allow(dead_code)]
        impl $name {
            /// 创建没有任何字段的新实例
            pub fn new() -> Self {
                Self::default()
            }

            /// 该类型的描述
            pub fn document_type() -> &'static $crate::odm::DocumentType<Self> {
                <Self as $crate::odm::Document>::document_type()
            }

            /// 把字段映射还原为该类型，`None` 原样返回
            pub fn from_object(fields: Option<$crate::types::Fields>) -> Option<Self> {
                Self::document_type().from_object(fields)
            }

            /// 是否已经持久化
            pub fn is_persisted(&self) -> bool {
                <Self as $crate::odm::Document>::is_persisted(self)
            }

            /// 保存实例，首次保存后实例带有 `_id`
            pub async fn save(&mut self) -> $crate::error::QuickDocResult<&mut Self> {
                Self::document_type().save(self).await
            }

            pub async fn count(
                filter: $crate::bson::Document,
            ) -> $crate::error::QuickDocResult<u64> {
                Self::document_type().count(filter).await
            }

            pub async fn create_indexes(
                indexes: Vec<$crate::types::IndexModel>,
            ) -> $crate::error::QuickDocResult<Vec<String>> {
                Self::document_type().create_indexes(indexes).await
            }

            pub async fn create_index(
                keys: $crate::bson::Document,
                options: $crate::types::IndexOptions,
            ) -> $crate::error::QuickDocResult<String> {
                Self::document_type().create_index(keys, options).await
            }

            pub async fn update_one(
                filter: $crate::bson::Document,
                update: $crate::bson::Document,
                options: $crate::types::UpdateOptions,
            ) -> $crate::error::QuickDocResult<$crate::types::UpdateOutcome> {
                Self::document_type().update_one(filter, update, options).await
            }

            pub async fn update_many(
                filter: $crate::bson::Document,
                update: $crate::bson::Document,
                options: $crate::types::UpdateOptions,
            ) -> $crate::error::QuickDocResult<$crate::types::UpdateOutcome> {
                Self::document_type().update_many(filter, update, options).await
            }

            pub async fn delete_one(
                filter: $crate::bson::Document,
                options: $crate::types::DeleteOptions,
            ) -> $crate::error::QuickDocResult<$crate::types::DeleteOutcome> {
                Self::document_type().delete_one(filter, options).await
            }

            pub async fn delete_many(
                filter: $crate::bson::Document,
                options: $crate::types::DeleteOptions,
            ) -> $crate::error::QuickDocResult<$crate::types::DeleteOutcome> {
                Self::document_type().delete_many(filter, options).await
            }

            pub async fn remove(
                filter: $crate::bson::Document,
                options: $crate::types::DeleteOptions,
            ) -> $crate::error::QuickDocResult<$crate::types::DeleteOutcome> {
                Self::document_type().remove(filter, options).await
            }

            pub async fn find_one(
                filter: $crate::bson::Document,
            ) -> $crate::error::QuickDocResult<Option<Self>> {
                Self::document_type().find_one(filter).await
            }

            pub async fn find(
                filter: $crate::bson::Document,
                options: $crate::types::FindOptions,
            ) -> $crate::error::QuickDocResult<$crate::odm::DocumentCursor<Self>> {
                Self::document_type().find(filter, options).await
            }

            pub async fn get_or_create(
                fields: $crate::types::Fields,
            ) -> $crate::error::QuickDocResult<Self> {
                Self::document_type().get_or_create(fields).await
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __document_options {
    () => {
        $crate::config::DocumentOptions::default()
    };
    ($options:expr) => {
        $options
    };
}
