//! 文档trait定义

use crate::error::QuickDocResult;
use crate::odm::document::DocumentType;
use crate::types::{Fields, ID_FIELD};
use bson::Bson;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 文档trait
///
/// 文档就是一个开放的字段映射。每个实现类型持有自己的 `DocumentType` 描述，
/// 查询结果通过描述中的工厂函数还原为该类型，而不是通用的字段映射。
/// 一般通过 `define_document!` 宏实现
pub trait Document: Sized + Send + Sync + 'static {
    /// 该类型的描述：集合名、选项、连接与工厂函数
    fn document_type() -> &'static DocumentType<Self>;

    /// 从字段映射构造实例
    fn from_fields(fields: Fields) -> Self;

    fn fields(&self) -> &Fields;

    fn fields_mut(&mut self) -> &mut Fields;

    fn into_fields(self) -> Fields;

    /// 标识字段，未持久化时为 `None`
    fn id(&self) -> Option<&Bson> {
        self.fields().get(ID_FIELD)
    }

    /// 是否已经持久化，只看 `_id` 是否存在
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// 从可序列化的结构体构造实例
    ///
    /// 值必须序列化为文档，标量或数组会返回序列化错误
    fn from_serializable<S: Serialize>(value: &S) -> QuickDocResult<Self> {
        let fields = bson::to_document(value)?;
        Ok(Self::from_fields(fields))
    }

    /// 把字段反序列化为指定的结构体
    fn deserialize_into<S: DeserializeOwned>(&self) -> QuickDocResult<S> {
        Ok(bson::from_document(self.fields().clone())?)
    }
}
