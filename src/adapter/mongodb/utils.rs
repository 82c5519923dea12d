//! MongoDB 选项转换工具函数

use crate::types::{FindOptions, IndexModel, WriteConcernLevel};
use ::mongodb::options::{self as mongo_options, Acknowledgment, WriteConcern};

/// 写关注级别转换为驱动的写关注
pub(crate) fn to_write_concern(level: &WriteConcernLevel) -> WriteConcern {
    let acknowledgment = match level {
        WriteConcernLevel::Nodes(n) => Acknowledgment::Nodes(*n),
        WriteConcernLevel::Tagged(tag) if tag == "majority" => Acknowledgment::Majority,
        WriteConcernLevel::Tagged(tag) => Acknowledgment::Custom(tag.clone()),
    };

    let mut write_concern = WriteConcern::default();
    write_concern.w = Some(acknowledgment);
    write_concern
}

/// 索引定义转换为驱动的索引模型
pub(crate) fn to_index_model(index: IndexModel) -> ::mongodb::IndexModel {
    let mut options = mongo_options::IndexOptions::default();
    options.name = Some(index.resolved_name());
    if index.options.unique {
        options.unique = Some(true);
    }
    if index.options.sparse {
        options.sparse = Some(true);
    }

    ::mongodb::IndexModel::builder()
        .keys(index.keys)
        .options(options)
        .build()
}

/// 查询选项转换为驱动的查询选项
pub(crate) fn to_find_options(options: &FindOptions) -> mongo_options::FindOptions {
    let mut find_options = mongo_options::FindOptions::default();
    find_options.projection = options.projection.clone();
    find_options.sort = options.sort.clone();
    find_options.skip = options.skip;
    find_options.limit = options.limit;
    find_options
}
