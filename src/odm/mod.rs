//! # 文档映射层模块
//!
//! 文档类型描述、操作分发与游标适配
//! - traits.rs: `Document` trait
//! - document.rs: 文档类型描述与还原
//! - dispatch.rs: 各个操作的实现
//! - cursor.rs: 带类型的惰性游标
//! - macros.rs: `define_document!` 宏

pub mod traits;
pub mod document;
pub mod dispatch;
pub mod cursor;
pub mod macros;

// 重新导出所有公共类型
pub use traits::Document;
pub use document::DocumentType;
pub use cursor::DocumentCursor;
