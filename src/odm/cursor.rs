//! # 文档游标
//!
//! 包装驱动游标，产出还原后的文档类型实例。
//! 首次消费前可以链式调整查询，开始消费后再调整会返回 `CursorConsumed`

use crate::adapter::{DriverCursor, EmptyCursor};
use crate::error::{QuickDocError, QuickDocResult};
use crate::types::Fields;
use bson::Document;
use futures::stream::{self, Stream};

pub struct DocumentCursor<T> {
    inner: Box<dyn DriverCursor>,
    rehydrate: fn(Fields) -> T,
    started: bool,
}

impl<T> DocumentCursor<T> {
    pub(crate) fn new(inner: Box<dyn DriverCursor>, rehydrate: fn(Fields) -> T) -> Self {
        Self {
            inner,
            rehydrate,
            started: false,
        }
    }

    /// 空游标：没有元素，计数为零，调整查询不产生任何效果
    pub fn empty(rehydrate: fn(Fields) -> T) -> Self {
        Self::new(Box::new(EmptyCursor), rehydrate)
    }

    /// 是否已经开始消费
    pub fn is_started(&self) -> bool {
        self.started
    }

    fn shape(
        &mut self,
        method: &str,
        apply: impl FnOnce(&mut dyn DriverCursor),
    ) -> QuickDocResult<&mut Self> {
        if self.started {
            return Err(crate::quick_error!(cursor_consumed, method));
        }
        apply(self.inner.as_mut());
        Ok(self)
    }

    pub fn filter(&mut self, filter: Document) -> QuickDocResult<&mut Self> {
        self.shape("filter", |cursor| cursor.filter(filter))
    }

    pub fn projection(&mut self, projection: Document) -> QuickDocResult<&mut Self> {
        self.shape("projection", |cursor| cursor.projection(projection))
    }

    pub fn sort(&mut self, sort: Document) -> QuickDocResult<&mut Self> {
        self.shape("sort", |cursor| cursor.sort(sort))
    }

    pub fn skip(&mut self, skip: u64) -> QuickDocResult<&mut Self> {
        self.shape("skip", |cursor| cursor.skip(skip))
    }

    pub fn limit(&mut self, limit: i64) -> QuickDocResult<&mut Self> {
        self.shape("limit", |cursor| cursor.limit(limit))
    }

    /// 匹配总数，与当前位置无关
    pub async fn count(&mut self) -> QuickDocResult<u64> {
        self.inner.count().await
    }

    pub async fn has_next(&mut self) -> QuickDocResult<bool> {
        self.started = true;
        self.inner.has_next().await
    }

    /// 取出下一个实例，耗尽后返回 `None`
    pub async fn next(&mut self) -> QuickDocResult<Option<T>> {
        self.started = true;
        Ok(self.inner.next().await?.map(self.rehydrate))
    }

    /// 对剩余的每个实例调用回调
    pub async fn each<F>(&mut self, mut callback: F) -> QuickDocResult<()>
    where
        F: FnMut(T),
    {
        while let Some(item) = self.next().await? {
            callback(item);
        }
        Ok(())
    }

    /// 按顺序收集剩余的全部实例
    pub async fn to_array(&mut self) -> QuickDocResult<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// 转为惰性流，有限且不能重新开始
    pub fn into_stream(self) -> impl Stream<Item = QuickDocResult<T>> {
        stream::try_unfold(self, |mut cursor| async move {
            let item = cursor.next().await?;
            Ok::<_, QuickDocError>(item.map(|item| (item, cursor)))
        })
    }
}

impl<T> std::fmt::Debug for DocumentCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCursor")
            .field("started", &self.started)
            .finish()
    }
}
