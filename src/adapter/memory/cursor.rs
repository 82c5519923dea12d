//! 内存游标
//!
//! 首次消费时对集合做快照，之后的写入不影响已经开始的迭代

use crate::adapter::memory::matcher;
use crate::adapter::memory::store::CollectionState;
use crate::adapter::DriverCursor;
use crate::error::QuickDocResult;
use crate::types::FindOptions;
use async_trait::async_trait;
use bson::Document;
use std::collections::VecDeque;
use std::sync::Arc;

pub struct MemoryCursor {
    source: Arc<CollectionState>,
    filter: Document,
    options: FindOptions,
    buffer: Option<VecDeque<Document>>,
}

impl MemoryCursor {
    pub(crate) fn new(
        source: Arc<CollectionState>,
        filter: Document,
        options: FindOptions,
    ) -> Self {
        Self {
            source,
            filter,
            options,
            buffer: None,
        }
    }

    fn snapshot(&self) -> QuickDocResult<VecDeque<Document>> {
        let mut selected = Vec::new();
        {
            let data = self.source.read();
            for document in &data.documents {
                if matcher::matches(document, &self.filter)? {
                    selected.push(document.clone());
                }
            }
        }

        if let Some(sort) = &self.options.sort {
            matcher::sort_documents(&mut selected, sort);
        }

        let skip = self.options.skip.unwrap_or(0) as usize;
        // 负数上限按绝对值处理，0 表示不限制
        let limit = match self.options.limit.map(|l| l.unsigned_abs() as usize) {
            Some(0) | None => usize::MAX,
            Some(limit) => limit,
        };

        let mut window = VecDeque::new();
        for document in selected.into_iter().skip(skip).take(limit) {
            let shaped = match &self.options.projection {
                Some(projection) => matcher::project(&document, projection)?,
                None => document,
            };
            window.push_back(shaped);
        }
        Ok(window)
    }

    fn buffer(&mut self) -> QuickDocResult<&mut VecDeque<Document>> {
        if self.buffer.is_none() {
            self.buffer = Some(self.snapshot()?);
        }
        Ok(self.buffer.get_or_insert_with(VecDeque::new))
    }
}

#[async_trait]
impl DriverCursor for MemoryCursor {
    fn filter(&mut self, filter: Document) {
        self.filter = filter;
    }

    fn projection(&mut self, projection: Document) {
        self.options.projection = Some(projection);
    }

    fn sort(&mut self, sort: Document) {
        self.options.sort = Some(sort);
    }

    fn skip(&mut self, skip: u64) {
        self.options.skip = Some(skip);
    }

    fn limit(&mut self, limit: i64) {
        self.options.limit = Some(limit);
    }

    async fn count(&mut self) -> QuickDocResult<u64> {
        let data = self.source.read();
        let mut count = 0;
        for document in &data.documents {
            if matcher::matches(document, &self.filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn has_next(&mut self) -> QuickDocResult<bool> {
        Ok(!self.buffer()?.is_empty())
    }

    async fn next(&mut self) -> QuickDocResult<Option<Document>> {
        Ok(self.buffer()?.pop_front())
    }
}
