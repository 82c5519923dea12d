//! 超时竞速工具
//!
//! 多个并发的 future 中第一个完成的胜出，其余的被丢弃。
//! 丢弃只表示不再等待，已经发出的底层请求不会因此被撤回

use futures::future::{select_all, BoxFuture};
use std::future::Future;
use std::time::Duration;

/// 与时限竞速的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Raced<T> {
    /// future 先完成
    Settled(T),
    /// 时限先到
    Elapsed,
}

impl<T> Raced<T> {
    pub fn is_elapsed(&self) -> bool {
        matches!(self, Raced::Elapsed)
    }

    /// 时限先到时返回 `None`
    pub fn into_option(self) -> Option<T> {
        match self {
            Raced::Settled(value) => Some(value),
            Raced::Elapsed => None,
        }
    }
}

/// 让单个 future 与时限竞速
pub async fn race_timeout<F>(limit: Duration, future: F) -> Raced<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(limit, future).await {
        Ok(value) => Raced::Settled(value),
        Err(_) => Raced::Elapsed,
    }
}

/// 多个 future 竞速，返回第一个完成的值，列表为空时返回 `None`
pub async fn race_first<'a, T>(contenders: Vec<BoxFuture<'a, T>>) -> Option<T> {
    if contenders.is_empty() {
        return None;
    }
    let (winner, _index, _losers) = select_all(contenders).await;
    Some(winner)
}

/// 经过 `limit` 后给出 `value`，作为竞速中的时限一方
pub async fn timeout_value<T>(limit: Duration, value: T) -> T {
    tokio::time::sleep(limit).await;
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[tokio::test]
    async fn test_race_timeout() {
        let fast = race_timeout(Duration::from_millis(200), async { 7 }).await;
        assert_eq!(fast, Raced::Settled(7));

        let slow = race_timeout(
            Duration::from_millis(10),
            timeout_value(Duration::from_millis(500), 7),
        )
        .await;
        assert!(slow.is_elapsed());
        assert_eq!(slow.into_option(), None);
    }

    #[tokio::test]
    async fn test_race_first_picks_earliest() {
        let winner = race_first(vec![
            timeout_value(Duration::from_millis(300), "slow").boxed(),
            timeout_value(Duration::from_millis(5), "fast").boxed(),
        ])
        .await;
        assert_eq!(winner, Some("fast"));

        let nobody: Option<u8> = race_first(Vec::new()).await;
        assert!(nobody.is_none());
    }
}
