//! # Result resolution.
//!
//! Normalizes whatever a callback returned into a terminal [`TaskOutput`]:
//!
//! ```text
//! resolve(value):
//!   Empty        → None                         (terminal)
//!   Plain(out)   → Some(out)                    (terminal)
//!   Callable(f)  → resolve(f())
//!   Deferred(fu) → resolve(fu.await?)           failure → Err(Deferred)
//!   Stream(s)    → resolve(first item of s)     s dropped after the first item
//!                                               error   → Err(Stream)
//!                                               no item → None
//! ```
//!
//! ## Rules
//! - Shapes nest arbitrarily; every layer is unwrapped the same way.
//! - No cycle detection. A callable returning itself recurses forever unless a
//!   depth limit is given (see [`SchedulerConfig::max_resolve_depth`](crate::SchedulerConfig)).
//! - [`resolve`] turns any failure into `None` (logged); [`try_resolve`] returns it.

use futures::StreamExt;
use futures::future::BoxFuture;

use crate::error::ExecutionError;
use crate::tasks::{TaskOutput, TaskValue};

/// Resolves `value` to its terminal output; failures are logged and become `None`.
///
/// ## Example
/// ```rust
/// use cronvisor::{resolve, TaskValue};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let v = TaskValue::callable(|| TaskValue::deferred(async { Ok(TaskValue::plain(7_i32)) }));
///     let out = resolve(v).await.unwrap();
///     assert_eq!(out.downcast_ref::<i32>(), Some(&7));
/// }
/// ```
pub async fn resolve(value: TaskValue) -> Option<TaskOutput> {
    match try_resolve(value, None).await {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(error = %err, label = err.as_label(), "result resolution failed");
            None
        }
    }
}

/// Resolves `value`, returning the first failure.
///
/// `limit` bounds how many wrapper layers (callable/deferred/stream) are unwrapped;
/// `None` means unbounded.
pub fn try_resolve(
    value: TaskValue,
    limit: Option<usize>,
) -> BoxFuture<'static, Result<Option<TaskOutput>, ExecutionError>> {
    resolve_at(value, 0, limit)
}

fn resolve_at(
    value: TaskValue,
    depth: usize,
    limit: Option<usize>,
) -> BoxFuture<'static, Result<Option<TaskOutput>, ExecutionError>> {
    Box::pin(async move {
        match value {
            TaskValue::Empty => Ok(None),
            TaskValue::Plain(out) => Ok(Some(out)),
            TaskValue::Callable(f) => {
                let depth = descend(depth, limit)?;
                resolve_at(f(), depth, limit).await
            }
            TaskValue::Deferred(fut) => {
                let depth = descend(depth, limit)?;
                let next = fut.await.map_err(as_deferred)?;
                resolve_at(next, depth, limit).await
            }
            TaskValue::Stream(mut stream) => {
                let depth = descend(depth, limit)?;
                let first = stream.next().await;
                drop(stream);
                match first {
                    Some(Ok(next)) => resolve_at(next, depth, limit).await,
                    Some(Err(e)) => Err(as_stream(e)),
                    None => Ok(None),
                }
            }
        }
    })
}

fn descend(depth: usize, limit: Option<usize>) -> Result<usize, ExecutionError> {
    match limit {
        Some(limit) if depth >= limit => Err(ExecutionError::DepthExceeded { limit }),
        _ => Ok(depth + 1),
    }
}

fn as_deferred(err: ExecutionError) -> ExecutionError {
    match err {
        ExecutionError::Callback { error } => ExecutionError::Deferred { error },
        other => other,
    }
}

fn as_stream(err: ExecutionError) -> ExecutionError {
    match err {
        ExecutionError::Callback { error } => ExecutionError::Stream { error },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_plain_and_empty_are_terminal() {
        assert!(resolve(TaskValue::empty()).await.is_none());
        let out = resolve(TaskValue::plain("x")).await.unwrap();
        assert_eq!(out.downcast_ref::<&str>(), Some(&"x"));
    }

    #[tokio::test]
    async fn test_callable_deferred_stream_chain() {
        let v = TaskValue::callable(|| {
            TaskValue::deferred(async {
                Ok(TaskValue::stream(stream::iter(vec![Ok(TaskValue::plain(42_i32))])))
            })
        });
        let out = resolve(v).await.unwrap();
        assert_eq!(out.downcast_ref::<i32>(), Some(&42));
    }

    #[tokio::test]
    async fn test_stream_takes_first_item_only() {
        let pulled_second = Arc::new(AtomicBool::new(false));
        let flag = pulled_second.clone();
        let s = stream::iter(vec![1_u8, 2_u8]).map(move |n| {
            if n == 2 {
                flag.store(true, Ordering::SeqCst);
            }
            Ok(TaskValue::plain(n))
        });

        let out = resolve(TaskValue::stream(s)).await.unwrap();
        assert_eq!(out.downcast_ref::<u8>(), Some(&1));
        assert!(!pulled_second.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stream_without_items_is_absent() {
        let s = stream::empty::<Result<TaskValue, ExecutionError>>();
        assert!(try_resolve(TaskValue::stream(s), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failures_are_tagged_and_absent() {
        let deferred = TaskValue::deferred(async { Err(ExecutionError::fail("db down")) });
        assert_eq!(
            try_resolve(deferred, None).await.unwrap_err(),
            ExecutionError::Deferred {
                error: "db down".into()
            }
        );

        let s = stream::iter(vec![Err(ExecutionError::fail("closed"))]);
        assert_eq!(
            try_resolve(TaskValue::stream(s), None).await.unwrap_err(),
            ExecutionError::Stream {
                error: "closed".into()
            }
        );

        let deferred = TaskValue::deferred(async { Err(ExecutionError::fail("db down")) });
        assert!(resolve(deferred).await.is_none());
    }

    fn looping() -> TaskValue {
        TaskValue::callable(looping)
    }

    #[tokio::test]
    async fn test_depth_limit_stops_self_returning_callable() {
        let err = try_resolve(looping(), Some(16)).await.unwrap_err();
        assert_eq!(err, ExecutionError::DepthExceeded { limit: 16 });
    }

    #[tokio::test]
    async fn test_depth_limit_counts_layers() {
        let v = TaskValue::callable(|| TaskValue::callable(|| TaskValue::plain(1_u8)));
        assert!(try_resolve(v, Some(2)).await.unwrap().is_some());

        let v = TaskValue::callable(|| TaskValue::callable(|| TaskValue::plain(1_u8)));
        assert!(try_resolve(v, Some(1)).await.is_err());
    }
}
