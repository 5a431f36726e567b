//! # Callback return values.
//!
//! A callback may hand back its result in several shapes. Instead of probing
//! the value at runtime, the shape is an explicit tagged union, [`TaskValue`]:
//!
//! ```text
//! TaskValue::Empty                 absent result
//! TaskValue::Plain(TaskOutput)     terminal value
//! TaskValue::Callable(FnOnce)      zero-arg function producing another TaskValue
//! TaskValue::Deferred(Future)      async computation producing another TaskValue
//! TaskValue::Stream(Stream)        push-stream; only the first item is used
//! ```
//!
//! Shapes nest freely: a callable may return a deferred value that resolves to
//! a stream whose first item is plain. [`resolve`](crate::resolve) unwraps the
//! whole chain into a terminal [`TaskOutput`].

use std::any::{Any, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream};

use crate::error::ExecutionError;

/// Boxed deferred computation.
pub type BoxValueFuture = BoxFuture<'static, Result<TaskValue, ExecutionError>>;

/// Boxed push-stream of values.
pub type BoxValueStream = BoxStream<'static, Result<TaskValue, ExecutionError>>;

/// Type-erased terminal value published on a task's channel.
///
/// Cheap to clone (`Arc` inside). Read it back with [`TaskOutput::downcast_ref`].
///
/// ## Example
/// ```rust
/// use cronvisor::TaskOutput;
///
/// let out = TaskOutput::new(42_u32);
/// assert_eq!(out.downcast_ref::<u32>(), Some(&42));
/// assert!(out.downcast_ref::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct TaskOutput {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl TaskOutput {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Borrows the value as `T` if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// True if the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the wrapped type (diagnostics only).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskOutput<{}>", self.type_name)
    }
}

/// Shape tag of a [`TaskValue`], used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Empty,
    Plain,
    Callable,
    Deferred,
    Stream,
}

/// Value returned by a task callback.
pub enum TaskValue {
    /// No result; the tick publishes an absent response.
    Empty,
    /// Terminal value.
    Plain(TaskOutput),
    /// Zero-argument function; invoked once during resolution.
    Callable(Box<dyn FnOnce() -> TaskValue + Send>),
    /// Deferred computation; awaited during resolution.
    Deferred(BoxValueFuture),
    /// Push-stream; the first item is taken and the stream dropped.
    Stream(BoxValueStream),
}

impl TaskValue {
    /// No result.
    pub fn empty() -> Self {
        TaskValue::Empty
    }

    /// Terminal value.
    pub fn plain<T: Any + Send + Sync>(value: T) -> Self {
        TaskValue::Plain(TaskOutput::new(value))
    }

    /// Zero-argument function producing the next value.
    pub fn callable<F>(f: F) -> Self
    where
        F: FnOnce() -> TaskValue + Send + 'static,
    {
        TaskValue::Callable(Box::new(f))
    }

    /// Deferred computation producing the next value.
    pub fn deferred<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<TaskValue, ExecutionError>> + Send + 'static,
    {
        TaskValue::Deferred(Box::pin(fut))
    }

    /// Push-stream whose first item is the next value.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<TaskValue, ExecutionError>> + Send + 'static,
    {
        TaskValue::Stream(Box::pin(stream))
    }

    /// Returns the shape tag.
    pub fn kind(&self) -> ResultKind {
        match self {
            TaskValue::Empty => ResultKind::Empty,
            TaskValue::Plain(_) => ResultKind::Plain,
            TaskValue::Callable(_) => ResultKind::Callable,
            TaskValue::Deferred(_) => ResultKind::Deferred,
            TaskValue::Stream(_) => ResultKind::Stream,
        }
    }

    /// True for [`TaskValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, TaskValue::Empty)
    }
}

impl From<TaskOutput> for TaskValue {
    fn from(out: TaskOutput) -> Self {
        TaskValue::Plain(out)
    }
}

impl From<Option<TaskOutput>> for TaskValue {
    fn from(out: Option<TaskOutput>) -> Self {
        out.map_or(TaskValue::Empty, TaskValue::Plain)
    }
}

impl fmt::Debug for TaskValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskValue::Plain(out) => f.debug_tuple("Plain").field(out).finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}
