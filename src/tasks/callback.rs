//! # Task callbacks.
//!
//! This module defines the [`Callback`] trait and a closure-backed implementation [`CallbackFn`].
//! The shared handle type is [`CallbackRef`], an `Arc<dyn Callback>` that every tick clones.
//!
//! A callback receives the task's optional owner object ([`ContextRef`]) explicitly instead of
//! relying on an implicit receiver, and returns a [`TaskValue`] in any of its shapes.
//!
//! ## Concurrency semantics
//! - Every tick calls [`Callback::invoke`] and gets a **fresh** future.
//! - Ticks of the same task may overlap; shared state must live behind `Arc<...>`
//!   (typically in the context object or captured by the closure).
//!
//! ## Example
//! ```rust
//! use cronvisor::{CallbackFn, CallbackRef, ContextRef, ExecutionError, TaskValue};
//!
//! let cb: CallbackRef = CallbackFn::arc(|_ctx: Option<ContextRef>| async move {
//!     Ok::<_, ExecutionError>(TaskValue::plain("done"))
//! });
//! # let _ = cb;
//! ```

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::ExecutionError;
use crate::tasks::value::TaskValue;

/// Owner object bound to a callback invocation.
pub type ContextRef = Arc<dyn Any + Send + Sync>;

/// Future returned by one callback invocation.
pub type BoxCallbackFuture = BoxFuture<'static, Result<TaskValue, ExecutionError>>;

/// Shared handle to a callback.
pub type CallbackRef = Arc<dyn Callback>;

/// # Zero-argument unit of work invoked on every trigger.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use cronvisor::{BoxCallbackFuture, Callback, ContextRef, TaskValue};
///
/// struct Counter(Arc<AtomicU64>);
///
/// impl Callback for Counter {
///     fn invoke(&self, _ctx: Option<ContextRef>) -> BoxCallbackFuture {
///         let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
///         Box::pin(async move { Ok(TaskValue::plain(n)) })
///     }
/// }
/// ```
pub trait Callback: Send + Sync + 'static {
    /// Starts one invocation, bound to `ctx` if the task has an owner object.
    fn invoke(&self, ctx: Option<ContextRef>) -> BoxCallbackFuture;
}

/// Closure-backed callback.
///
/// Wraps a closure that *creates* a new future per invocation.
pub struct CallbackFn<F> {
    f: F,
}

impl<F> CallbackFn<F> {
    /// Creates a new closure-backed callback.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the callback and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut> Callback for CallbackFn<F>
where
    F: Fn(Option<ContextRef>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<TaskValue, ExecutionError>> + Send + 'static,
{
    fn invoke(&self, ctx: Option<ContextRef>) -> BoxCallbackFuture {
        Box::pin((self.f)(ctx))
    }
}
