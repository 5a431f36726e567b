//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`] the settings consumed by
//! [`SchedulerBuilder`](crate::SchedulerBuilder).
//!
//! ## Sentinel values
//! - `max_resolve_depth = 0` → unbounded result resolution
//! - `bus_capacity = 0` → clamped to 1
//! - `grace = 0s` → `run_until_shutdown` returns right after stopping tasks

use std::time::Duration;

/// Runtime configuration of a [`Scheduler`](crate::Scheduler).
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `max_resolve_depth`: Wrapper layers a tick may unwrap (`0` = unbounded)
/// - `grace`: How long shutdown waits for in-flight ticks
///
/// ## Notes
/// All fields are public. Prefer the accessors over checking sentinels inline.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Capacity of the lifecycle event broadcast channel.
    ///
    /// Subscribers lagging by more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,

    /// Maximum nesting of callable/deferred/stream layers unwrapped per tick.
    ///
    /// - `0` = unbounded (a self-returning callable never terminates)
    /// - `n > 0` = deeper results fail with `ExecutionError::DepthExceeded`
    pub max_resolve_depth: usize,

    /// Time granted to in-flight ticks once shutdown stopped every task.
    pub grace: Duration,
}

impl SchedulerConfig {
    /// Returns the resolver depth limit as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` layers
    #[inline]
    pub fn resolve_depth_limit(&self) -> Option<usize> {
        match self.max_resolve_depth {
            0 => None,
            n => Some(n),
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `max_resolve_depth = 0` (unbounded)
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            max_resolve_depth: 0,
            grace: Duration::from_secs(5),
        }
    }
}
