//! # Event subscribers for the cronvisor scheduler.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler / tick ── publish(Event) ──► Bus ──► SubscriberSet::emit
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter  Metrics   Custom
//! ```
//!
//! Subscribers observe lifecycle events. Task *results* are not events; read
//! them with [`Scheduler::subscribe`](crate::Scheduler::subscribe).

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;
