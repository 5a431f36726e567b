//! Single-or-many inputs of the lifecycle API.
//!
//! Every name-addressed operation accepts one name or a collection of names,
//! and `add` accepts one task or several:
//!
//! ```rust,no_run
//! # async fn demo(sched: &cronvisor::Scheduler) -> Result<(), cronvisor::SchedulerError> {
//! sched.stop("nightly").await?;
//! sched.stop(["nightly", "hourly"]).await?;
//! sched.stop(vec![String::from("nightly")]).await?;
//! # Ok(())
//! # }
//! ```

use crate::tasks::ScheduleTask;

/// One or more task names.
pub trait IntoNames {
    /// Converts into an ordered list of names.
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoNames for &String {
    fn into_names(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoNames for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}

impl IntoNames for Vec<&str> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoNames for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoNames for &[String] {
    fn into_names(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoNames for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

/// One or more task descriptors.
pub trait IntoTasks {
    /// Converts into an ordered list of descriptors.
    fn into_tasks(self) -> Vec<ScheduleTask>;
}

impl IntoTasks for ScheduleTask {
    fn into_tasks(self) -> Vec<ScheduleTask> {
        vec![self]
    }
}

impl IntoTasks for Vec<ScheduleTask> {
    fn into_tasks(self) -> Vec<ScheduleTask> {
        self
    }
}

impl<const N: usize> IntoTasks for [ScheduleTask; N] {
    fn into_tasks(self) -> Vec<ScheduleTask> {
        self.into()
    }
}
