//! Background tasks module
//!
//! Timer-driven work that runs alongside the HTTP server. Every task here is
//! owned by a `JoinHandle` that is aborted when its phase ends.

pub mod completion;
pub mod countdown;
pub mod frame_loop;
pub mod stats_poller;

// Re-export main functions
pub use completion::completion_task;
pub use countdown::countdown_task;
pub use frame_loop::frame_loop_task;
pub use stats_poller::{StatsReport, StatsSubscription};
