//! duplex-task: poll-until-terminal completion for control-plane actions.
//!
//! Every mutating control-plane call returns an accepted-but-pending
//! action; [`wait_for_task`] drives it to a terminal state, aggregating
//! per-subtask failure messages on the way down.

pub mod monitor;

pub use monitor::{DEFAULT_POLL_INTERVAL, PollOptions, TaskError, wait_for_task};
