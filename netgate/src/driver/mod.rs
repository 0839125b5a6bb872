//! Driver layer: command exchanges, privilege navigation and failure
//! detection on top of a [`Shell`](crate::channel::Shell).

pub mod failure;
mod generic;
mod interactive;
mod privilege;
mod response;

pub use failure::{find_failure, is_failure};
pub use generic::GenericDriver;
pub use interactive::{HIDDEN_INPUT, InteractiveBuilder, InteractiveStep, PendingStep};
pub use privilege::{PrivilegeManager, Transition};
pub use response::CommandResult;
