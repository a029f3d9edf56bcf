//! Undo/redo for everything the user changes.
//!
//! Every change is a `Command` applied through the `CommandLog` against a
//! `Scene`. Commands capture the state before and after the change, so
//! reverting is exact, and consecutive commands of one interaction merge
//! into a single undo step.

mod command;
mod history;
mod scene;

#[cfg(test)]
mod tests;

pub use command::{Command, PointEdit};
pub use history::{CommandLog, LogConfig, MergeGroup};
pub use scene::{ControlObserver, Scene};
