//! Shared wire definitions for the `todos` task store API.

pub mod codec;
pub mod task;

pub use codec::DecodeError;
pub use task::{Task, TaskFields, TaskId, UserId};
