//! Scheduler runner -- admission, dispatch, and retirement.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, and snapshot accessors
//! - `admission`: enqueue validation, cancellation, and progress updates
//! - `execution`: scheduling passes, deadline racing, and retirement

mod admission;
mod core;
mod execution;

pub use self::core::Scheduler;
