pub mod action;
pub mod error;

pub use action::{ActionKind, TaskAction};
pub use error::AdjutantError;
