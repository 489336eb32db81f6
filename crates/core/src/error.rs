use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdjutantError {
    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),

    #[error("{0}")]
    Other(String),
}
