use thiserror::Error;

/// Errors surfaced to the caller of the chat engine.
///
/// Backend and provider failures never appear here: the engine degrades to
/// friendlier text instead, so only unusable input is an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("message exceeds {0} characters")]
    MessageTooLong(usize),
}
