use thiserror::Error;

/// Errors from intent resolution.
///
/// Resolution is deliberately hard to fail: backend problems fall through to
/// the pattern tier, so only unusable input surfaces as an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("query is empty")]
    EmptyQuery,
}
