//! Error types for the scheduling layer.

/// Errors raised when scheduling work.
///
/// A repeating task outliving its session is *not* an error: it simply
/// stops firing. Only malformed requests end up here, and they fail before
/// anything is queued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// A delay or interval was negative.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
