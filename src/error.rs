use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The snapshot source is unavailable because the platform withheld
    /// authorization. Propagated verbatim to the caller, never retried.
    #[error("location permission denied")]
    PermissionDenied,

    /// No receiver (internal chipset or external device) can currently
    /// deliver snapshots, while the operation requires one.
    #[error("no active gnss receiver")]
    ReceiverUnavailable,

    /// Query invoked before any snapshot has been merged. Not fatal:
    /// the session layer resolves this with a bounded wait and retry
    /// before reporting an explicit no-data result.
    #[error("no satellite data received yet")]
    NoDataYet,

    /// The detection session was stopped. Merges against a table the
    /// caller considers closed are rejected.
    #[error("detection session is closed")]
    SessionClosed,

    /// Unexpected fault while merging or computing statistics. The query
    /// fails as a whole rather than returning a partial result.
    #[error("internal aggregation failure: {0}")]
    InternalAggregation(String),
}
