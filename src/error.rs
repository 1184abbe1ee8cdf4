use crate::domain::{PoolId, Season};
use thiserror::Error;

/// Faults raised while applying events.
///
/// Arithmetic guards and missing history are not errors: those resolve to
/// zero-valued defaults inside the engines. An `EngineError` always indicates
/// a malformed or out-of-order event stream and is fatal for the offending
/// event only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("event references unregistered pool {0}")]
    UnregisteredPool(PoolId),
    #[error("season {incoming} does not advance past last recorded season {last}")]
    NonMonotonicSeason { incoming: Season, last: Season },
    #[error("gauge case id {0} out of range")]
    UnknownCaseId(u8),
    #[error("case table missing entry for case id {0}")]
    IncompleteCaseTable(u8),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
}
