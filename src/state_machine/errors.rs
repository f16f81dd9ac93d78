//! State machine error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateMachineError {
    /// The target status does not follow the current status in the fixed
    /// forward-only order. State is left unchanged.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

pub type StateMachineResult<T> = std::result::Result<T, StateMachineError>;
