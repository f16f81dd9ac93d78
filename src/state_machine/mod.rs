// State machine module for the payment-gated task lifecycle.
//
// Task statuses move forward-only through a fixed order; readings are a
// binary pending/paid pair because their settlement is synchronous.

pub mod errors;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use states::{PaymentStatus, ReadingStatus, TaskStatus};
