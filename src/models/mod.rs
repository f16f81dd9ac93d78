// Data model for the payment-gated pipeline.
//
// Records are created once, mutated only by the verification pipeline and
// the worker dispatcher, and never deleted; they persist for audit and
// idempotent replay.

pub mod reading;
pub mod task;

pub use reading::{
    Fortune, Reading, Receipt, RecentEntry, Style, Totals, RECEIPT_KIND_ORACLE_RECEIVE,
};
pub use task::{MintQuote, Payment, QuoteBinding, Task, VerificationMode};
