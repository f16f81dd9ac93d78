//! HTTP handlers, grouped by surface.

pub mod oracle;
pub mod payments;
pub mod system;
pub mod tasks;
