// Application layer - orchestration between the ledger and the roster.
// Every client (the interactive CLI, tests) goes through EnrollmentService.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
