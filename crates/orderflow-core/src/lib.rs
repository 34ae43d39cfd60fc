//! Core pipeline logic for the orderflow system.
//!
//! This crate holds the two handlers that make up the pipeline, intake and
//! processing, plus the order state machine they drive. Collaborators
//! (store, queue, notification channel) are injected as service objects so
//! tests can substitute in-memory or failing implementations.

pub mod handlers;
pub mod state;

#[cfg(test)]
pub(crate) mod support;

pub use handlers::intake::{IntakeError, IntakeHandler};
pub use handlers::process::{BatchReport, ProcessHandler, RecordOutcome};
pub use state::{OrderStateError, OrderStateMachine};
