//! Conversational personal-loan application service.
//!
//! The `workflows::loan` module carries the whole funnel: a serializable
//! conversation session, field collection, document verification, and the
//! pure eligibility engine that produces the decision and EMI. External
//! collaborators (intent classifier, document parser, application store,
//! sanction-letter consumer) sit behind traits so the workflow can be
//! exercised end to end without any network.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
