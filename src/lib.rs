//! Dispute enforcement engine for credit-report remediation.
//!
//! The crate validates reported tradelines against a Metro 2-style schema,
//! opens disputes for records carrying violations, sequences each dispute
//! through an ordered escalation workflow, and produces the addressed
//! correspondence each stage requires. Persistence, delivery, scoring, and
//! text enhancement are collaborator traits so the engine runs the same way
//! in tests and behind a real stack.

pub mod config;
pub mod telemetry;
pub mod workflows;
