//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `payment` - Payment aggregate, lifecycle rules and statistics windows

pub mod foundation;
pub mod payment;
