//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `billing` - Plans, gateway signing, payment records and subscriptions

pub mod billing;
pub mod foundation;
