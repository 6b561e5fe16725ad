//! Billing HTTP adapter - checkout, gateway callback and status endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{BillingApiError, BillingAppState};
pub use routes::billing_routes;
