//! CSS Prep - checkout and payment callback service.
//!
//! Signs hosted checkout requests for the payment gateway, verifies and
//! settles the gateway's result callbacks, and activates the paying user's
//! subscription.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
