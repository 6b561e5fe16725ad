//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Access token validation
//! - `http` - REST endpoints and the gateway callback
//! - `memory` - In-process repositories for tests and local runs
//! - `postgres` - Persistent repositories

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
