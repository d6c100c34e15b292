#![deny(unsafe_code)]

//! Shared test utilities for the smsport workspace.
//!
//! Provides document fixtures, config builders, and tracing helpers so that
//! individual crate tests stay concise and consistent. Fixtures produce XML
//! text rather than core types, so any crate can use them without a
//! dependency cycle.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! smsport-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod fixtures;
pub mod tracing_setup;
