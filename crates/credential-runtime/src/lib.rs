//! # Credential Runtime Library
//!
//! Exposes the runtime wiring for tests. The entry point is the `main.rs`
//! binary.
//!
//! ## Modules
//!
//! - `config` - runtime configuration from the environment
//! - `metrics` - Prometheus-backed metrics recorder
//! - `runtime` - service wiring and demo flow
//! - `wallet` - demo hooks and wallet window application

#![warn(missing_docs)]

pub mod config;
pub mod metrics;
pub mod runtime;
pub mod wallet;

pub use config::RuntimeConfig;
pub use metrics::PrometheusMetrics;
pub use runtime::CredentialRuntime;
