//! # Remote-Call Abstraction
//!
//! Proxies over an `Injector` with per-function deadlines.

pub mod proxy;

pub use proxy::{CallTimeout, RemoteFunction, RemoteProxy};
