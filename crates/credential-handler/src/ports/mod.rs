//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, application hooks, outbound
//! platform dependencies).

pub mod hook;
pub mod inbound;
pub mod outbound;

pub use hook::*;
pub use inbound::*;
pub use outbound::*;
