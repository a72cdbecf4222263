//! # Domain Module
//!
//! Core domain types for credential handling: events, hook results,
//! registrations and the error taxonomy.

pub mod errors;
pub mod event;
pub mod result;
pub mod value_objects;

pub use errors::*;
pub use event::*;
pub use result::*;
pub use value_objects::*;
