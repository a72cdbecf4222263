//! # Credential Handler Test Suite
//!
//! Cross-component tests for the credential handler.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # install, activate, inline and redirect replies
//!     └── concurrency.rs  # overlapping redirects, failure isolation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p credential-tests
//! cargo test -p credential-tests integration::concurrency::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
