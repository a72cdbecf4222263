//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the outbound ports: permission gate,
//! registry, event delivery and a loopback window system.

pub mod loopback;
pub mod platform;

pub use loopback::{window_app_fn, LoopbackBrowser, LoopbackInjector, LoopbackServer, WindowApp};
pub use platform::{ChannelEventSource, InMemoryHandlerRegistry, StaticPermissionGate};
