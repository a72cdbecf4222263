//! # Application Hooks
//!
//! `get` and `store` callbacks supplied by the application at activation.
//!
//! Hooks return raw JSON rather than a typed `HandlerResult`; the response
//! resolver validates the shape. Use `HandlerResult` and `Value::from` to
//! build well-formed results.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CredentialEvent, HookError};

/// Application callback bound to one credential event type.
///
/// A single hook instance serves every event of its type, possibly
/// concurrently.
#[async_trait]
pub trait CredentialHook: Send + Sync {
    /// Decide how to answer `event`.
    async fn call(&self, event: CredentialEvent) -> Result<Value, HookError>;
}

/// Adapter turning an async closure into a `CredentialHook`.
pub struct FnHook<F>(F);

#[async_trait]
impl<F, Fut> CredentialHook for FnHook<F>
where
    F: Fn(CredentialEvent) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HookError>> + Send,
{
    async fn call(&self, event: CredentialEvent) -> Result<Value, HookError> {
        (self.0)(event).await
    }
}

/// Wrap an async closure as a shareable hook.
pub fn hook_fn<F, Fut>(f: F) -> Arc<dyn CredentialHook>
where
    F: Fn(CredentialEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HookError>> + Send + 'static,
{
    Arc::new(FnHook(f))
}
