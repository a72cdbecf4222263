//! # Integration Tests
//!
//! Every test wires `CredentialHandlerService` to the in-process adapters:
//! the channel event source plays the platform and the loopback browser
//! hosts the redirect windows.

pub mod concurrency;
pub mod flows;

use std::sync::Arc;

use credential_handler::adapters::{
    ChannelEventSource, InMemoryHandlerRegistry, LoopbackBrowser, StaticPermissionGate,
};
use credential_handler::{
    CredentialHandlerService, HandlerConfig, Metrics, PermissionState, ServiceDependencies,
    WindowOpener,
};

/// Origin every test activates for.
pub const MEDIATOR: &str = "https://mediator.example";

/// Service plus handles on every adapter behind it.
pub struct TestPlatform {
    pub service: CredentialHandlerService,
    pub events: Arc<ChannelEventSource>,
    pub browser: Arc<LoopbackBrowser>,
    pub gate: Arc<StaticPermissionGate>,
    pub registry: Arc<InMemoryHandlerRegistry>,
    pub metrics: Arc<Metrics>,
}

impl TestPlatform {
    /// Platform granting permission, with default configuration.
    pub fn new() -> Self {
        Self::with_config(PermissionState::Granted, &HandlerConfig::default())
    }

    /// Platform answering permission prompts with `permission`.
    pub fn with_config(permission: PermissionState, config: &HandlerConfig) -> Self {
        let browser = Arc::new(LoopbackBrowser::new());
        let events = Arc::new(ChannelEventSource::new(
            browser.clone() as Arc<dyn WindowOpener>,
            config.event_channel_capacity,
        ));
        let gate = Arc::new(StaticPermissionGate::new(permission));
        let registry = Arc::new(InMemoryHandlerRegistry::new());
        let metrics = Arc::new(Metrics::new());

        let deps = ServiceDependencies::new(
            gate.clone(),
            registry.clone(),
            events.clone(),
            browser.clone(),
        )
        .with_metrics(metrics.clone());

        Self {
            service: CredentialHandlerService::new(deps, config),
            events,
            browser,
            gate,
            registry,
            metrics,
        }
    }
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self::new()
    }
}
