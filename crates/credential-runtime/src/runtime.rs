//! # Credential Runtime
//!
//! Owns the service, the in-process platform and the loopback browser.
//!
//! ## Startup Sequence
//!
//! 1. Mount the wallet window on the loopback browser
//! 2. Install the handler URL (permission, then registry)
//! 3. Activate with a redirecting `get` and an inline `store`

use std::sync::Arc;

use anyhow::{Context, Result};
use credential_handler::adapters::{
    ChannelEventSource, InMemoryHandlerRegistry, LoopbackBrowser, StaticPermissionGate,
};
use credential_handler::{
    ActivationOptions, ActiveHandler, CredentialEvent, CredentialHandlerApi,
    CredentialHandlerService, CredentialReply, ServiceDependencies, WindowOpener,
};
use credential_telemetry::{encode_metrics, log_credential_event, log_event, log_window_event};
use serde_json::json;

use crate::config::RuntimeConfig;
use crate::metrics::PrometheusMetrics;
use crate::wallet;

/// Credential handler runtime.
pub struct CredentialRuntime {
    config: RuntimeConfig,
    service: CredentialHandlerService,
    events: Arc<ChannelEventSource>,
    browser: Arc<LoopbackBrowser>,
    active: Option<ActiveHandler>,
}

impl CredentialRuntime {
    /// Wire the service to in-process adapters.
    pub fn new(config: RuntimeConfig) -> Self {
        let browser = Arc::new(LoopbackBrowser::new());
        browser.mount(
            config.wallet_window_url.as_str(),
            wallet::wallet_window(config.handler.clone()),
        );

        let events = Arc::new(ChannelEventSource::new(
            browser.clone() as Arc<dyn WindowOpener>,
            config.handler.event_channel_capacity,
        ));

        let deps = ServiceDependencies::new(
            Arc::new(StaticPermissionGate::granted()),
            Arc::new(InMemoryHandlerRegistry::new()),
            events.clone(),
            browser.clone(),
        )
        .with_metrics(Arc::new(PrometheusMetrics));

        let service = CredentialHandlerService::new(deps, &config.handler);

        Self {
            config,
            service,
            events,
            browser,
            active: None,
        }
    }

    /// Install and activate the handler.
    pub async fn start(&mut self) -> Result<()> {
        let registration = self
            .service
            .install_handler(&self.config.handler_url)
            .await
            .context("failed to install credential handler")?;
        log_event!(info, "runtime", "Handler installed", registration = %registration.id());

        let options = ActivationOptions::new(self.config.mediator_origin.clone())
            .with_get(wallet::redirecting_get(self.config.wallet_window_url.clone()))
            .with_store(wallet::inline_store());

        let active = self
            .service
            .activate_handler(options)
            .await
            .context("failed to activate credential handler")?;
        log_event!(info, "runtime", "Handler active", mediator_origin = %active.mediator_origin());

        self.active = Some(active);
        Ok(())
    }

    /// Platform side of the event channel.
    pub fn events(&self) -> &ChannelEventSource {
        &self.events
    }

    /// Deliver one request and one store event and return both replies.
    pub async fn run_demo(&self) -> Result<Vec<CredentialReply>> {
        let events = [
            CredentialEvent::request(json!({
                "web": {"VerifiablePresentation": {"query": {"type": "QueryByExample"}}}
            })),
            CredentialEvent::store(json!({"id": "urn:uuid:0b5e5c3a", "type": "VerifiablePresentation"}))
                .with_hint_key("default"),
        ];

        let mut replies = Vec::with_capacity(events.len());
        for event in events {
            let event_type = event.event_type;
            let reply = self
                .events
                .request(event)
                .await
                .with_context(|| format!("{event_type} event failed"))?;
            log_credential_event!(info, "runtime", "Credential reply", event_type, data_type = ?reply.data_type());
            replies.push(reply);
        }

        for url in self.browser.opened_urls() {
            log_window_event!(debug, "runtime", "Window was opened", url);
        }

        Ok(replies)
    }

    /// Prometheus text exposition of the handler metrics.
    pub fn metrics_scrape(&self) -> Result<String> {
        encode_metrics().context("failed to encode metrics")
    }

    /// Stop the dispatch loop and close the event source.
    pub async fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.shutdown().await;
        }
        self.events.close();
        log_event!(info, "runtime", "Runtime stopped");
    }
}
