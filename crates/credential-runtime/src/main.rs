//! # Credential Runtime
//!
//! Runs a credential handler against in-process platform adapters.
//!
//! ## Flow
//!
//! ```text
//! install ──→ activate ──→ request event ──→ get hook ──→ redirect
//!                                                           │
//!                                               wallet window (loopback)
//!                                                           │
//!                              store event ──→ store hook ──→ inline reply
//! ```

use anyhow::Result;
use credential_runtime::{CredentialRuntime, RuntimeConfig};
use credential_telemetry::{component_span, init_telemetry, TelemetryConfig};
use tracing::{debug, info, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_component("runtime")).await?;

    let config = RuntimeConfig::from_env()?;
    let span = component_span!("credential_runtime", mediator_origin = %config.mediator_origin);

    async move {
        info!("===========================================");
        info!("  Credential Handler Runtime v{}", credential_handler::VERSION);
        info!("===========================================");

        let mut runtime = CredentialRuntime::new(config);
        runtime.start().await?;

        let replies = runtime.run_demo().await?;
        info!(replies = replies.len(), "Demo completed");

        let scrape = runtime.metrics_scrape()?;
        debug!(bytes = scrape.len(), "Metrics at shutdown:\n{scrape}");

        runtime.shutdown().await;
        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}
