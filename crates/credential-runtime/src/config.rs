//! # Runtime Configuration
//!
//! Handler settings plus the URLs the demo wiring installs and redirects to.

use std::env;

use anyhow::{Context, Result};
use credential_handler::HandlerConfig;
use url::Url;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Core handler configuration.
    pub handler: HandlerConfig,
    /// URL registered as the credential handler.
    pub handler_url: Url,
    /// Origin allowed to deliver credential events.
    pub mediator_origin: String,
    /// Wallet window that `get` requests are redirected to.
    pub wallet_window_url: Url,
}

impl RuntimeConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CH_HANDLER_URL` (default: https://wallet.example/credential-handler)
    /// - `CH_MEDIATOR_ORIGIN` (default: https://mediator.example)
    /// - `CH_WALLET_WINDOW_URL` (default: https://wallet.example/wallet-window)
    ///
    /// plus everything `HandlerConfig::from_env` reads.
    pub fn from_env() -> Result<Self> {
        let handler = HandlerConfig::from_env();
        handler.validate().context("invalid handler configuration")?;

        let handler_url = env::var("CH_HANDLER_URL")
            .unwrap_or_else(|_| "https://wallet.example/credential-handler".to_string());
        let wallet_window_url = env::var("CH_WALLET_WINDOW_URL")
            .unwrap_or_else(|_| "https://wallet.example/wallet-window".to_string());

        Ok(Self {
            handler,
            handler_url: Url::parse(&handler_url)
                .with_context(|| format!("CH_HANDLER_URL is not a URL: {handler_url}"))?,
            mediator_origin: env::var("CH_MEDIATOR_ORIGIN")
                .unwrap_or_else(|_| "https://mediator.example".to_string()),
            wallet_window_url: Url::parse(&wallet_window_url).with_context(|| {
                format!("CH_WALLET_WINDOW_URL is not a URL: {wallet_window_url}")
            })?,
        })
    }
}
