//! Demo wallet: the hooks the runtime activates with and the window
//! application mounted at the wallet window URL.

use std::sync::Arc;

use credential_handler::adapters::{window_app_fn, WindowApp};
use credential_handler::{
    hook_fn, receive_credential_event_with, CredentialEvent, CredentialHook, CredentialReply,
    HandlerConfig, HandlerResult, RpcServer,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

/// `get` hook that sends every request to the wallet window.
pub fn redirecting_get(window_url: Url) -> Arc<dyn CredentialHook> {
    hook_fn(move |_event: CredentialEvent| {
        let result = HandlerResult::redirect(window_url.clone());
        async move { Ok(Value::from(result)) }
    })
}

/// `store` hook that accepts every credential inline.
pub fn inline_store() -> Arc<dyn CredentialHook> {
    hook_fn(|event: CredentialEvent| async move {
        let credential = event.credential.unwrap_or(Value::Null);
        let id = credential.get("id").cloned().unwrap_or(Value::Null);
        Ok(Value::from(HandlerResult::response(
            "StoredCredential",
            json!({"stored": true, "id": id}),
        )))
    })
}

/// Presentation the wallet window answers a request with.
pub fn present(event: &CredentialEvent) -> CredentialReply {
    CredentialReply::new(
        "VerifiablePresentation",
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": "VerifiablePresentation",
            "holder": "did:example:wallet",
            "query": event.credential_request_options.clone().unwrap_or(Value::Null),
        }),
    )
}

/// Window application answering the forwarded event with `present`.
///
/// Exposes its endpoint under `config.proxy_service_name`.
pub fn wallet_window(config: HandlerConfig) -> Arc<dyn WindowApp> {
    window_app_fn(move |server: Arc<dyn RpcServer>, url: Url| {
        let config = config.clone();
        async move {
            match receive_credential_event_with(server, &config).await {
                Ok(proxied) => {
                    info!(url = %url, event_type = %proxied.event.event_type, "[ch] Wallet window received event");
                    let reply = present(&proxied.event);
                    proxied.respond_with(async move { Ok(reply) }).await;
                }
                Err(e) => warn!(url = %url, error = %e, "[ch] Wallet window closed without an event"),
            }
        }
    })
}
