//! Response Resolution
//!
//! Turns one credential event into the reply committed to the platform:
//! 1. invoke the bound hook
//! 2. validate the hook result (object first, then `type`)
//! 3. answer inline for `response`, hand off to the router for `redirect`

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    CredentialEvent, CredentialReply, HandlerError, HandlerResult,
};
use crate::metrics::MetricsRecorder;
use crate::ports::hook::CredentialHook;
use crate::ports::outbound::WindowOpener;
use crate::service::redirect::RedirectRouter;

/// Resolves events into replies. Stateless between events.
pub struct ResponseResolver {
    router: RedirectRouter,
    metrics: Arc<dyn MetricsRecorder>,
}

impl ResponseResolver {
    /// Create a resolver that redirects through `router`.
    pub fn new(router: RedirectRouter, metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { router, metrics }
    }

    /// Produce the reply for `event` using `hook`.
    pub async fn resolve(
        &self,
        hook: &dyn CredentialHook,
        event: CredentialEvent,
        windows: &dyn WindowOpener,
    ) -> Result<CredentialReply, HandlerError> {
        let event_type = event.event_type;
        self.metrics.record_event(event_type);

        let outcome = self.resolve_event(hook, event, windows).await;
        if let Err(e) = &outcome {
            warn!(
                event_type = %event_type,
                kind = e.kind(),
                error = %e,
                "[ch] Credential event failed"
            );
            self.metrics.record_failure(e.kind());
        }
        outcome
    }

    async fn resolve_event(
        &self,
        hook: &dyn CredentialHook,
        event: CredentialEvent,
        windows: &dyn WindowOpener,
    ) -> Result<CredentialReply, HandlerError> {
        let value = hook.call(event.clone()).await?;

        match HandlerResult::from_value(value)? {
            HandlerResult::Response { data_type, data } => {
                debug!(event_type = %event.event_type, data_type = ?data_type, "[ch] Inline response");
                self.metrics.record_inline_reply();
                Ok(CredentialReply::from_parts(data_type, data))
            }
            HandlerResult::Redirect { url } => {
                debug!(event_type = %event.event_type, url = %url, "[ch] Redirecting to window");
                Ok(self.router.redirect(&url, &event, windows).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerConfig;
    use crate::domain::{HookError, RedirectError, ShapeError};
    use crate::metrics::Metrics;
    use crate::ports::hook::hook_fn;
    use crate::ports::outbound::{
        WindowConnector, WindowOpenFuture, WindowOpening, WindowReadyFuture,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    /// Opener that counts open attempts and always fails.
    #[derive(Default)]
    struct CountingOpener {
        opened: AtomicUsize,
    }

    impl WindowOpener for CountingOpener {
        fn open_window(&self, _url: &Url) -> WindowOpenFuture {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(RedirectError::WindowOpen("no windows in tests".to_string())) })
        }
    }

    struct NeverConnector;

    impl WindowConnector for NeverConnector {
        fn create_window(&self, _url: &Url, _opening: WindowOpening) -> WindowReadyFuture {
            Box::pin(async { Err(RedirectError::ChannelNotReady("unused".to_string())) })
        }
    }

    fn resolver(metrics: Arc<Metrics>) -> ResponseResolver {
        let router = RedirectRouter::new(
            Arc::new(NeverConnector),
            &HandlerConfig::default(),
            metrics.clone(),
        );
        ResponseResolver::new(router, metrics)
    }

    fn returning(value: Value) -> Arc<dyn CredentialHook> {
        hook_fn(move |_event: CredentialEvent| {
            let value = value.clone();
            async move { Ok(value) }
        })
    }

    #[tokio::test]
    async fn test_inline_verifiable_presentation() {
        let metrics = Arc::new(Metrics::new());
        let opener = CountingOpener::default();
        let hook = returning(json!({
            "type": "response",
            "dataType": "VerifiablePresentation",
            "data": {"ok": true}
        }));

        let reply = resolver(metrics.clone())
            .resolve(hook.as_ref(), CredentialEvent::request(json!({})), &opener)
            .await
            .unwrap();

        assert_eq!(
            reply,
            CredentialReply::new("VerifiablePresentation", json!({"ok": true}))
        );
        assert_eq!(opener.opened.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.snapshot().inline_replies, 1);
    }

    #[tokio::test]
    async fn test_inline_reply_copies_fields_as_given() {
        let reply = resolver(Arc::new(Metrics::new()))
            .resolve(
                returning(json!({"type": "response", "dataType": ["vp", 2]})).as_ref(),
                CredentialEvent::request(json!({})),
                &CountingOpener::default(),
            )
            .await
            .unwrap();

        assert_eq!(reply.into_value(), json!({"dataType": ["vp", 2]}));
    }

    #[tokio::test]
    async fn test_non_object_never_opens_window() {
        let opener = CountingOpener::default();
        for value in [Value::Null, json!(7), json!("redirect"), json!([])] {
            let err = resolver(Arc::new(Metrics::new()))
                .resolve(
                    returning(value).as_ref(),
                    CredentialEvent::request(json!({})),
                    &opener,
                )
                .await
                .unwrap_err();
            assert_eq!(err, HandlerError::Shape(ShapeError::NotAnObject));
        }
        assert_eq!(opener.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_type_never_opens_window() {
        let metrics = Arc::new(Metrics::new());
        let opener = CountingOpener::default();

        let err = resolver(metrics.clone())
            .resolve(
                returning(json!({"type": "popup", "url": "https://wallet.example"})).as_ref(),
                CredentialEvent::store(json!({})),
                &opener,
            )
            .await
            .unwrap_err();

        assert_eq!(err, HandlerError::Shape(ShapeError::UnknownType));
        assert_eq!(opener.opened.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.snapshot().failures, 1);
    }

    #[tokio::test]
    async fn test_redirect_enters_router() {
        let opener = CountingOpener::default();

        let err = resolver(Arc::new(Metrics::new()))
            .resolve(
                returning(json!({"type": "redirect", "url": "https://wallet.example/handle"}))
                    .as_ref(),
                CredentialEvent::request(json!({})),
                &opener,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Redirect(RedirectError::WindowOpen(_))
        ));
        assert_eq!(opener.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hook_error_is_scoped_to_event() {
        let hook = hook_fn(|_event: CredentialEvent| async { Err(HookError::new("declined")) });

        let err = resolver(Arc::new(Metrics::new()))
            .resolve(
                hook.as_ref(),
                CredentialEvent::request(json!({})),
                &CountingOpener::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, HandlerError::Hook(HookError::new("declined")));
    }
}
