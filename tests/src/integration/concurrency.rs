//! # Concurrency Tests
//!
//! Events resolve independently: redirects overlap, a pending window never
//! blocks inline replies, and one failing event leaves the rest untouched.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use serde_json::{json, Value};
    use tokio::sync::{Barrier, Notify};
    use tokio::time::timeout;
    use url::Url;

    use credential_handler::adapters::window_app_fn;
    use credential_handler::{
        hook_fn, receive_credential_event, ActivationOptions, CredentialEvent,
        CredentialHandlerApi, CredentialReply, HandlerError, HandlerResult, HookError, RpcServer,
    };

    use crate::integration::{TestPlatform, MEDIATOR};

    /// Redirect every event to a window named after its hint key.
    fn redirect_by_hint() -> Arc<dyn credential_handler::CredentialHook> {
        hook_fn(|event: CredentialEvent| async move {
            let hint = event
                .hint_key
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or("none")
                .to_string();
            let url = Url::parse(&format!("https://wallet.example/{hint}"))
                .map_err(|e| HookError::new(e.to_string()))?;
            Ok(Value::from(HandlerResult::redirect(url)))
        })
    }

    /// Window echoing the event's hint key once `barrier` releases.
    fn mount_echo_after(platform: &TestPlatform, barrier: Arc<Barrier>) {
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(move |server: Arc<dyn RpcServer>, _url: Url| {
                let barrier = barrier.clone();
                async move {
                    if let Ok(proxied) = receive_credential_event(server).await {
                        barrier.wait().await;
                        let hint = proxied.event.hint_key.clone().unwrap_or(Value::Null);
                        proxied
                            .respond_with(async move { Ok(CredentialReply::new("Echo", hint)) })
                            .await;
                    }
                }
            }),
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_two_redirects_in_flight_at_once() {
        let platform = TestPlatform::new();
        // Neither window replies until both have received their event.
        mount_echo_after(&platform, Arc::new(Barrier::new(2)));
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_by_hint()))
            .await
            .unwrap();

        let first = platform
            .events
            .request(CredentialEvent::request(json!({})).with_hint_key("alice"));
        let second = platform
            .events
            .request(CredentialEvent::request(json!({})).with_hint_key("bob"));

        let (first, second) = timeout(Duration::from_secs(5), async { tokio::join!(first, second) })
            .await
            .unwrap();

        assert_eq!(first.unwrap(), CredentialReply::new("Echo", json!("alice")));
        assert_eq!(second.unwrap(), CredentialReply::new("Echo", json!("bob")));
        assert_eq!(platform.browser.opened_urls().len(), 2);
    }

    #[tokio::test]
    async fn test_pending_window_does_not_block_inline_store() {
        let platform = TestPlatform::new();
        let release = Arc::new(Notify::new());
        let window_release = release.clone();
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(move |server: Arc<dyn RpcServer>, _url: Url| {
                let release = window_release.clone();
                async move {
                    if let Ok(proxied) = receive_credential_event(server).await {
                        release.notified().await;
                        proxied
                            .respond_with(async { Ok(CredentialReply::new("Late", Value::Null)) })
                            .await;
                    }
                }
            }),
        );

        let store = hook_fn(|_event: CredentialEvent| async {
            Ok(Value::from(HandlerResult::response("Stored", json!(true))))
        });
        let _active = platform
            .service
            .activate_handler(
                ActivationOptions::new(MEDIATOR)
                    .with_get(redirect_by_hint())
                    .with_store(store),
            )
            .await
            .unwrap();

        let pending = platform
            .events
            .dispatch(CredentialEvent::request(json!({})).with_hint_key("slow"))
            .await
            .unwrap();

        let stored = timeout(
            Duration::from_secs(5),
            platform.events.request(CredentialEvent::store(json!({}))),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(stored, CredentialReply::new("Stored", json!(true)));

        release.notify_one();
        let late = timeout(Duration::from_secs(5), pending)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(late, CredentialReply::new("Late", Value::Null));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_handler() {
        let platform = TestPlatform::new();
        let hook = hook_fn(|event: CredentialEvent| async move {
            let n = event
                .credential
                .as_ref()
                .and_then(|c| c.get("n"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            match n % 3 {
                0 => Err(HookError::new(format!("rejected {n}"))),
                1 => Ok(json!([n])),
                _ => Ok(Value::from(HandlerResult::response("Stored", json!(n)))),
            }
        });
        let active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_store(hook))
            .await
            .unwrap();

        let replies = join_all(
            (0..9u64).map(|n| platform.events.request(CredentialEvent::store(json!({"n": n})))),
        )
        .await;

        for (n, reply) in replies.into_iter().enumerate() {
            let n = n as u64;
            match n % 3 {
                0 => assert_eq!(reply, Err(HandlerError::Hook(HookError::new(format!("rejected {n}"))))),
                1 => assert!(matches!(reply, Err(HandlerError::Shape(_)))),
                _ => assert_eq!(reply, Ok(CredentialReply::new("Stored", json!(n)))),
            }
        }

        assert!(active.is_running());
        let snapshot = platform.metrics.snapshot();
        assert_eq!(snapshot.stores_received, 9);
        assert_eq!(snapshot.failures, 6);
        assert_eq!(snapshot.inline_replies, 3);
    }

    #[tokio::test]
    async fn test_shutdown_lets_in_flight_redirect_finish() {
        let platform = TestPlatform::new();
        let release = Arc::new(Notify::new());
        let window_release = release.clone();
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(move |server: Arc<dyn RpcServer>, _url: Url| {
                let release = window_release.clone();
                async move {
                    if let Ok(proxied) = receive_credential_event(server).await {
                        release.notified().await;
                        proxied
                            .respond_with(async { Ok(CredentialReply::new("Done", Value::Null)) })
                            .await;
                    }
                }
            }),
        );
        let active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_by_hint()))
            .await
            .unwrap();

        let pending = platform
            .events
            .dispatch(CredentialEvent::request(json!({})).with_hint_key("inflight"))
            .await
            .unwrap();

        // Wait until the window holds the event.
        timeout(Duration::from_secs(5), async {
            while platform.browser.opened_urls().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        active.shutdown().await;
        release.notify_one();

        let reply = timeout(Duration::from_secs(5), pending)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply, Ok(CredentialReply::new("Done", Value::Null)));
    }
}
