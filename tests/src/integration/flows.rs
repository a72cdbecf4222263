//! # Integration Test Flows
//!
//! End-to-end flows through `CredentialHandlerService`:
//!
//! 1. **Install**: permission prompt, then registry
//! 2. **Inline reply**: hook answers with `type: "response"`
//! 3. **Redirect**: hook answers with `type: "redirect"`, a loopback window
//!    receives the forwarded event and replies through the event proxy
//! 4. **Rejections**: bad hook results and window failures reach the
//!    platform as that event's error

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use proptest::prelude::*;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use url::Url;

    use credential_handler::adapters::window_app_fn;
    use credential_handler::{
        hook_fn, receive_credential_event, receive_credential_event_with, ActivationOptions,
        CredentialEvent, CredentialEventType, CredentialHandlerApi, CredentialHook,
        CredentialReply, HandlerConfig, HandlerError, HandlerResult, PermissionState,
        RedirectError, RpcError, RpcServer, ShapeError,
    };

    use crate::integration::{TestPlatform, MEDIATOR};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const WALLET_WINDOW: &str = "https://wallet.example/handle";

    fn returning(value: Value) -> Arc<dyn CredentialHook> {
        hook_fn(move |_event: CredentialEvent| {
            let value = value.clone();
            async move { Ok(value) }
        })
    }

    fn redirect_to_wallet() -> Arc<dyn CredentialHook> {
        returning(json!({"type": "redirect", "url": WALLET_WINDOW}))
    }

    /// Mount a wallet window that reports the event it received and replies
    /// with `{dataType: "X", data: {y: 1}}`.
    fn mount_recording_wallet(platform: &TestPlatform) -> mpsc::UnboundedReceiver<CredentialEvent> {
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(move |server: Arc<dyn RpcServer>, _url: Url| {
                let seen_tx = seen_tx.clone();
                async move {
                    if let Ok(proxied) = receive_credential_event(server).await {
                        let _ = seen_tx.send(proxied.event.clone());
                        proxied
                            .respond_with(async { Ok(CredentialReply::new("X", json!({"y": 1}))) })
                            .await;
                    }
                }
            }),
        );
        seen_rx
    }

    // =============================================================================
    // INSTALL / UNINSTALL
    // =============================================================================

    #[tokio::test]
    async fn test_install_prompts_then_registers() {
        let platform = TestPlatform::new();
        let url = Url::parse("https://wallet.example/credential-handler").unwrap();

        let registration = platform.service.install_handler(&url).await.unwrap();

        assert_eq!(registration.url(), &url);
        assert_eq!(platform.gate.prompts(), 1);
        assert!(platform.registry.is_registered(&url));
    }

    #[tokio::test]
    async fn test_install_denied_leaves_registry_untouched() {
        let platform = TestPlatform::with_config(PermissionState::Denied, &HandlerConfig::default());
        let url = Url::parse("https://wallet.example/credential-handler").unwrap();

        let err = platform.service.install_handler(&url).await.unwrap_err();

        assert_eq!(err, HandlerError::PermissionDenied);
        assert_eq!(err.to_string(), "Permission denied.");
        assert_eq!(platform.registry.register_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_swallows_registry_failure() {
        let platform = TestPlatform::new();
        let url = Url::parse("https://wallet.example/credential-handler").unwrap();
        platform.registry.set_unavailable(true);

        assert_eq!(platform.service.get_handler_registration(&url).await, None);
        assert_eq!(
            platform.service.install_handler(&url).await.unwrap_err().to_string(),
            "Credential handler not registered."
        );
    }

    #[tokio::test]
    async fn test_uninstall_after_install() {
        let platform = TestPlatform::new();
        let url = Url::parse("https://wallet.example/credential-handler").unwrap();

        platform.service.install_handler(&url).await.unwrap();
        platform.service.uninstall_handler(&url).await.unwrap();

        assert!(platform.registry.is_empty());
        assert_eq!(platform.gate.prompts(), 2);
    }

    // =============================================================================
    // INLINE REPLIES
    // =============================================================================

    #[tokio::test]
    async fn test_inline_verifiable_presentation() {
        let platform = TestPlatform::new();
        let presentation = json!({
            "type": "VerifiablePresentation",
            "holder": "did:example:holder"
        });
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(returning(json!({
                "type": "response",
                "dataType": "VerifiablePresentation",
                "data": presentation.clone()
            }))))
            .await
            .unwrap();

        let reply = platform
            .events
            .request(CredentialEvent::request(json!({"web": {"VerifiablePresentation": {}}})))
            .await
            .unwrap();

        assert_eq!(reply, CredentialReply::new("VerifiablePresentation", presentation));
        assert!(platform.browser.opened_urls().is_empty());
        assert_eq!(platform.metrics.snapshot().inline_replies, 1);
    }

    #[tokio::test]
    async fn test_unknown_result_type_opens_no_window() {
        let platform = TestPlatform::new();
        mount_recording_wallet(&platform);
        let _active = platform
            .service
            .activate_handler(
                ActivationOptions::new(MEDIATOR)
                    .with_get(returning(json!({"type": "popup", "url": WALLET_WINDOW}))),
            )
            .await
            .unwrap();

        let err = platform
            .events
            .request(CredentialEvent::request(json!({})))
            .await
            .unwrap_err();

        assert_eq!(err, HandlerError::Shape(ShapeError::UnknownType));
        assert!(platform.browser.opened_urls().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_result_is_rejected() {
        let platform = TestPlatform::new();
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_store(returning(json!("ok"))))
            .await
            .unwrap();

        let err = platform
            .events
            .request(CredentialEvent::store(json!({})))
            .await
            .unwrap_err();

        assert_eq!(err, HandlerError::Shape(ShapeError::NotAnObject));
        assert!(err.to_string().contains("must be an object"));
    }

    // =============================================================================
    // REDIRECT
    // =============================================================================

    #[tokio::test]
    async fn test_redirect_round_trip() {
        let platform = TestPlatform::new();
        let mut seen = mount_recording_wallet(&platform);
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_to_wallet()))
            .await
            .unwrap();

        let event = CredentialEvent::request(json!({"web": {"VerifiablePresentation": {}}}))
            .with_hint_key("hint-1");
        let reply = timeout(Duration::from_secs(5), platform.events.request(event.clone()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply, CredentialReply::new("X", json!({"y": 1})));
        assert_eq!(seen.recv().await.unwrap(), event);
        assert_eq!(
            platform.browser.opened_urls(),
            vec![Url::parse(WALLET_WINDOW).unwrap()]
        );
    }

    #[tokio::test]
    async fn test_redirect_keeps_extra_reply_fields() {
        let platform = TestPlatform::new();
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(|server: Arc<dyn RpcServer>, _url: Url| async move {
                if let Ok(proxied) = receive_credential_event(server).await {
                    proxied
                        .respond_with(async {
                            Ok(CredentialReply::from_value(json!({
                                "dataType": "X",
                                "data": {"y": 1},
                                "proof": "z"
                            })))
                        })
                        .await;
                }
            }),
        );
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_to_wallet()))
            .await
            .unwrap();

        let reply = timeout(
            Duration::from_secs(5),
            platform.events.request(CredentialEvent::request(json!({}))),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            reply.into_value(),
            json!({"dataType": "X", "data": {"y": 1}, "proof": "z"})
        );
    }

    #[tokio::test]
    async fn test_redirect_with_configured_service_name() {
        let config = HandlerConfig {
            proxy_service_name: "walletProxy".to_string(),
            ..HandlerConfig::default()
        };
        let platform = TestPlatform::with_config(PermissionState::Granted, &config);
        let window_config = config.clone();
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(move |server: Arc<dyn RpcServer>, _url: Url| {
                let config = window_config.clone();
                async move {
                    if let Ok(proxied) = receive_credential_event_with(server, &config).await {
                        proxied
                            .respond_with(async { Ok(CredentialReply::new("X", json!({"y": 1}))) })
                            .await;
                    }
                }
            }),
        );
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_to_wallet()))
            .await
            .unwrap();

        let reply = timeout(
            Duration::from_secs(5),
            platform.events.request(CredentialEvent::request(json!({}))),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(reply, CredentialReply::new("X", json!({"y": 1})));
    }

    #[tokio::test]
    async fn test_redirect_forwards_null_and_absent_fields_verbatim() {
        let platform = TestPlatform::new();
        let mut seen = mount_recording_wallet(&platform);
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_store(redirect_to_wallet()))
            .await
            .unwrap();

        let event = CredentialEvent {
            event_type: CredentialEventType::Store,
            credential_request_options: None,
            credential: Some(Value::Null),
            hint_key: None,
        };
        platform.events.request(event.clone()).await.unwrap();

        let forwarded = seen.recv().await.unwrap();
        assert_eq!(forwarded, event);
        assert_eq!(
            serde_json::to_value(&forwarded).unwrap(),
            json!({"type": "store", "credential": null})
        );
    }

    #[tokio::test]
    async fn test_window_closed_without_reply_rejects() {
        let platform = TestPlatform::new();
        platform.browser.mount(
            "https://wallet.example/",
            window_app_fn(|server: Arc<dyn RpcServer>, _url: Url| async move {
                // Receive and walk away.
                let _ = receive_credential_event(server).await;
            }),
        );
        let active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_to_wallet()))
            .await
            .unwrap();

        let err = timeout(
            Duration::from_secs(5),
            platform.events.request(CredentialEvent::request(json!({}))),
        )
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Redirect(RedirectError::Rpc(RpcError::ChannelClosed(_)))
        ));
        assert!(active.is_running());
    }

    #[tokio::test]
    async fn test_redirect_to_unmounted_url_fails_to_open() {
        let platform = TestPlatform::new();
        let _active = platform
            .service
            .activate_handler(ActivationOptions::new(MEDIATOR).with_get(redirect_to_wallet()))
            .await
            .unwrap();

        let err = platform
            .events
            .request(CredentialEvent::request(json!({})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Redirect(RedirectError::WindowOpen(_))
        ));
        assert_eq!(platform.metrics.snapshot().redirects_completed, 0);
    }

    // =============================================================================
    // RUNTIME WIRING
    // =============================================================================

    #[tokio::test]
    async fn test_runtime_demo() {
        let mut runtime = credential_runtime::CredentialRuntime::new(
            credential_runtime::RuntimeConfig::from_env().unwrap(),
        );
        runtime.start().await.unwrap();

        let replies = runtime.run_demo().await.unwrap();
        assert_eq!(replies[0].data_type(), Some("VerifiablePresentation"));
        assert_eq!(replies[1].data_type(), Some("StoredCredential"));

        runtime.shutdown().await;
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Whatever a `response` result carries is what the platform gets.
        #[test]
        fn prop_response_passthrough(data_type in "[A-Za-z]{1,16}", n in any::<i64>(), s in ".{0,12}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let data = json!({"n": n, "s": s});

            let reply = rt.block_on(async {
                let platform = TestPlatform::new();
                let hook = returning(Value::from(HandlerResult::response(data_type.clone(), data.clone())));
                let _active = platform
                    .service
                    .activate_handler(ActivationOptions::new(MEDIATOR).with_store(hook))
                    .await
                    .unwrap();
                platform.events.request(CredentialEvent::store(json!({}))).await
            });

            prop_assert_eq!(reply, Ok(CredentialReply::new(data_type, data)));
        }
    }
}
