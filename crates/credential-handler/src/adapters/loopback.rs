//! Loopback Window System
//!
//! In-process windows for the redirect path. Opening a URL spawns the
//! window application mounted for it; the application talks back through a
//! `LoopbackServer`, and the opener calls into it through a
//! `LoopbackInjector`.
//!
//! A window lives as long as its application task. Once the task returns,
//! its services disappear and pending or later calls fail with
//! `RpcError::ChannelClosed`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::domain::{RedirectError, RpcError};
use crate::ports::outbound::{
    Injector, RemoteService, RpcServer, WindowConnector, WindowHandle, WindowOpenFuture,
    WindowOpener, WindowOpening, WindowReadyFuture,
};

type ServiceTable = Arc<RwLock<HashMap<String, Arc<dyn RemoteService>>>>;
type WindowTable = Arc<RwLock<HashMap<Uuid, WindowState>>>;

/// Application running inside a loopback window.
#[async_trait]
pub trait WindowApp: Send + Sync {
    /// Run the window until it closes.
    async fn run(&self, server: Arc<dyn RpcServer>, url: Url);
}

/// Adapter turning an async closure into a `WindowApp`.
pub struct FnWindowApp<F>(F);

#[async_trait]
impl<F, Fut> WindowApp for FnWindowApp<F>
where
    F: Fn(Arc<dyn RpcServer>, Url) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send,
{
    async fn run(&self, server: Arc<dyn RpcServer>, url: Url) {
        (self.0)(server, url).await
    }
}

/// Wrap an async closure as a mountable window application.
pub fn window_app_fn<F, Fut>(f: F) -> Arc<dyn WindowApp>
where
    F: Fn(Arc<dyn RpcServer>, Url) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(FnWindowApp(f))
}

struct WindowState {
    services: ServiceTable,
    ready: watch::Receiver<bool>,
}

/// Callee side of a loopback window.
pub struct LoopbackServer {
    services: ServiceTable,
    ready: watch::Sender<bool>,
}

#[async_trait]
impl RpcServer for LoopbackServer {
    fn define(&self, name: &str, service: Arc<dyn RemoteService>) {
        debug!(service = name, "[ch] Window service defined");
        self.services.write().insert(name.to_string(), service);
    }

    async fn connect(&self) -> Result<(), RpcError> {
        self.ready.send_replace(true);
        Ok(())
    }
}

/// Caller side of a loopback window.
pub struct LoopbackInjector {
    window: Uuid,
    windows: WindowTable,
}

#[async_trait]
impl Injector for LoopbackInjector {
    async fn call(&self, service: &str, function: &str, args: Value) -> Result<Value, RpcError> {
        let services = self
            .windows
            .read()
            .get(&self.window)
            .map(|w| w.services.clone())
            .ok_or_else(|| RpcError::ChannelClosed(format!("window {} closed", self.window)))?;

        let target = services
            .read()
            .get(service)
            .cloned()
            .ok_or_else(|| RpcError::UnknownService(service.to_string()))?;

        target.invoke(function, args).await
    }
}

/// In-process browser hosting mounted window applications.
#[derive(Default)]
pub struct LoopbackBrowser {
    apps: RwLock<Vec<(String, Arc<dyn WindowApp>)>>,
    windows: WindowTable,
    opened: Mutex<Vec<Url>>,
}

impl LoopbackBrowser {
    /// Create a browser with nothing mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve URLs starting with `url_prefix` with `app`.
    pub fn mount(&self, url_prefix: impl Into<String>, app: Arc<dyn WindowApp>) {
        let url_prefix = url_prefix.into();
        info!(prefix = %url_prefix, "[ch] Window app mounted");
        self.apps.write().push((url_prefix, app));
    }

    /// URLs of every window opened so far.
    pub fn opened_urls(&self) -> Vec<Url> {
        self.opened.lock().clone()
    }

    /// Number of windows whose application is still running.
    pub fn open_windows(&self) -> usize {
        self.windows.read().len()
    }

    /// Longest mounted prefix matching `url`.
    fn app_for(&self, url: &Url) -> Option<Arc<dyn WindowApp>> {
        self.apps
            .read()
            .iter()
            .filter(|(prefix, _)| url.as_str().starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, app)| app.clone())
    }
}

impl WindowOpener for LoopbackBrowser {
    fn open_window(&self, url: &Url) -> WindowOpenFuture {
        let url = url.clone();
        let app = self.app_for(&url);
        let windows = self.windows.clone();
        self.opened.lock().push(url.clone());

        Box::pin(async move {
            let app = app.ok_or_else(|| {
                RedirectError::WindowOpen(format!("no window app mounted for {url}"))
            })?;

            let handle = WindowHandle::new(url.clone());
            let services: ServiceTable = Arc::new(RwLock::new(HashMap::new()));
            let (ready, ready_rx) = watch::channel(false);
            windows.write().insert(
                handle.id(),
                WindowState {
                    services: services.clone(),
                    ready: ready_rx,
                },
            );

            let server: Arc<dyn RpcServer> = Arc::new(LoopbackServer { services, ready });
            let id = handle.id();
            tokio::spawn(async move {
                app.run(server, url).await;
                windows.write().remove(&id);
                debug!(window = %id, "[ch] Window closed");
            });

            Ok(handle)
        })
    }
}

impl WindowConnector for LoopbackBrowser {
    fn create_window(&self, _url: &Url, opening: WindowOpening) -> WindowReadyFuture {
        let windows = self.windows.clone();

        Box::pin(async move {
            let handle = opening.await?;
            let mut ready = windows
                .read()
                .get(&handle.id())
                .map(|w| w.ready.clone())
                .ok_or_else(|| {
                    RedirectError::ChannelNotReady(format!("window {} closed", handle.id()))
                })?;

            ready.wait_for(|connected| *connected).await.map_err(|_| {
                RedirectError::ChannelNotReady(format!(
                    "window {} closed before connecting",
                    handle.id()
                ))
            })?;

            Ok(Arc::new(LoopbackInjector {
                window: handle.id(),
                windows,
            }) as Arc<dyn Injector>)
        })
    }
}
