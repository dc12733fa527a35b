use std::any::Any;

use leptos::prelude::*;
use lumen_shared::{BootConfig, BootStep, PluginConfig, PluginSet};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::app::App;
use crate::context::AppContext;
use crate::error::{BootError, SocketError};
use crate::style::StylePlugin;
use crate::websocket::{SocketClient, SocketHandle};

/// One application instance: its plugins, its socket and its mounted view.
///
/// Nothing is registered globally; two instances never share state. Dropping
/// the instance stops it.
pub struct Application {
    config: BootConfig,
    plugins: PluginSet,
    style: Option<StylePlugin>,
    socket: Option<SocketClient>,
    // `UnmountHandle` of the root view; dropping it unmounts.
    mounted: Option<Box<dyn Any>>,
}

impl Application {
    pub fn new(config: BootConfig) -> Self {
        Self {
            config,
            plugins: PluginSet::new(),
            style: None,
            socket: None,
            mounted: None,
        }
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    pub fn socket(&self) -> Option<SocketHandle> {
        self.socket.as_ref().map(SocketClient::handle)
    }

    pub fn socket_url(&self) -> Option<&str> {
        self.socket.as_ref().map(SocketClient::url)
    }

    pub fn is_running(&self) -> bool {
        self.mounted.is_some()
    }

    /// Run the boot steps in order. On failure everything installed so far
    /// is torn down again. Starting a running application does nothing.
    pub fn start(&mut self) -> Result<(), BootError> {
        if self.is_running() {
            log::debug!("application already started");
            return Ok(());
        }

        let window = web_sys::window().ok_or(BootError::NoWindow)?;
        let document = window.document().ok_or(BootError::NoWindow)?;

        for step in self.config.steps() {
            let result = match step {
                BootStep::RegisterStyle => self.register_style(&document),
                BootStep::RegisterSocket => self.register_socket(&window),
                BootStep::ApplyDiagnostics => {
                    self.apply_diagnostics();
                    Ok(())
                }
                BootStep::Mount => self.mount(&document),
            };
            if let Err(err) = result {
                self.stop();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Unmount the view, close the socket without reconnecting and remove the
    /// stylesheet. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            drop(mounted);
            log::debug!("root view unmounted");
        }
        if let Some(socket) = self.socket.take() {
            socket.close();
        }
        if let Some(style) = self.style.take() {
            style.uninstall();
        }
        self.plugins.clear();
    }

    fn register_style(&mut self, document: &Document) -> Result<(), BootError> {
        let plugin = StylePlugin::install(document, &self.config.style)?;
        self.style = Some(plugin);
        self.plugins.register(PluginConfig::Style(self.config.style.clone()));
        Ok(())
    }

    fn register_socket(&mut self, window: &Window) -> Result<(), BootError> {
        let location = window.location();
        let protocol = location.protocol().map_err(BootError::dom)?;
        let host = location.host().map_err(BootError::dom)?;
        let endpoint = self.config.socket.endpoint(&protocol, &host)?;

        let socket = SocketClient::new(&endpoint, &self.config.socket)?;
        log::info!("socket plugin registered for {}", socket.url());
        self.socket = Some(socket);
        self.plugins.register(PluginConfig::Socket(self.config.socket.clone()));
        Ok(())
    }

    fn apply_diagnostics(&self) {
        if let Some(banner) = self.config.diagnostics_banner() {
            log::set_max_level(log::LevelFilter::Debug);
            log::warn!("{banner}");
        }
    }

    fn mount(&mut self, document: &Document) -> Result<(), BootError> {
        let selector = &self.config.mount_selector;
        let anchor = document
            .query_selector(selector)
            .map_err(BootError::dom)?
            .ok_or_else(|| BootError::MissingMountTarget(selector.clone()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| BootError::Dom(format!("{selector} is not an HTML element")))?;

        let socket = self
            .socket
            .as_ref()
            .ok_or(BootError::Socket(SocketError::NotConnected))?;
        let theme = self.style.as_ref().map(StylePlugin::theme).unwrap_or_default();
        let ctx = AppContext::new(theme, socket.handle(), socket.status());

        let handle = leptos::mount::mount_to(anchor, move || view! { <App ctx=ctx/> });
        self.mounted = Some(Box::new(handle));
        log::info!("root view mounted at {selector}");
        Ok(())
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.stop();
    }
}
