use serde::{Deserialize, Serialize};

use crate::codec::Format;
use crate::endpoint::{Endpoint, EndpointError, SchemePolicy};
use crate::reconnect::ReconnectPolicy;

/// Pinned Bulma build the component classes come from.
pub const BULMA_CDN: &str = "https://cdn.jsdelivr.net/npm/bulma@0.9.4/css/bulma.min.css";

/// Stylesheet provided to every view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub href: String,
    /// DOM id of the `<link>` element; an existing element with this id is reused.
    pub element_id: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            href: BULMA_CDN.to_string(),
            element_id: "lumen-style".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    pub path: String,
    pub scheme: SchemePolicy,
    pub format: Format,
    pub reconnect: ReconnectPolicy,
    /// Open as soon as the plugin is registered. When false the connection
    /// waits for an explicit `reconnect()`.
    pub auto_connect: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            path: "/ws/".to_string(),
            scheme: SchemePolicy::default(),
            format: Format::default(),
            reconnect: ReconnectPolicy::default(),
            auto_connect: true,
        }
    }
}

impl SocketConfig {
    pub fn endpoint(&self, page_protocol: &str, host: &str) -> Result<Endpoint, EndpointError> {
        Endpoint::from_page(self.scheme, page_protocol, host, &self.path)
    }
}

/// One step of the boot sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStep {
    RegisterStyle,
    RegisterSocket,
    ApplyDiagnostics,
    Mount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub mount_selector: String,
    pub style: StyleConfig,
    pub socket: SocketConfig,
    /// Development diagnostics. Off in production builds.
    pub diagnostics: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            mount_selector: "#app".to_string(),
            style: StyleConfig::default(),
            socket: SocketConfig::default(),
            diagnostics: false,
        }
    }
}

impl BootConfig {
    pub const STEPS: [BootStep; 4] = [
        BootStep::RegisterStyle,
        BootStep::RegisterSocket,
        BootStep::ApplyDiagnostics,
        BootStep::Mount,
    ];

    pub fn steps(&self) -> &'static [BootStep] {
        &Self::STEPS
    }

    pub fn with_mount_selector(mut self, selector: impl Into<String>) -> Self {
        self.mount_selector = selector.into();
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn with_socket(mut self, socket: SocketConfig) -> Self {
        self.socket = socket;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The development-mode notice, or `None` when diagnostics are off.
    pub fn diagnostics_banner(&self) -> Option<String> {
        self.diagnostics.then(|| {
            format!(
                "lumen is running a development build; socket path {}, mount {}",
                self.socket.path, self.mount_selector
            )
        })
    }
}
