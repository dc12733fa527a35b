pub mod codec;
pub mod config;
pub mod endpoint;
pub mod fsm;
pub mod plugin;
pub mod reconnect;

pub use codec::{CodecError, Format};
pub use config::{BootConfig, BootStep, SocketConfig, StyleConfig};
pub use endpoint::{Endpoint, EndpointError, Scheme, SchemePolicy};
pub use fsm::{ConnectionEvent, ConnectionPhase};
pub use plugin::{PluginConfig, PluginSet};
pub use reconnect::{ReconnectAction, ReconnectPolicy, Reconnector};
