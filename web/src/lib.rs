mod app;
pub mod context;
pub mod error;
mod lifecycle;
pub mod style;
pub mod websocket;

use std::cell::RefCell;

use lumen_shared::BootConfig;
use wasm_bindgen::prelude::*;

pub use app::{App, ConnectionStatus};
pub use context::{use_app_context, use_socket, AppContext};
pub use error::{BootError, SocketError};
pub use lifecycle::Application;
pub use websocket::{SocketClient, SocketHandle};

/// Set by the `dev-diagnostics` cargo feature.
pub const DIAGNOSTICS: bool = cfg!(feature = "dev-diagnostics");

thread_local! {
    static RUNNING: RefCell<Option<Application>> = const { RefCell::new(None) };
}

/// Boot configuration for this build.
pub fn build_config() -> BootConfig {
    BootConfig::default().with_diagnostics(DIAGNOSTICS)
}

/// Start the page's application, replacing any instance started earlier.
pub fn boot(config: BootConfig) -> Result<(), BootError> {
    shutdown();

    let mut app = Application::new(config);
    app.start()?;
    RUNNING.with(|running| *running.borrow_mut() = Some(app));
    Ok(())
}

/// Stop the running application, if any.
pub fn shutdown() {
    let previous = RUNNING.with(|running| running.borrow_mut().take());
    if let Some(mut app) = previous {
        app.stop();
    }
}

#[cfg(not(test))]
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = if DIAGNOSTICS { log::Level::Debug } else { log::Level::Info };
    _ = console_log::init_with_level(level);

    match boot(build_config()) {
        Ok(()) => Ok(()),
        Err(BootError::MissingMountTarget(selector)) => {
            log::warn!("no element matches {selector}; nothing mounted");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
