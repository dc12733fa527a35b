use leptos::prelude::*;
use lumen_shared::ConnectionPhase;

use crate::style::Theme;
use crate::websocket::SocketHandle;

/// Everything the root view needs from the boot sequence. Passed to `App`
/// explicitly and provided to descendants as context.
#[derive(Clone)]
pub struct AppContext {
    pub theme: Theme,
    pub socket: SocketHandle,
    pub status: ArcRwSignal<ConnectionPhase>,
}

impl AppContext {
    pub fn new(theme: Theme, socket: SocketHandle, status: ArcRwSignal<ConnectionPhase>) -> Self {
        Self { theme, socket, status }
    }
}

/// The [`AppContext`] provided by the nearest `App`.
///
/// Panics outside a view tree mounted by the application.
pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

/// Handle to the application's socket, for views that send or subscribe.
///
/// Panics outside a view tree mounted by the application.
pub fn use_socket() -> SocketHandle {
    use_app_context().socket
}
