use lumen_shared::{CodecError, EndpointError};
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("socket is not connected")]
    NotConnected,
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("websocket error: {0}")]
    Js(String),
}

impl SocketError {
    pub(crate) fn from_js(value: JsValue) -> Self {
        SocketError::Js(describe(&value))
    }
}

#[derive(Debug, Error)]
pub enum BootError {
    #[error("no browser window available")]
    NoWindow,
    #[error("style plugin failed to initialize: {0}")]
    Style(String),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Socket(#[from] SocketError),
    #[error("mount target `{0}` not found")]
    MissingMountTarget(String),
    #[error("dom error: {0}")]
    Dom(String),
}

impl BootError {
    pub(crate) fn dom(value: JsValue) -> Self {
        BootError::Dom(describe(&value))
    }
}

impl From<BootError> for JsValue {
    fn from(err: BootError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
