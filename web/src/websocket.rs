use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use lumen_shared::{ConnectionPhase, Endpoint, Format, ReconnectAction, Reconnector, SocketConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::error::SocketError;

// Live sockets, keyed by handle id. Views hold `SocketHandle`s, which are
// Send + Sync, instead of the `Rc`-based client itself.
thread_local! {
    static SOCKETS: RefCell<HashMap<u64, Rc<SocketInner>>> = RefCell::new(HashMap::new());
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

type Handler = Rc<dyn Fn(&str)>;

// Only held so the JS side can keep calling them.
#[allow(dead_code)]
struct Callbacks {
    onopen: Closure<dyn FnMut(Event)>,
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    onerror: Closure<dyn FnMut(Event)>,
    onclose: Closure<dyn FnMut(CloseEvent)>,
}

struct SocketInner {
    url: String,
    format: Format,
    reconnector: RefCell<Reconnector>,
    ws: RefCell<Option<WebSocket>>,
    callbacks: RefCell<Option<Callbacks>>,
    timer: RefCell<Option<Timeout>>,
    handlers: RefCell<Vec<Handler>>,
    status: ArcRwSignal<ConnectionPhase>,
}

impl SocketInner {
    fn publish(&self) {
        let phase = self.reconnector.borrow().phase().clone();
        self.status.set(phase);
    }

    fn connect(self: &Rc<Self>) -> Result<(), SocketError> {
        if !self.reconnector.borrow_mut().connect() {
            return Ok(());
        }
        self.publish();
        self.open()
    }

    fn open(self: &Rc<Self>) -> Result<(), SocketError> {
        self.detach();

        let ws = match WebSocket::new(&self.url) {
            Ok(ws) => ws,
            Err(err) => {
                let err = SocketError::from_js(err);
                log::warn!("failed to open {}: {}", self.url, err);
                self.handle_drop();
                return Err(err);
            }
        };

        let weak = Rc::downgrade(self);
        let onopen = Closure::wrap(Box::new(move |_: Event| {
            with_inner(&weak, |inner| inner.handle_open());
        }) as Box<dyn FnMut(_)>);

        let weak = Rc::downgrade(self);
        let onmessage = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                let text: String = text.into();
                with_inner(&weak, |inner| inner.dispatch(&text));
            } else {
                log::debug!("ignoring non-text frame");
            }
        }) as Box<dyn FnMut(_)>);

        let onerror = Closure::wrap(Box::new(move |_: Event| {
            log::warn!("websocket error");
        }) as Box<dyn FnMut(_)>);

        let weak = Rc::downgrade(self);
        let onclose = Closure::wrap(Box::new(move |e: CloseEvent| {
            log::info!("websocket disconnected (code {})", e.code());
            with_inner(&weak, |inner| inner.handle_drop());
        }) as Box<dyn FnMut(_)>);

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        *self.callbacks.borrow_mut() = Some(Callbacks {
            onopen,
            onmessage,
            onerror,
            onclose,
        });
        *self.ws.borrow_mut() = Some(ws);
        Ok(())
    }

    /// Unhook and close the current socket, if any.
    fn detach(&self) {
        if let Some(ws) = self.ws.borrow_mut().take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onerror(None);
            ws.set_onclose(None);
            let _ = ws.close();
        }
        self.callbacks.borrow_mut().take();
    }

    fn handle_open(&self) {
        if self.reconnector.borrow_mut().opened() {
            log::info!("websocket connected to {}", self.url);
            self.publish();
        }
    }

    fn handle_drop(self: &Rc<Self>) {
        let action = self.reconnector.borrow_mut().dropped();
        match action {
            ReconnectAction::Retry { attempt, delay } => {
                let max = self.reconnector.borrow().policy().max_attempts;
                log::info!("reconnecting in {delay:?} (attempt {attempt}/{max})");
                let weak = Rc::downgrade(self);
                let millis = self.reconnector.borrow().policy().delay_millis();
                let timeout = Timeout::new(millis, move || {
                    with_inner(&weak, |inner| inner.retry());
                });
                *self.timer.borrow_mut() = Some(timeout);
            }
            ReconnectAction::GiveUp => {
                log::warn!("giving up on {}", self.url);
            }
            ReconnectAction::Ignore => {}
        }
        self.publish();
    }

    fn retry(self: &Rc<Self>) {
        if self.reconnector.borrow_mut().retry_due() {
            self.publish();
            // Failures are already routed back through handle_drop.
            let _ = self.open();
        }
    }

    fn dispatch(&self, text: &str) {
        let handlers: Vec<Handler> = self.handlers.borrow().clone();
        for handler in handlers {
            handler(text);
        }
    }

    fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<(), SocketError> {
        let text = self.format.encode(message)?;
        let ws = self.ws.borrow();
        match ws.as_ref() {
            Some(ws) if ws.ready_state() == WebSocket::OPEN => {
                ws.send_with_str(&text).map_err(SocketError::from_js)
            }
            _ => Err(SocketError::NotConnected),
        }
    }

    fn close(&self) {
        if self.reconnector.borrow_mut().close() {
            self.timer.borrow_mut().take();
            self.detach();
            self.publish();
            log::info!("websocket to {} closed", self.url);
        }
    }
}

fn with_inner(weak: &Weak<SocketInner>, f: impl FnOnce(&Rc<SocketInner>)) {
    if let Some(inner) = weak.upgrade() {
        f(&inner);
    }
}

fn lookup(id: u64) -> Option<Rc<SocketInner>> {
    SOCKETS.with(|sockets| sockets.borrow().get(&id).cloned())
}

/// Reconnecting JSON WebSocket. Owned by the application; views talk to it
/// through [`SocketHandle`].
pub struct SocketClient {
    handle: SocketHandle,
    inner: Rc<SocketInner>,
}

impl SocketClient {
    /// Register the socket and, when `auto_connect` is set, start connecting.
    pub fn new(endpoint: &Endpoint, config: &SocketConfig) -> Result<Self, SocketError> {
        let inner = Rc::new(SocketInner {
            url: endpoint.url(),
            format: config.format,
            reconnector: RefCell::new(Reconnector::new(config.reconnect.clone())),
            ws: RefCell::new(None),
            callbacks: RefCell::new(None),
            timer: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
            status: ArcRwSignal::new(ConnectionPhase::Idle),
        });

        let id = NEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            id
        });
        SOCKETS.with(|sockets| sockets.borrow_mut().insert(id, inner.clone()));

        let client = Self {
            handle: SocketHandle(id),
            inner,
        };
        if config.auto_connect {
            // A refused first attempt is retried per the policy, so only log it.
            if let Err(err) = client.inner.connect() {
                log::warn!("initial connection to {} failed: {}", client.inner.url, err);
            }
        }
        Ok(client)
    }

    pub fn handle(&self) -> SocketHandle {
        self.handle
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn status(&self) -> ArcRwSignal<ConnectionPhase> {
        self.inner.status.clone()
    }

    /// Close for good and drop the registry entry. Handles stop working.
    pub fn close(self) {
        self.inner.close();
        SOCKETS.with(|sockets| sockets.borrow_mut().remove(&self.handle.0));
    }
}

/// Copyable reference to a live [`SocketClient`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SocketHandle(u64);

impl SocketHandle {
    /// Encode and send one message. Encoding happens first, so an
    /// unserializable value fails with [`SocketError::Codec`] even when offline.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<(), SocketError> {
        match lookup(self.0) {
            Some(inner) => inner.send(message),
            None => {
                // Still surface encoding problems first.
                Format::Json.encode(message)?;
                Err(SocketError::NotConnected)
            }
        }
    }

    /// Subscribe to incoming messages of type `T`. Frames that do not decode
    /// as `T` are logged and skipped for this subscriber.
    pub fn on_message<T, F>(&self, f: F) -> Result<(), SocketError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + 'static,
    {
        let inner = lookup(self.0).ok_or(SocketError::NotConnected)?;
        let format = inner.format;
        let handler: Handler = Rc::new(move |text: &str| match format.decode::<T>(text) {
            Ok(message) => f(message),
            Err(err) => log::warn!("dropping message: {err}"),
        });
        inner.handlers.borrow_mut().push(handler);
        Ok(())
    }

    /// Connect again after the retries ran out, or for the first time when
    /// the socket was created without `auto_connect`.
    pub fn reconnect(&self) -> Result<(), SocketError> {
        let inner = lookup(self.0).ok_or(SocketError::NotConnected)?;
        inner.connect()
    }

    pub fn phase(&self) -> Option<ConnectionPhase> {
        lookup(self.0).map(|inner| inner.reconnector.borrow().phase().clone())
    }

    pub fn attempts(&self) -> Option<u32> {
        lookup(self.0).map(|inner| inner.reconnector.borrow().attempts())
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use std::collections::HashMap;

    use std::time::Duration;

    use gloo_timers::future::TimeoutFuture;
    use lumen_shared::{ReconnectPolicy, Scheme};
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn manual(reconnect: ReconnectPolicy) -> SocketConfig {
        SocketConfig {
            reconnect,
            auto_connect: false,
            ..SocketConfig::default()
        }
    }

    fn endpoint() -> Endpoint {
        Endpoint::new(Scheme::Ws, "example.test", "/ws/").unwrap()
    }

    #[wasm_bindgen_test]
    fn handle_reaches_client_until_close() {
        let client = SocketClient::new(&endpoint(), &manual(ReconnectPolicy::default())).unwrap();
        let handle = client.handle();

        assert_eq!(client.url(), "ws://example.test/ws/");
        assert_eq!(handle.phase(), Some(ConnectionPhase::Idle));

        client.close();
        assert_eq!(handle.phase(), None);
        assert!(matches!(handle.send(&"hi"), Err(SocketError::NotConnected)));
    }

    #[wasm_bindgen_test]
    fn unserializable_message_fails_before_the_network() {
        let client = SocketClient::new(&endpoint(), &manual(ReconnectPolicy::default())).unwrap();
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON");

        assert!(matches!(client.handle().send(&bad), Err(SocketError::Codec(_))));
        assert!(matches!(client.handle().send(&"fine"), Err(SocketError::NotConnected)));
        client.close();
    }

    #[wasm_bindgen_test]
    fn manual_connect_moves_to_connecting() {
        let client = SocketClient::new(&endpoint(), &manual(ReconnectPolicy::disabled())).unwrap();
        let status = client.status();

        client.handle().reconnect().unwrap();
        assert_eq!(status.get_untracked(), ConnectionPhase::Connecting);

        client.close();
        assert_eq!(status.get_untracked(), ConnectionPhase::Closed);
    }

    #[wasm_bindgen_test]
    fn subscribers_only_see_their_type() {
        let client = SocketClient::new(&endpoint(), &manual(ReconnectPolicy::default())).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        client
            .handle()
            .on_message(move |value: serde_json::Value| sink.borrow_mut().push(value["success"].clone()))
            .unwrap();
        let numbers = Rc::new(Cell::new(0));
        let count = numbers.clone();
        client.handle().on_message(move |_: u32| count.set(count.get() + 1)).unwrap();

        client.inner.dispatch(r#"{"success":true}"#);
        client.inner.dispatch("7");
        client.inner.dispatch("{broken");

        assert_eq!(*seen.borrow(), vec![serde_json::json!(true), serde_json::Value::Null]);
        assert_eq!(numbers.get(), 1);
        client.close();
    }

    #[wasm_bindgen_test]
    async fn refused_connection_retries_then_gives_up() {
        // Nothing listens on the discard port, so every attempt is refused.
        let endpoint = Endpoint::new(Scheme::Ws, "127.0.0.1:9", "/").unwrap();
        let config = SocketConfig {
            reconnect: ReconnectPolicy {
                enabled: true,
                max_attempts: 2,
                delay: Duration::from_millis(10),
            },
            ..SocketConfig::default()
        };
        let client = SocketClient::new(&endpoint, &config).unwrap();
        let handle = client.handle();

        let mut seen_attempts = Vec::new();
        for _ in 0..500 {
            let attempts = handle.attempts().unwrap();
            if seen_attempts.last() != Some(&attempts) {
                seen_attempts.push(attempts);
            }
            if handle.phase() == Some(ConnectionPhase::Exhausted) {
                break;
            }
            TimeoutFuture::new(10).await;
        }

        assert_eq!(handle.phase(), Some(ConnectionPhase::Exhausted));
        assert_eq!(handle.attempts(), Some(2));
        assert_eq!(seen_attempts.last(), Some(&2));
        assert!(seen_attempts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(client.status().get_untracked(), ConnectionPhase::Exhausted);
        client.close();
    }
}
