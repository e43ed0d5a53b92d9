use std::collections::VecDeque;

use servo_deck_protocol::Request;
use thiserror::Error;

/// Connection state of the logical channel.
///
/// There is no automatic reconnection: any close or error re-enters
/// `Disconnected`, and the caller decides when to `start` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Outbound half of the duplex message channel.
///
/// The host environment owns the physical socket; this is the seam the deck
/// writes text frames through. Inbound frames arrive separately, via
/// [`Deck::on_message`](crate::Deck::on_message).
pub trait Transport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// In-memory transport: outbound frames queue up until the host drains and
/// forwards them. Used by the wasm bridge (the page owns the WebSocket),
/// the CLI harness, and tests.
#[derive(Debug, Default)]
pub struct QueuedTransport {
    pending: VecDeque<String>,
}

impl QueuedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all queued frames, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Transport for QueuedTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.pending.push_back(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel is {0:?}, not connected")]
    NotConnected(LinkState),
    #[error("could not encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convention endpoint for a controller reachable at `host`, matching the
/// fixed path the controller serves its message channel on.
pub fn endpoint_for(host: &str) -> String {
    format!("ws://{host}/ws")
}

/// The duplex command pump, minus the socket it does not own.
///
/// `start` hands in a transport and marks the link `Connecting`; the host
/// reports the socket's own lifecycle through `on_open` and `on_close`.
/// Sending encodes the enveloped request and writes one text frame.
#[derive(Debug)]
pub struct ControlChannel<T: Transport> {
    state: LinkState,
    transport: Option<T>,
}

impl<T: Transport> ControlChannel<T> {
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            transport: None,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Begin a connection attempt over the given transport.
    pub fn start(&mut self, transport: T) {
        self.transport = Some(transport);
        self.state = LinkState::Connecting;
        log::info!("control channel connecting");
    }

    /// The host's socket finished opening.
    pub fn on_open(&mut self) {
        if self.transport.is_some() {
            self.state = LinkState::Connected;
            log::info!("control channel connected");
        } else {
            log::warn!("on_open without a transport; staying {:?}", self.state);
        }
    }

    /// The host's socket closed or errored. The transport is dropped; a new
    /// one must come through `start`.
    pub fn on_close(&mut self) {
        self.state = LinkState::Disconnected;
        self.transport = None;
        log::info!("control channel disconnected");
    }

    /// Access the live transport, e.g. to drain a [`QueuedTransport`].
    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// Encode and send one command. Sending anywhere but `Connected` is a
    /// guarded error; a transport failure tears the link down before the
    /// error is returned.
    pub fn send(&mut self, request: &Request) -> Result<(), ChannelError> {
        if self.state != LinkState::Connected {
            return Err(ChannelError::NotConnected(self.state));
        }
        let Some(transport) = self.transport.as_mut() else {
            return Err(ChannelError::NotConnected(self.state));
        };
        let text = serde_json::to_string(&request.envelope())?;
        if let Err(err) = transport.send_text(&text) {
            self.on_close();
            return Err(err.into());
        }
        log::debug!("sent {text}");
        Ok(())
    }
}

impl<T: Transport> Default for ControlChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
