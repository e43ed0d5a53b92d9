//! Browser bridge: one static `Deck` behind wasm-bindgen functions.
//!
//! The hosting page owns the WebSocket. It opens the socket at
//! [`endpoint`], reports lifecycle through [`socket_opened`] /
//! [`socket_closed`], feeds inbound text frames to [`handle_message`], and
//! sends whatever wire frames the operator-action functions return.

use std::sync::Mutex;

use servo_deck_core::channel;
use servo_deck_core::panel::{ControlPanel, RawTiming};
use servo_deck_core::{Deck, PanelState, QueuedTransport};
use wasm_bindgen::prelude::*;

static DECK: Mutex<Option<Deck<PanelState, QueuedTransport>>> = Mutex::new(None);

fn with_deck<R>(
    f: impl FnOnce(&mut Deck<PanelState, QueuedTransport>) -> Result<R, JsError>,
) -> Result<R, JsError> {
    let mut guard = DECK
        .lock()
        .map_err(|_| JsError::new("deck state poisoned"))?;
    let deck = guard.as_mut().ok_or_else(|| JsError::new("deck not initialized"))?;
    f(deck)
}

fn drain_outbound(deck: &mut Deck<PanelState, QueuedTransport>) -> Vec<String> {
    deck.transport_mut()
        .map(QueuedTransport::drain)
        .unwrap_or_default()
}

/// Create the deck for a controller of the given channel width and mark the
/// channel as connecting. Call right before opening the WebSocket.
#[wasm_bindgen]
pub fn init(channel_count: usize) -> Result<(), JsError> {
    let mut guard = DECK
        .lock()
        .map_err(|_| JsError::new("deck state poisoned"))?;
    let mut deck = Deck::new(PanelState::new(channel_count));
    deck.connect(QueuedTransport::new());
    *guard = Some(deck);
    Ok(())
}

/// The convention endpoint for the current page host (`ws://<host>/ws`).
#[wasm_bindgen]
pub fn endpoint(host: &str) -> String {
    channel::endpoint_for(host)
}

#[wasm_bindgen]
pub fn socket_opened() -> Result<(), JsError> {
    with_deck(|deck| {
        deck.on_open();
        Ok(())
    })
}

/// Close or error on the page's socket. No automatic reconnection: the page
/// decides when to `init` and open again.
#[wasm_bindgen]
pub fn socket_closed() -> Result<(), JsError> {
    with_deck(|deck| {
        deck.on_close();
        Ok(())
    })
}

/// Route one inbound text frame. Malformed or unknown messages are logged
/// and dropped inside the deck; this never throws for them.
#[wasm_bindgen]
pub fn handle_message(raw: &str) -> Result<(), JsError> {
    with_deck(|deck| {
        deck.on_message(raw);
        Ok(())
    })
}

/// Slider/position-input change: write the channel and return the single
/// `Update` wire frame for the page to send.
#[wasm_bindgen]
pub fn set_channel(channel: usize, value: i32) -> Result<Vec<String>, JsError> {
    with_deck(|deck| {
        deck.set_channel(channel, value)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(drain_outbound(deck))
    })
}

/// Update the frame-parameter inputs (speed, sleeps, match-speed flag).
#[wasm_bindgen]
pub fn set_timing(
    speed: f64,
    sleep: f64,
    sleep_before: f64,
    match_speed: bool,
) -> Result<(), JsError> {
    with_deck(|deck| {
        deck.panel_mut().set_timing(RawTiming {
            speed,
            sleep,
            sleep_before,
            match_speed,
        });
        Ok(())
    })
}

/// Capture the panel into a new frame; returns the assigned frame number.
#[wasm_bindgen]
pub fn add_frame() -> Result<u32, JsError> {
    with_deck(|deck| deck.add_frame().map_err(|e| JsError::new(&e.to_string())))
}

#[wasm_bindgen]
pub fn clear_sequence() -> Result<(), JsError> {
    with_deck(|deck| {
        deck.clear_sequence();
        Ok(())
    })
}

/// The sequence text area contents, for display.
#[wasm_bindgen]
pub fn sequence_text() -> Result<String, JsError> {
    with_deck(|deck| Ok(deck.editor().buffer().to_string()))
}

/// Push a hand-edited text area back into the deck (model unchanged until
/// `load_sequence`).
#[wasm_bindgen]
pub fn set_sequence_text(text: &str) -> Result<(), JsError> {
    with_deck(|deck| {
        deck.editor_mut().set_buffer(text);
        Ok(())
    })
}

/// Re-derive the sequence from the text area. Best-effort: on parse failure
/// the last good sequence is kept and the failure only logged.
#[wasm_bindgen]
pub fn load_sequence() -> Result<(), JsError> {
    with_deck(|deck| {
        deck.load_sequence();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn save_file(filename: &str) -> Result<Vec<String>, JsError> {
    with_deck(|deck| {
        deck.save_file(filename)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(drain_outbound(deck))
    })
}

#[wasm_bindgen]
pub fn load_file(filename: &str) -> Result<Vec<String>, JsError> {
    with_deck(|deck| {
        deck.load_file(filename)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(drain_outbound(deck))
    })
}

#[wasm_bindgen]
pub fn run(number_of_times: u32) -> Result<Vec<String>, JsError> {
    with_deck(|deck| {
        deck.run(number_of_times)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(drain_outbound(deck))
    })
}

/// Current display values per channel, as JSON, for the page to refresh its
/// widgets after an inbound `updatePosition`.
#[wasm_bindgen]
pub fn channel_values() -> Result<String, JsError> {
    with_deck(|deck| {
        let values: Vec<f64> = (0..deck.panel().channel_count())
            .map(|ch| deck.panel().channel_value(ch))
            .collect();
        serde_json::to_string(&values).map_err(|e| JsError::new(&e.to_string()))
    })
}
