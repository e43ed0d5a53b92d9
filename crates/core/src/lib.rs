//! The deck: everything between the operator's control surface and the wire.
//!
//! ```text
//!   panel inputs ──▶ snapshot ──▶ SequenceEditor ──▶ text buffer
//!        ▲                             │                  │
//!        │                             ▼                  ▼
//!   updatePosition ◀── ControlChannel ◀── Request (Update / SaveFile / Loadfile / Run)
//! ```
//!
//! The panel and the physical socket belong to the host environment (browser
//! page, CLI harness); this crate owns the state in between and the one
//! dispatch point for inbound messages.

pub mod channel;
pub mod deck;
pub mod panel;
pub mod sequence;
pub mod textbuf;

pub use channel::{ControlChannel, LinkState, QueuedTransport, Transport};
pub use deck::Deck;
pub use panel::{ControlPanel, PanelState};
pub use sequence::SequenceEditor;
