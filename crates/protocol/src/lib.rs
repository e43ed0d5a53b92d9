pub mod commands;
pub mod events;
pub mod frame;

pub use commands::Request;
pub use events::{Event, SequenceFile};
pub use frame::Frame;
