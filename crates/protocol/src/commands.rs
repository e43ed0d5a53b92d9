use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Identity field stamped on every outbound message. The controller uses it
/// to distinguish deck commands from other traffic on the channel.
pub const SOURCE_ID: &str = "button";

/// An outbound command from the deck to the controller.
///
/// The variant name is the wire `cmd` string, exactly as the controller
/// expects it (including the lowercase `f` of `Loadfile`). Serialization is
/// internally tagged, so each variant flattens into one JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Request {
    /// Live manual move; fired on every slider or position-input change.
    Update { body: TargetVector },

    /// Persist the current sequence under a name on the controller.
    SaveFile { body: Vec<Frame>, filename: String },

    /// Ask the controller for a previously saved sequence.
    Loadfile { filename: String },

    /// Play a sequence a given number of cycles.
    Run {
        body: Vec<Frame>,
        number_of_times: u32,
    },
}

/// Body of an `Update` command: one target value per channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetVector {
    pub target_pwm: Vec<i32>,
}

/// A `Request` paired with the constant source id, ready for encoding.
///
/// Kept separate from `Request` so the enum stays a clean tagged union;
/// the envelope only exists at the serialization boundary.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub id: &'static str,
    #[serde(flatten)]
    pub request: &'a Request,
}

impl Request {
    /// Wrap this request in the wire envelope.
    pub fn envelope(&self) -> Envelope<'_> {
        Envelope {
            id: SOURCE_ID,
            request: self,
        }
    }
}
