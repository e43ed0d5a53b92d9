use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// An inbound message from the controller.
///
/// The wire shape is `{"cmd": <handler name>, "param": <payload>}`. Routing
/// is by tagged variant with an exhaustive match at the dispatch point;
/// a `cmd` outside this vocabulary fails to decode and is logged and
/// dropped by the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "param")]
pub enum Event {
    /// The controller reports its current positions, grouped by logical
    /// input key (in practice `"pwm"`). Sent on connection open and after
    /// each playback step.
    #[serde(rename = "updatePosition")]
    UpdatePosition(PositionGroups),

    /// Reply to `Loadfile`: the stored sequence file payload.
    FromLoadedFile(SequenceFile),
}

/// Position values keyed by logical input group.
///
/// The controller may report groups the deck does not render; consumers
/// look up the keys they know and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionGroups(pub BTreeMap<String, Vec<i32>>);

impl PositionGroups {
    /// A single-group payload, the common case.
    pub fn single(key: impl Into<String>, values: Vec<i32>) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(key.into(), values);
        Self(groups)
    }

    pub fn group(&self, key: &str) -> Option<&[i32]> {
        self.0.get(key).map(Vec::as_slice)
    }
}

/// Contents of a sequence file as stored on the controller.
///
/// The controller persists the raw `SaveFile` message it received, so the
/// payload can carry extra envelope fields (`id`, `cmd`); only the frame
/// body and the name matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFile {
    pub body: Vec<Frame>,
    #[serde(default)]
    pub filename: Option<String>,
}
