use serde::{Deserialize, Serialize};

/// One recorded waypoint of a playback sequence.
///
/// A frame captures the full channel position snapshot at record time plus
/// the timing parameters the controller needs to reach it. Field names are
/// the wire names — frames travel verbatim inside `SaveFile` and `Run`
/// bodies and in the sequence text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Index within the sequence at capture time. Assigned once, never
    /// renumbered; a hand-edited or remote-loaded sequence keeps whatever
    /// numbers its text carries.
    pub frame: u32,
    /// Target value per channel, index-aligned to channel number.
    pub target_pwm: Vec<i32>,
    /// Transition speed passed through to the controller.
    pub speed: i32,
    /// Hold duration after the move completes.
    pub sleep: i32,
    /// Hold duration before the move starts.
    pub sleep_before: i32,
    /// When set, the controller scales per-channel speeds so that all
    /// channels arrive at the same time.
    pub match_speed: bool,
}

impl Frame {
    /// Number of channels this frame addresses.
    pub fn channel_count(&self) -> usize {
        self.target_pwm.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let frame = Frame {
            frame: 0,
            target_pwm: vec![1500, 1200],
            speed: 20,
            sleep: 1,
            sleep_before: 0,
            match_speed: true,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["frame"], 0);
        assert_eq!(json["target_pwm"][0], 1500);
        assert_eq!(json["sleep_before"], 0);
        assert_eq!(json["match_speed"], true);
    }

    #[test]
    fn roundtrip() {
        let frame = Frame {
            frame: 3,
            target_pwm: vec![900, 2100, 1500],
            speed: 40,
            sleep: 2,
            sleep_before: 1,
            match_speed: false,
        };
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
