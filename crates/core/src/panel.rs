use servo_deck_protocol::events::PositionGroups;
use thiserror::Error;

use crate::sequence::FrameTiming;

/// Group key under which the controller reports channel positions.
pub const PWM_GROUP: &str = "pwm";

/// The control surface as the deck sees it: per-channel position inputs
/// (numeric box paired with a slider) plus the four dedicated frame-timing
/// inputs. The host environment renders the widgets; this trait is only the
/// capability to read and write their values.
pub trait ControlPanel {
    /// Number of channels rendered; fixed by the controller's channel width.
    fn channel_count(&self) -> usize;

    /// Raw value of a channel's numeric input. Hand-typed garbage shows up
    /// as a non-finite value here, never as a panic.
    fn channel_value(&self, channel: usize) -> f64;

    /// Write a value into both the numeric input and its paired slider.
    /// Out-of-range channels are ignored; writes are idempotent.
    fn set_channel(&mut self, channel: usize, value: i32);

    /// Current raw values of the frame-timing inputs.
    fn timing(&self) -> RawTiming;
}

/// Unvalidated timing inputs as read off the panel.
#[derive(Debug, Clone, Copy)]
pub struct RawTiming {
    pub speed: f64,
    pub sleep: f64,
    pub sleep_before: f64,
    pub match_speed: bool,
}

impl RawTiming {
    /// Round-and-validate into the integer timing a frame carries. Any
    /// non-finite field rejects the capture.
    pub fn validate(&self) -> Result<FrameTiming, CaptureError> {
        Ok(FrameTiming {
            speed: round_field(self.speed, "speed")?,
            sleep: round_field(self.sleep, "sleep")?,
            sleep_before: round_field(self.sleep_before, "sleep_before")?,
            match_speed: self.match_speed,
        })
    }
}

fn round_field(raw: f64, field: &'static str) -> Result<i32, CaptureError> {
    if raw.is_finite() {
        Ok(raw.round() as i32)
    } else {
        Err(CaptureError::Timing { field })
    }
}

/// A capture was rejected because an input did not hold a usable number.
///
/// The source this protocol comes from let such input flow through as NaN
/// into serialized frames; here the capture fails instead and the sequence
/// stays untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("channel {channel} input is not a number")]
    Channel { channel: usize },
    #[error("{field} input is not a number")]
    Timing { field: &'static str },
}

/// Read the full position snapshot: every channel, rounded to the nearest
/// integer, in channel order. No side effects.
pub fn read_snapshot(panel: &impl ControlPanel) -> Result<Vec<i32>, CaptureError> {
    (0..panel.channel_count())
        .map(|channel| {
            let raw = panel.channel_value(channel);
            if raw.is_finite() {
                Ok(raw.round() as i32)
            } else {
                Err(CaptureError::Channel { channel })
            }
        })
        .collect()
}

/// Apply a grouped position update to the panel. Only the `"pwm"` group is
/// recognized; unknown keys are ignored, values past the panel width are
/// dropped.
pub fn write_groups(panel: &mut impl ControlPanel, groups: &PositionGroups) {
    let Some(values) = groups.group(PWM_GROUP) else {
        return;
    };
    for (channel, &value) in values.iter().enumerate().take(panel.channel_count()) {
        panel.set_channel(channel, value);
    }
}

/// Servo pulse-width midpoint; the value channels start at before the
/// controller reports real positions.
const NEUTRAL_PWM: f64 = 1500.0;

/// In-memory panel, used by the wasm bridge, the CLI harness, and tests.
///
/// Models the widget pair per channel: the numeric input is what snapshot
/// reads see; moving a slider copies into the numeric input the way the
/// page's change handler does.
#[derive(Debug)]
pub struct PanelState {
    inputs: Vec<f64>,
    sliders: Vec<f64>,
    timing: RawTiming,
}

impl PanelState {
    pub fn new(channel_count: usize) -> Self {
        Self {
            inputs: vec![NEUTRAL_PWM; channel_count],
            sliders: vec![NEUTRAL_PWM; channel_count],
            timing: RawTiming {
                speed: 30.0,
                sleep: 0.0,
                sleep_before: 0.0,
                match_speed: false,
            },
        }
    }

    /// Operator types into the numeric box; the slider does not follow.
    pub fn type_value(&mut self, channel: usize, raw: f64) {
        if let Some(slot) = self.inputs.get_mut(channel) {
            *slot = raw;
        }
    }

    /// Operator drags a slider; the numeric input follows.
    pub fn move_slider(&mut self, channel: usize, value: f64) {
        if channel < self.sliders.len() {
            self.sliders[channel] = value;
            self.inputs[channel] = value;
        }
    }

    pub fn slider_value(&self, channel: usize) -> Option<f64> {
        self.sliders.get(channel).copied()
    }

    pub fn set_timing(&mut self, timing: RawTiming) {
        self.timing = timing;
    }
}

impl ControlPanel for PanelState {
    fn channel_count(&self) -> usize {
        self.inputs.len()
    }

    fn channel_value(&self, channel: usize) -> f64 {
        self.inputs.get(channel).copied().unwrap_or(f64::NAN)
    }

    fn set_channel(&mut self, channel: usize, value: i32) {
        if channel < self.inputs.len() {
            self.inputs[channel] = f64::from(value);
            self.sliders[channel] = f64::from(value);
        }
    }

    fn timing(&self) -> RawTiming {
        self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_rounds_to_nearest() {
        let mut panel = PanelState::new(3);
        panel.type_value(0, 1499.4);
        panel.type_value(1, 1499.6);
        panel.move_slider(2, 992.0);
        assert_eq!(read_snapshot(&panel).unwrap(), vec![1499, 1500, 992]);
    }

    #[test]
    fn snapshot_rejects_nan_input() {
        let mut panel = PanelState::new(2);
        panel.type_value(1, f64::NAN);
        assert_eq!(
            read_snapshot(&panel),
            Err(CaptureError::Channel { channel: 1 })
        );
    }

    #[test]
    fn timing_rejects_nan_field() {
        let raw = RawTiming {
            speed: f64::NAN,
            sleep: 0.0,
            sleep_before: 0.0,
            match_speed: true,
        };
        assert_eq!(raw.validate(), Err(CaptureError::Timing { field: "speed" }));
    }

    #[test]
    fn write_groups_updates_both_widgets() {
        let mut panel = PanelState::new(2);
        write_groups(&mut panel, &PositionGroups::single("pwm", vec![10, 20]));
        assert_eq!(panel.channel_value(0), 10.0);
        assert_eq!(panel.slider_value(1), Some(20.0));
    }

    #[test]
    fn write_groups_ignores_unknown_keys_and_extra_values() {
        let mut panel = PanelState::new(1);
        write_groups(&mut panel, &PositionGroups::single("angle", vec![99]));
        assert_eq!(panel.channel_value(0), NEUTRAL_PWM);

        write_groups(&mut panel, &PositionGroups::single("pwm", vec![800, 900, 1000]));
        assert_eq!(panel.channel_value(0), 800.0);
    }

    #[test]
    fn write_is_idempotent() {
        let mut panel = PanelState::new(1);
        let update = PositionGroups::single("pwm", vec![1234]);
        write_groups(&mut panel, &update);
        write_groups(&mut panel, &update);
        assert_eq!(read_snapshot(&panel).unwrap(), vec![1234]);
    }
}
