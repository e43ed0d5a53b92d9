use servo_deck_protocol::Frame;

use crate::textbuf::{self, SequenceTextError};

/// Validated timing parameters for one frame, captured from the panel's
/// dedicated inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub speed: i32,
    pub sleep: i32,
    pub sleep_before: i32,
    pub match_speed: bool,
}

/// The in-memory sequence and its serialized text buffer, owned as one unit.
///
/// Every mutator leaves the pair mutually consistent before returning — with
/// one deliberate exception: [`set_buffer`](Self::set_buffer) models the
/// operator hand-editing the text area, and the model only catches up on the
/// next [`load_from_buffer`](Self::load_from_buffer).
#[derive(Debug, Default)]
pub struct SequenceEditor {
    frames: Vec<Frame>,
    buffer: String,
}

impl SequenceEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The serialized text, one comma-terminated record per line.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Replace the raw text, as the operator does when editing the text
    /// area. The in-memory sequence is untouched until the next load.
    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Append a new frame built from a captured snapshot and timing inputs.
    ///
    /// The frame number is the pre-append length of the sequence. Returns
    /// the assigned number. The buffer is extended first, so an encode
    /// failure leaves both halves unchanged.
    pub fn add(
        &mut self,
        target_pwm: Vec<i32>,
        timing: FrameTiming,
    ) -> Result<u32, SequenceTextError> {
        let frame = Frame {
            frame: self.frames.len() as u32,
            target_pwm,
            speed: timing.speed,
            sleep: timing.sleep,
            sleep_before: timing.sleep_before,
            match_speed: timing.match_speed,
        };
        textbuf::append_record(&mut self.buffer, &frame)?;
        let number = frame.frame;
        self.frames.push(frame);
        Ok(number)
    }

    /// Empty both the sequence and the buffer. Idempotent.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.buffer.clear();
    }

    /// Re-derive the sequence from the current buffer text, replacing it
    /// wholesale. On parse failure the sequence is left unchanged; callers
    /// log and carry on (best-effort by design). Returns the frame count.
    pub fn load_from_buffer(&mut self) -> Result<usize, SequenceTextError> {
        let frames = textbuf::parse_records(&self.buffer)?;
        let count = frames.len();
        self.frames = frames;
        Ok(count)
    }

    /// Rebuild from frames the controller sent back for a saved file.
    ///
    /// Clears, re-serializes each frame through the normal append path, then
    /// re-parses the buffer — so remote-origin and locally-typed sequences
    /// go through the same normalization. Embedded frame numbers are kept
    /// as-is, not renumbered.
    pub fn replace_from_remote(&mut self, frames: &[Frame]) -> Result<usize, SequenceTextError> {
        self.clear();
        for frame in frames {
            textbuf::append_record(&mut self.buffer, frame)?;
        }
        self.load_from_buffer()
    }
}
