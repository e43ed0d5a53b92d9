use servo_deck_protocol::commands::TargetVector;
use servo_deck_protocol::{Event, Request};
use thiserror::Error;

use crate::channel::{ChannelError, ControlChannel, LinkState, Transport};
use crate::panel::{self, CaptureError, ControlPanel};
use crate::sequence::SequenceEditor;
use crate::textbuf::SequenceTextError;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    SequenceText(#[from] SequenceTextError),
}

/// The composition root: one panel, one sequence editor, one control
/// channel, owned together so there is no ambient shared state.
///
/// Operator actions come in as method calls from the host UI; inbound wire
/// frames come in through [`on_message`](Self::on_message). The execution
/// model is single-threaded and event-driven — no two operations run
/// concurrently, and every mutator finishes before the next event is
/// handled, so the editor's model/buffer pair is never observed mid-change.
#[derive(Debug)]
pub struct Deck<P: ControlPanel, T: Transport> {
    panel: P,
    editor: SequenceEditor,
    channel: ControlChannel<T>,
}

impl<P: ControlPanel, T: Transport> Deck<P, T> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            editor: SequenceEditor::new(),
            channel: ControlChannel::new(),
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn editor(&self) -> &SequenceEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut SequenceEditor {
        &mut self.editor
    }

    pub fn link_state(&self) -> LinkState {
        self.channel.state()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.channel.transport_mut()
    }

    // --- connection lifecycle (socket owned by the host) ---

    pub fn connect(&mut self, transport: T) {
        self.channel.start(transport);
    }

    pub fn on_open(&mut self) {
        self.channel.on_open();
    }

    pub fn on_close(&mut self) {
        self.channel.on_close();
    }

    // --- operator actions ---

    /// Send the current panel positions as a live `Update`. Fired on every
    /// slider or position-input change.
    pub fn manual_update(&mut self) -> Result<(), DeckError> {
        let target_pwm = panel::read_snapshot(&self.panel)?;
        self.channel.send(&Request::Update {
            body: TargetVector { target_pwm },
        })?;
        Ok(())
    }

    /// Write one channel and emit the single `Update` that follows, the way
    /// a slider drag does.
    pub fn set_channel(&mut self, channel: usize, value: i32) -> Result<(), DeckError> {
        self.panel.set_channel(channel, value);
        self.manual_update()
    }

    /// Capture the panel into a new frame at the end of the sequence.
    /// Returns the assigned frame number.
    pub fn add_frame(&mut self) -> Result<u32, DeckError> {
        let target_pwm = panel::read_snapshot(&self.panel)?;
        let timing = self.panel.timing().validate()?;
        Ok(self.editor.add(target_pwm, timing)?)
    }

    pub fn clear_sequence(&mut self) {
        self.editor.clear();
    }

    /// Re-derive the sequence from the (possibly hand-edited) text buffer.
    /// Parse failures are logged and the last good sequence kept; the
    /// operator's manual control is never interrupted.
    pub fn load_sequence(&mut self) {
        if let Err(err) = self.editor.load_from_buffer() {
            log::warn!("sequence text did not parse, keeping current sequence: {err}");
        }
    }

    /// Persist the current sequence under a name on the controller.
    pub fn save_file(&mut self, filename: &str) -> Result<(), DeckError> {
        self.channel.send(&Request::SaveFile {
            body: self.editor.frames().to_vec(),
            filename: filename.trim().to_string(),
        })?;
        Ok(())
    }

    /// Ask the controller for a previously saved sequence. The reply
    /// arrives later as a `FromLoadedFile` message; there is no
    /// request/response pairing beyond that.
    pub fn load_file(&mut self, filename: &str) -> Result<(), DeckError> {
        self.channel.send(&Request::Loadfile {
            filename: filename.trim().to_string(),
        })?;
        Ok(())
    }

    /// Request playback of the current sequence.
    pub fn run(&mut self, number_of_times: u32) -> Result<(), DeckError> {
        self.channel.send(&Request::Run {
            body: self.editor.frames().to_vec(),
            number_of_times,
        })?;
        Ok(())
    }

    // --- inbound dispatch ---

    /// Route one raw inbound frame. Malformed JSON and unknown commands are
    /// logged and dropped; the channel stays open and no state changes.
    pub fn on_message(&mut self, raw: &str) {
        let event = match serde_json::from_str::<Event>(raw) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("dropping inbound message ({err}): {raw}");
                return;
            }
        };
        match event {
            Event::UpdatePosition(groups) => {
                panel::write_groups(&mut self.panel, &groups);
            }
            Event::FromLoadedFile(file) => {
                match self.editor.replace_from_remote(&file.body) {
                    Ok(count) => {
                        log::info!(
                            "loaded {count} frames from {}",
                            file.filename.as_deref().unwrap_or("<unnamed>")
                        );
                    }
                    Err(err) => {
                        log::warn!("could not rebuild sequence from loaded file: {err}");
                    }
                }
            }
        }
    }
}
