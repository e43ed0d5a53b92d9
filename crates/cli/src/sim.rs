//! An in-memory stand-in for the controller device: a position vector, a
//! named sequence-file store, and handlers for the four deck commands.
//! Replies come back as raw wire frames for the host loop to feed to
//! `Deck::on_message`, the way socket messages would.

use std::collections::HashMap;

use servo_deck_protocol::events::PositionGroups;
use servo_deck_protocol::{Event, Request, SequenceFile};

const SEQ_EXTENSION: &str = ".seq";

pub struct SimController {
    positions: Vec<i32>,
    speeds: Vec<i32>,
    files: HashMap<String, SequenceFile>,
}

impl SimController {
    pub fn new(channel_count: usize) -> Self {
        Self {
            positions: vec![1500; channel_count],
            speeds: vec![0; channel_count],
            files: HashMap::new(),
        }
    }

    pub fn positions(&self) -> &[i32] {
        &self.positions
    }

    /// The message the device sends as soon as a client connects: its
    /// current positions.
    pub fn hello(&self) -> String {
        self.position_report()
    }

    /// Handle one raw frame from the deck; returns the reply frames, in
    /// order. Messages the device does not understand are logged and
    /// ignored, mirroring the deck's own policy.
    pub fn handle(&mut self, raw: &str) -> Vec<String> {
        let request = match serde_json::from_str::<Request>(raw) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("sim: ignoring message ({err}): {raw}");
                return Vec::new();
            }
        };
        match request {
            Request::Update { body } => {
                self.move_to(&body.target_pwm);
                Vec::new()
            }
            Request::SaveFile { body, filename } => {
                let name = normalize_name(&filename);
                log::info!("sim: saving {} frames to {name}", body.len());
                self.files.insert(
                    name.clone(),
                    SequenceFile {
                        body,
                        filename: Some(name),
                    },
                );
                Vec::new()
            }
            Request::Loadfile { filename } => {
                let name = normalize_name(&filename);
                match self.files.get(&name) {
                    Some(file) => match encode(&Event::FromLoadedFile(file.clone())) {
                        Some(reply) => vec![reply],
                        None => Vec::new(),
                    },
                    None => {
                        log::warn!("sim: no such file {name}");
                        Vec::new()
                    }
                }
            }
            Request::Run {
                body,
                number_of_times,
            } => {
                log::info!("sim: running {} frames x{number_of_times}", body.len());
                let mut replies = Vec::new();
                for _ in 0..number_of_times {
                    for frame in &body {
                        log::debug!(
                            "sim: frame {} (sleep_before {}, sleep {}, match_speed {})",
                            frame.frame,
                            frame.sleep_before,
                            frame.sleep,
                            frame.match_speed
                        );
                        for speed in &mut self.speeds {
                            *speed = frame.speed;
                        }
                        self.move_to(&frame.target_pwm);
                        replies.push(self.position_report());
                    }
                }
                replies.retain(|r| !r.is_empty());
                replies
            }
        }
    }

    fn move_to(&mut self, target: &[i32]) {
        for (slot, &value) in self.positions.iter_mut().zip(target) {
            *slot = value;
        }
    }

    fn position_report(&self) -> String {
        encode(&Event::UpdatePosition(PositionGroups::single(
            "pwm",
            self.positions.clone(),
        )))
        .unwrap_or_default()
    }
}

/// Saved names always carry the `.seq` extension, appended when missing.
fn normalize_name(filename: &str) -> String {
    let trimmed = filename.trim();
    if trimmed.ends_with(SEQ_EXTENSION) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{SEQ_EXTENSION}")
    }
}

fn encode(event: &Event) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(err) => {
            log::warn!("sim: could not encode reply: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servo_deck_core::{Deck, LinkState, PanelState, QueuedTransport};

    fn pump(deck: &mut Deck<PanelState, QueuedTransport>, sim: &mut SimController) {
        loop {
            let outbound = deck
                .transport_mut()
                .map(QueuedTransport::drain)
                .unwrap_or_default();
            if outbound.is_empty() {
                return;
            }
            for frame in outbound {
                for reply in sim.handle(&frame) {
                    deck.on_message(&reply);
                }
            }
        }
    }

    #[test]
    fn normalizes_file_names() {
        assert_eq!(normalize_name("wave"), "wave.seq");
        assert_eq!(normalize_name(" wave.seq "), "wave.seq");
    }

    #[test]
    fn end_to_end_record_save_clear_load() {
        let mut sim = SimController::new(3);
        let mut deck = Deck::new(PanelState::new(3));
        deck.connect(QueuedTransport::new());
        deck.on_open();
        deck.on_message(&sim.hello());
        assert_eq!(deck.link_state(), LinkState::Connected);

        deck.set_channel(0, 1200).unwrap();
        deck.add_frame().unwrap();
        deck.set_channel(0, 1800).unwrap();
        deck.add_frame().unwrap();
        pump(&mut deck, &mut sim);
        assert_eq!(sim.positions()[0], 1800);

        let recorded = deck.editor().frames().to_vec();
        deck.save_file("demo").unwrap();
        pump(&mut deck, &mut sim);

        deck.clear_sequence();
        assert!(deck.editor().is_empty());

        deck.load_file("demo.seq").unwrap();
        pump(&mut deck, &mut sim);
        assert_eq!(deck.editor().frames(), recorded.as_slice());
    }

    #[test]
    fn run_reports_positions_per_frame() {
        let mut sim = SimController::new(2);
        let mut deck = Deck::new(PanelState::new(2));
        deck.connect(QueuedTransport::new());
        deck.on_open();

        deck.set_channel(0, 1000).unwrap();
        deck.add_frame().unwrap();
        deck.set_channel(0, 2000).unwrap();
        deck.add_frame().unwrap();
        deck.run(2).unwrap();
        pump(&mut deck, &mut sim);

        // Playback ends on the last frame of the last cycle.
        assert_eq!(sim.positions(), &[2000, 1500]);
    }

    #[test]
    fn missing_file_is_ignored() {
        let mut sim = SimController::new(1);
        let replies = sim.handle(r#"{"id":"button","cmd":"Loadfile","filename":"nope"}"#);
        assert!(replies.is_empty());
    }
}
