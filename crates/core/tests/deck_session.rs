//! Scenario tests: drive a full `Deck` through recording, saving, and the
//! simulated controller replies the protocol defines, asserting on the wire
//! frames and the resulting state.

use servo_deck_core::panel::RawTiming;
use servo_deck_core::{Deck, LinkState, PanelState, QueuedTransport};

fn connected_deck(channels: usize) -> Deck<PanelState, QueuedTransport> {
    let mut deck = Deck::new(PanelState::new(channels));
    deck.connect(QueuedTransport::new());
    deck.on_open();
    assert_eq!(deck.link_state(), LinkState::Connected);
    // Swallow nothing: the transport starts empty.
    assert!(deck.transport_mut().unwrap().is_empty());
    deck
}

fn drain(deck: &mut Deck<PanelState, QueuedTransport>) -> Vec<serde_json::Value> {
    deck.transport_mut()
        .map(QueuedTransport::drain)
        .unwrap_or_default()
        .iter()
        .map(|raw| serde_json::from_str(raw).unwrap())
        .collect()
}

#[test]
fn manual_update_sends_exactly_one_update() {
    let mut deck = connected_deck(3);
    deck.set_channel(1, 77).unwrap();

    let sent = drain(&mut deck);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["cmd"], "Update");
    // Changed channel reflected, the others at their previous values.
    assert_eq!(sent[0]["body"]["target_pwm"][1], 77);
    assert_eq!(sent[0]["body"]["target_pwm"][0], 1500);
    assert_eq!(sent[0]["body"]["target_pwm"][2], 1500);
}

#[test]
fn inbound_update_position_writes_channels() {
    let mut deck = connected_deck(2);
    deck.on_message(r#"{"cmd":"updatePosition","param":{"pwm":[10,20]}}"#);
    assert_eq!(deck.panel().slider_value(0), Some(10.0));
    assert_eq!(deck.panel().slider_value(1), Some(20.0));
}

#[test]
fn unknown_cmd_and_malformed_json_change_nothing() {
    let mut deck = connected_deck(2);
    deck.set_channel(0, 900).unwrap();
    drain(&mut deck);
    let buffer_before = deck.editor().buffer().to_string();

    deck.on_message(r#"{"cmd":"Reboot","param":{"pwm":[1,2]}}"#);
    deck.on_message("{ not json");

    assert_eq!(deck.link_state(), LinkState::Connected);
    assert_eq!(deck.panel().slider_value(0), Some(900.0));
    assert_eq!(deck.editor().buffer(), buffer_before);
    assert!(drain(&mut deck).is_empty());
}

#[test]
fn save_then_load_roundtrips_the_sequence() {
    let mut deck = connected_deck(2);
    deck.panel_mut().set_timing(RawTiming {
        speed: 25.0,
        sleep: 1.0,
        sleep_before: 0.0,
        match_speed: true,
    });

    // Record two frames at [1,2] and [3,4].
    deck.panel_mut().move_slider(0, 1.0);
    deck.panel_mut().move_slider(1, 2.0);
    assert_eq!(deck.add_frame().unwrap(), 0);
    deck.panel_mut().move_slider(0, 3.0);
    deck.panel_mut().move_slider(1, 4.0);
    assert_eq!(deck.add_frame().unwrap(), 1);
    let recorded = deck.editor().frames().to_vec();

    deck.save_file("seqA").unwrap();
    let sent = drain(&mut deck);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["cmd"], "SaveFile");
    assert_eq!(sent[0]["filename"], "seqA");
    assert_eq!(sent[0]["body"].as_array().unwrap().len(), 2);
    assert_eq!(sent[0]["body"][0]["target_pwm"][0], 1);
    assert_eq!(sent[0]["body"][1]["target_pwm"][1], 4);

    // The controller stores the raw SaveFile message and replays it as the
    // Loadfile reply.
    deck.clear_sequence();
    assert!(deck.editor().is_empty());
    let reply = serde_json::json!({"cmd": "FromLoadedFile", "param": sent[0]});
    deck.on_message(&reply.to_string());

    assert_eq!(deck.editor().frames(), recorded.as_slice());
}

#[test]
fn run_carries_the_sequence_and_cycle_count() {
    let mut deck = connected_deck(1);
    deck.add_frame().unwrap();
    deck.run(3).unwrap();

    let sent = drain(&mut deck);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["cmd"], "Run");
    assert_eq!(sent[0]["number_of_times"], 3);
    assert_eq!(sent[0]["body"].as_array().unwrap().len(), 1);
}

#[test]
fn sends_while_disconnected_are_guarded_errors() {
    let mut deck: Deck<PanelState, QueuedTransport> = Deck::new(PanelState::new(1));
    assert!(deck.manual_update().is_err());
    assert!(deck.run(1).is_err());

    deck.connect(QueuedTransport::new());
    deck.on_open();
    deck.on_close();
    assert_eq!(deck.link_state(), LinkState::Disconnected);
    assert!(deck.save_file("x").is_err());
}

#[test]
fn nan_input_rejects_the_capture_and_keeps_the_sequence() {
    let mut deck = connected_deck(2);
    deck.add_frame().unwrap();
    deck.panel_mut().type_value(0, f64::NAN);
    assert!(deck.add_frame().is_err());
    assert_eq!(deck.editor().len(), 1);
}
