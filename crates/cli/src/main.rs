mod sim;

use anyhow::Result;
use servo_deck_core::{Deck, PanelState, QueuedTransport};
use sim::SimController;

const CHANNELS: usize = 6;

/// Forward queued outbound frames to the simulated controller and route its
/// replies back in, until both sides go quiet.
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
            log::debug!("deck -> sim: {frame}");
            for reply in sim.handle(&frame) {
                log::debug!("sim -> deck: {reply}");
                deck.on_message(&reply);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut sim = SimController::new(CHANNELS);
    let mut deck = Deck::new(PanelState::new(CHANNELS));

    deck.connect(QueuedTransport::new());
    deck.on_open();
    deck.on_message(&sim.hello());
    log::info!("connected; link state {:?}", deck.link_state());

    // Nudge a couple of channels and record a short sequence.
    deck.set_channel(0, 1200)?;
    deck.set_channel(1, 1750)?;
    pump(&mut deck, &mut sim);
    let first = deck.add_frame()?;

    deck.set_channel(0, 1800)?;
    pump(&mut deck, &mut sim);
    let second = deck.add_frame()?;
    log::info!("recorded frames {first} and {second}");
    log::info!("sequence text:\n{}", deck.editor().buffer());

    // Persist on the controller, wipe locally, load it back.
    deck.save_file("demo")?;
    pump(&mut deck, &mut sim);
    deck.clear_sequence();
    deck.load_file("demo.seq")?;
    pump(&mut deck, &mut sim);
    log::info!("reloaded {} frames from the controller", deck.editor().len());

    // Play it twice; the sim reports positions after every frame.
    deck.run(2)?;
    pump(&mut deck, &mut sim);
    log::info!("controller finished at {:?}", sim.positions());

    Ok(())
}
