//! Per-deck event dispatch loop.
//!
//! Each opened deck gets one thread running [`run`]. The loop polls the deck
//! for button state reports with a short timeout under the device lock, so
//! paint writes from the same session interleave between polls, then diffs
//! against the previous state vector and dispatches press/release
//! transitions in key order. Dispatch errors are logged and the loop keeps
//! going; only the exit key or an external shutdown ends it.

use crate::controller::{Dispatch, Session};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Backoff after a failed poll so a wedged device doesn't spin the loop.
const POLL_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Key transitions between two button state vectors, in key order.
fn transitions(previous: &[bool], current: &[bool]) -> Vec<(u8, bool)> {
    current
        .iter()
        .enumerate()
        .filter(|(i, pressed)| previous.get(*i).copied().unwrap_or(false) != **pressed)
        .map(|(i, pressed)| (i as u8, *pressed))
        .collect()
}

/// Run the dispatch loop until the exit key is pressed or `shutdown` is set.
pub fn run(mut session: Session, shutdown: Arc<AtomicBool>) {
    if let Err(e) = session.paint_home() {
        error!(error = %e, "failed to paint home page");
        return;
    }

    let mut previous = vec![false; session.key_count() as usize];

    while !shutdown.load(Ordering::Relaxed) {
        let polled = match session.deck().lock() {
            Ok(deck) => deck.poll_buttons(POLL_TIMEOUT),
            Err(_) => {
                error!("deck lock poisoned, stopping dispatch");
                return;
            }
        };

        match polled {
            Ok(Some(states)) => {
                for (button, pressed) in transitions(&previous, &states) {
                    debug!(button, pressed, "button transition");
                    let outcome = if pressed {
                        session.handle_press(button)
                    } else {
                        session.handle_release(button)
                    };
                    match outcome {
                        Ok(Dispatch::Shutdown) => return,
                        Ok(Dispatch::Continue) => {}
                        Err(e) => warn!(button, error = %e, "dispatch failed"),
                    }
                }
                previous = states;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "input poll failed");
                thread::sleep(POLL_RETRY_DELAY);
            }
        }
    }

    // Stopped externally: leave the deck blank.
    if let Err(e) = session.clear() {
        debug!(error = %e, "clear on shutdown failed");
    }
}

/// Spawn the dispatch loop on its own thread.
pub fn spawn(session: Session, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || run(session, shutdown))
}
