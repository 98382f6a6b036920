//! pagedeck CLI
//!
//! Opens every connected visual Stream Deck, paints the configured home page
//! and dispatches key presses until the exit key (last physical key) is hit
//! on each deck, or SIGINT arrives.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use pagedeck::device::Deck;
use pagedeck::{device, dispatch, ConfigStore, IconLabelRenderer, Session, ASSETS_DIR};

mod cli;
use cli::Cli;

/// Initial screen brightness, percent.
const STARTUP_BRIGHTNESS: u8 = 30;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pagedeck=info".parse().unwrap()),
        )
        .init();

    let store = ConfigStore::load(&cli.config)?;
    let assets_root = cli
        .config
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(ASSETS_DIR);

    let hidapi = elgato_streamdeck::new_hidapi().context("failed to initialize HID API")?;
    let found = device::discover(&hidapi);
    info!("found {} visual Stream Deck(s)", found.len());
    if found.is_empty() {
        anyhow::bail!("no Stream Deck with key displays found");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let mut handles = Vec::new();

    for (kind, serial) in found {
        let deck = match device::open(&hidapi, kind, &serial) {
            Ok(deck) => deck,
            Err(e) => {
                warn!(%serial, error = %e, "skipping deck");
                continue;
            }
        };
        if let Err(e) = deck.set_brightness(STARTUP_BRIGHTNESS) {
            warn!(%serial, error = %e, "failed to set brightness");
        }

        let shared = device::share(deck);
        let renderer = Box::new(IconLabelRenderer::new(&assets_root));
        let session = Session::new(shared, store.clone(), renderer, assets_root.clone())?;
        handles.push(dispatch::spawn(session, shutdown.clone()));
    }

    if handles.is_empty() {
        anyhow::bail!("could not open any Stream Deck");
    }

    // SIGINT stops every dispatch loop; each clears its deck on the way out.
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install signal handler")?;

    // Block until every deck is closed; the exit key on each deck is the
    // normal termination path.
    for handle in handles {
        let _ = handle.join();
    }
    info!("all decks closed, exiting");
    Ok(())
}
