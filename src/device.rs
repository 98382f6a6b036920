//! Deck device access: a narrow trait over the HID transport, plus the
//! `elgato-streamdeck` backed implementation and device discovery.
//!
//! All writes against one deck are serialized through the [`SharedDeck`]
//! mutex; the dispatcher's input polling takes the same lock so paint
//! batches and reads never interleave on the wire.

use crate::error::{Error, Result};
use elgato_streamdeck::info::Kind;
use elgato_streamdeck::{StreamDeck, StreamDeckInput};
use hidapi::HidApi;
use image::DynamicImage;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

/// Narrow interface over one opened deck.
pub trait Deck: Send {
    /// Number of physical keys.
    fn key_count(&self) -> u8;

    /// Pixel geometry of one key's display.
    fn key_image_size(&self) -> (u32, u32);

    fn set_brightness(&self, percent: u8) -> Result<()>;

    /// Push a rendered bitmap to a key; conversion to the deck's native
    /// format happens behind this call.
    fn set_key_image(&self, key: u8, image: DynamicImage) -> Result<()>;

    /// Clear every key image.
    fn clear_all(&self) -> Result<()>;

    /// Poll for a button state report. `Ok(None)` on timeout or on input
    /// kinds that aren't button transitions (touch, encoders).
    fn poll_buttons(&self, timeout: Duration) -> Result<Option<Vec<bool>>>;
}

/// Shared handle to a deck; lock scope delimits one batch of device I/O.
pub type SharedDeck = Arc<Mutex<Box<dyn Deck>>>;

/// List connected decks that can display key images. Pedals have no screens.
pub fn discover(hidapi: &HidApi) -> Vec<(Kind, String)> {
    elgato_streamdeck::list_devices(hidapi)
        .into_iter()
        .filter(|(kind, _)| !matches!(kind, Kind::Pedal))
        .collect()
}

/// Open a deck, log its identity and clear whatever it was showing.
pub fn open(hidapi: &HidApi, kind: Kind, serial: &str) -> Result<ElgatoDeck> {
    let deck = StreamDeck::connect(hidapi, kind, serial)
        .map_err(|e| Error::DeviceIoFailed(e.to_string()))?;

    let product = deck.product().unwrap_or_else(|_| "unknown".into());
    let firmware = deck.firmware_version().unwrap_or_else(|_| "unknown".into());
    info!(%product, %serial, %firmware, keys = kind.key_count(), "opened deck");

    let deck = ElgatoDeck { deck, kind };
    deck.clear_all()?;
    Ok(deck)
}

/// Production deck backed by `elgato-streamdeck`.
pub struct ElgatoDeck {
    deck: StreamDeck,
    kind: Kind,
}

impl Deck for ElgatoDeck {
    fn key_count(&self) -> u8 {
        self.kind.key_count()
    }

    fn key_image_size(&self) -> (u32, u32) {
        let (w, h) = self.kind.key_image_format().size;
        (w as u32, h as u32)
    }

    fn set_brightness(&self, percent: u8) -> Result<()> {
        self.deck
            .set_brightness(percent)
            .map_err(|e| Error::DeviceIoFailed(e.to_string()))
    }

    fn set_key_image(&self, key: u8, image: DynamicImage) -> Result<()> {
        self.deck
            .set_button_image(key, image)
            .map_err(|e| Error::DeviceIoFailed(e.to_string()))
    }

    fn clear_all(&self) -> Result<()> {
        self.deck
            .clear_all_button_images()
            .map_err(|e| Error::DeviceIoFailed(e.to_string()))
    }

    fn poll_buttons(&self, timeout: Duration) -> Result<Option<Vec<bool>>> {
        match self
            .deck
            .read_input(Some(timeout))
            .map_err(|e| Error::DeviceIoFailed(e.to_string()))?
        {
            StreamDeckInput::ButtonStateChange(states) => Ok(Some(states)),
            _ => Ok(None),
        }
    }
}

/// Wrap an opened deck for sharing between the paint path and the poll loop.
pub fn share(deck: impl Deck + 'static) -> SharedDeck {
    Arc::new(Mutex::new(Box::new(deck)))
}
