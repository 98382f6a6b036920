//! Per-deck session: current page, page painting and key transitions.
//!
//! One session exists per opened deck and is owned by that deck's dispatch
//! thread, so all mutation of the page pointer and the active key state is
//! single-threaded. Device writes go through the shared deck lock.

use crate::action;
use crate::config::ConfigStore;
use crate::device::SharedDeck;
use crate::error::{Error, Result};
use crate::render::KeyRenderer;
use crate::style;
use std::path::PathBuf;
use std::sync::MutexGuard;
use tracing::{debug, info, warn};

/// Which key indices a page paint touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySelection {
    /// Only the keys configured on the page.
    Configured,
    /// Every physical key index; unconfigured keys are skipped silently.
    AllPhysical,
}

/// Outcome of a press dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// The exit key was pressed; the deck has been cleared and the dispatch
    /// loop should end.
    Shutdown,
}

pub struct Session {
    deck: SharedDeck,
    store: ConfigStore,
    renderer: Box<dyn KeyRenderer>,
    assets_root: PathBuf,
    current_page: u32,
    key_count: u8,
    key_size: (u32, u32),
}

impl Session {
    pub fn new(
        deck: SharedDeck,
        store: ConfigStore,
        renderer: Box<dyn KeyRenderer>,
        assets_root: PathBuf,
    ) -> Result<Self> {
        let (key_count, key_size) = {
            let guard = lock(&deck)?;
            (guard.key_count(), guard.key_image_size())
        };
        let current_page = store.home_page();
        Ok(Self {
            deck,
            store,
            renderer,
            assets_root,
            current_page,
            key_count,
            key_size,
        })
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn key_count(&self) -> u8 {
        self.key_count
    }

    /// The last physical key terminates the process when pressed.
    pub fn exit_key(&self) -> u8 {
        self.key_count.saturating_sub(1)
    }

    /// First paint after the device was opened (and therefore just cleared):
    /// walk every physical key index of the home page.
    pub fn paint_home(&mut self) -> Result<()> {
        self.paint_page(self.store.home_page(), false, KeySelection::AllPhysical)
    }

    /// Navigate to a page: clear the deck, then paint its configured keys.
    pub fn load_page(&mut self, page: u32) -> Result<()> {
        self.paint_page(page, true, KeySelection::Configured)
    }

    /// The one page paint routine. Fails fast with [`Error::PageNotFound`];
    /// per-key failures are logged and skip just that key. Updates the
    /// current page pointer on success.
    pub fn paint_page(&mut self, page: u32, clear_first: bool, selection: KeySelection) -> Result<()> {
        let buttons: Vec<u8> = match selection {
            KeySelection::Configured => self.store.page(page)?.keys().map(|k| k.button).collect(),
            KeySelection::AllPhysical => {
                self.store.page(page)?;
                (0..self.key_count).collect()
            }
        };

        if clear_first {
            lock(&self.deck)?.clear_all()?;
        }

        for button in buttons {
            if let Err(e) = self.update_key(page, button, false) {
                warn!(page, button, error = %e, "skipping key");
            }
        }

        info!(page, "page painted");
        self.current_page = page;
        Ok(())
    }

    /// Resolve, render and push one key, then record the rendered icon/label
    /// as the key's active state. Unconfigured keys and keys without a
    /// displayable icon are skipped silently.
    pub fn update_key(&mut self, page: u32, button: u8, pressed: bool) -> Result<()> {
        let Some(key) = self.store.key(page, button) else {
            return Ok(());
        };
        let Some(resolved) = style::resolve(key, pressed, &self.assets_root) else {
            return Ok(());
        };

        debug!(page, button, icon = %resolved.icon.display(), "updating key");
        let image = self
            .renderer
            .render(&resolved.icon, &resolved.label, self.key_size)?;
        lock(&self.deck)?.set_key_image(button, image)?;

        self.store
            .set_active(page, button, resolved.icon_string(), resolved.label)
    }

    /// Press transition: apply the pressed image, fire the action, follow
    /// page navigation, then check for the exit key. A failing step aborts
    /// the remaining ones for this press; the dispatcher logs and carries on.
    pub fn handle_press(&mut self, button: u8) -> Result<Dispatch> {
        self.update_key(self.current_page, button, true)?;

        let key = self.store.key(self.current_page, button).cloned();
        if let Some(key) = key {
            if let Some(command) = &key.action {
                info!(button, %command, "running action");
                action::spawn_detached(command)?;
            }
            if let Some(target) = key.display_page {
                info!(button, target, "switching page");
                self.load_page(target)?;
            }
        }

        if button == self.exit_key() {
            info!(button, "exit key pressed, shutting down");
            lock(&self.deck)?.clear_all()?;
            return Ok(Dispatch::Shutdown);
        }
        Ok(Dispatch::Continue)
    }

    /// Release transition: nothing happens; actions are press-only.
    pub fn handle_release(&mut self, button: u8) -> Result<Dispatch> {
        debug!(button, "released");
        Ok(Dispatch::Continue)
    }

    /// Best-effort clear, used on external shutdown (SIGINT).
    pub fn clear(&self) -> Result<()> {
        lock(&self.deck)?.clear_all()
    }

    pub fn deck(&self) -> &SharedDeck {
        &self.deck
    }
}

fn lock(deck: &SharedDeck) -> Result<MutexGuard<'_, Box<dyn crate::device::Deck>>> {
    deck.lock()
        .map_err(|_| Error::DeviceIoFailed("deck lock poisoned".into()))
}
