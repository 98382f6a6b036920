//! Page/button configuration: JSON model and the mutable in-memory store.
//!
//! The file format is an array of pages, each holding key configs:
//!
//! ```json
//! {
//!   "pages": [
//!     {
//!       "page_number": 1,
//!       "home_page": true,
//!       "keys": [
//!         {
//!           "button": 0,
//!           "primary_icon": "terminal.png",
//!           "primary_label": "Term",
//!           "action": "x-terminal-emulator &"
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! The file is parsed and validated once at startup and never written back.
//! The store is keyed by (page number, button index) and exposes mutation of
//! a key's active icon/label, which tracks the last rendered state.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One key's configuration within a page.
///
/// `active_icon`/`active_label` are the mutable slots: they reflect whatever
/// was last rendered for this key. If the file doesn't set them they
/// initialize from the primary slot at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyConfig {
    pub button: u8,
    pub primary_icon: String,
    #[serde(default)]
    pub primary_label: String,
    #[serde(default)]
    pub secondary_icon: String,
    #[serde(default)]
    pub secondary_label: String,
    #[serde(default)]
    pub toggle: bool,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub display_page: Option<u32>,
    #[serde(default)]
    pub active_icon: String,
    #[serde(default)]
    pub active_label: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawPage {
    page_number: u32,
    #[serde(default)]
    home_page: bool,
    #[serde(default)]
    keys: Vec<KeyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    pages: Vec<RawPage>,
}

/// A validated page: its number, home flag, and keys indexed by button.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub home: bool,
    keys: BTreeMap<u8, KeyConfig>,
}

impl Page {
    /// Iterate configured keys in button order.
    pub fn keys(&self) -> impl Iterator<Item = &KeyConfig> {
        self.keys.values()
    }

    pub fn key(&self, button: u8) -> Option<&KeyConfig> {
        self.keys.get(&button)
    }
}

/// In-memory store of all pages, keyed by page number.
///
/// Cloning the store gives an independent copy; each opened deck gets its own
/// so toggle/active state is tracked per device.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    pages: BTreeMap<u32, Page>,
    home_page: u32,
}

impl ConfigStore {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::ConfigNotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let store = Self::from_json(&text)?;
        debug!(path = %path.display(), pages = store.pages.len(), "configuration loaded");
        Ok(store)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(text).map_err(|e| Error::ConfigInvalid(e.to_string()))?;

        if raw.pages.is_empty() {
            return Err(Error::ConfigInvalid("no pages defined".into()));
        }

        let mut pages = BTreeMap::new();
        let mut home_page = None;

        for page in raw.pages {
            if page.home_page {
                if home_page.is_some() {
                    return Err(Error::ConfigInvalid(
                        "more than one page marked home_page".into(),
                    ));
                }
                home_page = Some(page.page_number);
            }

            let mut keys = BTreeMap::new();
            for mut key in page.keys {
                // The active slot starts out mirroring the primary slot.
                if key.active_icon.is_empty() {
                    key.active_icon = key.primary_icon.clone();
                }
                if key.active_label.is_empty() {
                    key.active_label = key.primary_label.clone();
                }
                if keys.insert(key.button, key).is_some() {
                    return Err(Error::ConfigInvalid(format!(
                        "duplicate button on page {}",
                        page.page_number
                    )));
                }
            }

            let number = page.page_number;
            let validated = Page {
                number,
                home: page.home_page,
                keys,
            };
            if pages.insert(number, validated).is_some() {
                return Err(Error::ConfigInvalid(format!(
                    "duplicate page number {number}"
                )));
            }
        }

        let home_page = home_page
            .ok_or_else(|| Error::ConfigInvalid("no page marked home_page".into()))?;

        Ok(Self { pages, home_page })
    }

    /// Page number of the home page.
    pub fn home_page(&self) -> u32 {
        self.home_page
    }

    pub fn page(&self, number: u32) -> Result<&Page> {
        self.pages.get(&number).ok_or(Error::PageNotFound(number))
    }

    /// Key config lookup; `None` when the key isn't configured on that page.
    pub fn key(&self, page: u32, button: u8) -> Option<&KeyConfig> {
        self.pages.get(&page).and_then(|p| p.key(button))
    }

    /// Record the icon/label that were just rendered for a key.
    pub fn set_active(&mut self, page: u32, button: u8, icon: String, label: String) -> Result<()> {
        let key = self
            .pages
            .get_mut(&page)
            .ok_or(Error::PageNotFound(page))?
            .keys
            .get_mut(&button)
            .ok_or(Error::KeyNotFound { page, button })?;
        key.active_icon = icon;
        key.active_label = label;
        Ok(())
    }
}
