// pagedeck - Stream Deck page controller
// Config resolution, key rendering and per-deck event dispatch

pub mod action;
pub mod config;
pub mod controller;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod render;
pub mod style;

pub use config::{ConfigStore, KeyConfig, Page};
pub use controller::{Dispatch, KeySelection, Session};
pub use device::{Deck, SharedDeck};
pub use error::{Error, Result};
pub use render::{IconLabelRenderer, KeyRenderer};
pub use style::KeyStyle;

/// Directory of icon and font assets, resolved next to the config file.
pub const ASSETS_DIR: &str = "Assets";
