//! Key style resolution: which icon and label a key shows in a given state.
//!
//! Pure decision logic over a [`KeyConfig`]; no device or filesystem access.
//! The caller renders the returned style and then writes the resolved
//! icon/label back into the store's active slot.

use crate::config::KeyConfig;
use std::path::{Path, PathBuf};

/// A resolved, displayable key style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStyle {
    /// Icon path resolved against the assets root.
    pub icon: PathBuf,
    /// Label text; may be empty.
    pub label: String,
}

impl KeyStyle {
    /// The icon path as stored back into the active slot.
    pub fn icon_string(&self) -> String {
        self.icon.display().to_string()
    }
}

/// Resolve the style for a key in the given pressed/released state.
///
/// Non-toggle keys show the active slot while pressed and the primary slot
/// when released. Toggle keys flip between primary and secondary on each
/// press: if the active icon currently equals the primary icon, the press
/// selects the secondary slot, otherwise the primary one.
///
/// An empty resolved slot falls back to the primary slot. In particular a
/// toggle state without its own label inherits the primary label rather than
/// rendering blank; existing configs rely on that, so it stays.
///
/// Returns `None` when the key has no displayable icon.
pub fn resolve(key: &KeyConfig, pressed: bool, assets_root: &Path) -> Option<KeyStyle> {
    let (icon_slot, label_slot) = if key.toggle {
        if pressed {
            // Flip based on what the active slot currently points at. The
            // active icon may hold either the raw configured value or the
            // already-resolved absolute path, so compare both forms.
            let active = Path::new(&key.active_icon);
            let primary_resolved = assets_root.join(&key.primary_icon);
            if key.active_icon == key.primary_icon || active == primary_resolved {
                (&key.secondary_icon, &key.secondary_label)
            } else {
                (&key.primary_icon, &key.primary_label)
            }
        } else {
            (&key.active_icon, &key.active_label)
        }
    } else if pressed {
        (&key.active_icon, &key.active_label)
    } else {
        (&key.primary_icon, &key.primary_label)
    };

    let icon = if icon_slot.is_empty() {
        &key.primary_icon
    } else {
        icon_slot
    };
    let label = if label_slot.is_empty() {
        &key.primary_label
    } else {
        label_slot
    };

    if icon.is_empty() {
        return None;
    }

    // Path::join leaves absolute paths untouched, so an already-resolved
    // active icon passes through unchanged.
    Some(KeyStyle {
        icon: assets_root.join(icon),
        label: label.clone(),
    })
}
