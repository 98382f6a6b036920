//! Integration tests for the page controller and press dispatch.
//!
//! These drive the public API end to end with a mock deck and a mock
//! renderer: paint the home page, press keys, toggle, navigate pages and hit
//! the exit key — checking what got rendered and what got pushed where.

use image::DynamicImage;
use pagedeck::controller::{Dispatch, KeySelection, Session};
use pagedeck::device::{self, Deck};
use pagedeck::error::{Error, Result};
use pagedeck::render::KeyRenderer;
use pagedeck::ConfigStore;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- mock deck ---

#[derive(Default)]
struct DeckLog {
    /// Keys that received an image, in push order.
    pushed: Mutex<Vec<u8>>,
    clears: AtomicUsize,
}

struct MockDeck {
    keys: u8,
    log: Arc<DeckLog>,
}

impl Deck for MockDeck {
    fn key_count(&self) -> u8 {
        self.keys
    }

    fn key_image_size(&self) -> (u32, u32) {
        (72, 72)
    }

    fn set_brightness(&self, _percent: u8) -> Result<()> {
        Ok(())
    }

    fn set_key_image(&self, key: u8, _image: DynamicImage) -> Result<()> {
        self.log.pushed.lock().unwrap().push(key);
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        self.log.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn poll_buttons(&self, _timeout: Duration) -> Result<Option<Vec<bool>>> {
        Ok(None)
    }
}

// --- mock renderer ---

#[derive(Default)]
struct RenderLog {
    /// (icon path, label) pairs, in render order.
    calls: Mutex<Vec<(String, String)>>,
}

struct MockRenderer {
    log: Arc<RenderLog>,
    /// Icon file names that fail to "load".
    fail: Vec<&'static str>,
}

impl KeyRenderer for MockRenderer {
    fn render(&mut self, icon: &Path, label: &str, size: (u32, u32)) -> Result<DynamicImage> {
        let name = icon
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail.contains(&name.as_str()) {
            return Err(Error::AssetLoadFailed {
                path: icon.to_path_buf(),
                reason: "mock failure".into(),
            });
        }
        self.log
            .calls
            .lock()
            .unwrap()
            .push((icon.display().to_string(), label.to_string()));
        Ok(DynamicImage::new_rgb8(size.0, size.1))
    }
}

// --- harness ---

struct Harness {
    session: Session,
    deck_log: Arc<DeckLog>,
    render_log: Arc<RenderLog>,
}

fn harness(config: &str, keys: u8, fail: Vec<&'static str>) -> Harness {
    let deck_log = Arc::new(DeckLog::default());
    let render_log = Arc::new(RenderLog::default());
    let deck = device::share(MockDeck {
        keys,
        log: deck_log.clone(),
    });
    let renderer = Box::new(MockRenderer {
        log: render_log.clone(),
        fail,
    });
    let store = ConfigStore::from_json(config).unwrap();
    let session = Session::new(deck, store, renderer, PathBuf::from("/assets")).unwrap();
    Harness {
        session,
        deck_log,
        render_log,
    }
}

fn renders(h: &Harness) -> Vec<(String, String)> {
    h.render_log.calls.lock().unwrap().clone()
}

fn pushed(h: &Harness) -> Vec<u8> {
    h.deck_log.pushed.lock().unwrap().clone()
}

const STARTUP_CONFIG: &str = r#"{
    "pages": [
        {
            "page_number": 1,
            "home_page": true,
            "keys": [
                { "button": 0, "primary_icon": "a.png", "primary_label": "A" },
                { "button": 14, "primary_icon": "exit.png", "primary_label": "Exit" }
            ]
        }
    ]
}"#;

#[test]
fn startup_paints_home_page_and_registers_exit_key() {
    let mut h = harness(STARTUP_CONFIG, 15, vec![]);

    h.session.paint_home().unwrap();

    // Only the configured keys produce images, even though the first paint
    // walks every physical index.
    assert_eq!(pushed(&h), vec![0, 14]);
    assert_eq!(
        renders(&h),
        vec![
            ("/assets/a.png".to_string(), "A".to_string()),
            ("/assets/exit.png".to_string(), "Exit".to_string()),
        ]
    );
    assert_eq!(h.session.current_page(), 1);
    assert_eq!(h.session.exit_key(), 14);
}

#[test]
fn first_paint_does_not_clear_but_navigation_does() {
    let mut h = harness(STARTUP_CONFIG, 15, vec![]);

    h.session.paint_home().unwrap();
    assert_eq!(h.deck_log.clears.load(Ordering::SeqCst), 0);

    h.session
        .paint_page(1, true, KeySelection::Configured)
        .unwrap();
    assert_eq!(h.deck_log.clears.load(Ordering::SeqCst), 1);
}

#[test]
fn exit_key_press_clears_and_shuts_down() {
    let mut h = harness(STARTUP_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();

    let outcome = h.session.handle_press(14).unwrap();
    assert_eq!(outcome, Dispatch::Shutdown);
    assert_eq!(h.deck_log.clears.load(Ordering::SeqCst), 1);
}

#[test]
fn non_exit_press_continues() {
    let mut h = harness(STARTUP_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();
    assert_eq!(h.session.handle_press(0).unwrap(), Dispatch::Continue);
}

#[test]
fn unconfigured_key_press_is_skipped_silently() {
    let mut h = harness(STARTUP_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();
    let before = renders(&h).len();

    assert_eq!(h.session.handle_press(7).unwrap(), Dispatch::Continue);
    assert_eq!(renders(&h).len(), before);
}

const TOGGLE_CONFIG: &str = r#"{
    "pages": [
        {
            "page_number": 1,
            "home_page": true,
            "keys": [
                {
                    "button": 3,
                    "primary_icon": "on.png",
                    "primary_label": "ON",
                    "secondary_icon": "off.png",
                    "secondary_label": "OFF",
                    "toggle": true
                }
            ]
        }
    ]
}"#;

#[test]
fn toggle_key_cycles_between_states() {
    let mut h = harness(TOGGLE_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();
    assert_eq!(
        renders(&h).last().unwrap(),
        &("/assets/on.png".to_string(), "ON".to_string())
    );

    // First press flips to the secondary state and stores it as active.
    h.session.handle_press(3).unwrap();
    assert_eq!(
        renders(&h).last().unwrap(),
        &("/assets/off.png".to_string(), "OFF".to_string())
    );

    // Second press flips back to primary.
    h.session.handle_press(3).unwrap();
    assert_eq!(
        renders(&h).last().unwrap(),
        &("/assets/on.png".to_string(), "ON".to_string())
    );
}

const TWO_PAGE_CONFIG: &str = r#"{
    "pages": [
        {
            "page_number": 1,
            "home_page": true,
            "keys": [
                { "button": 0, "primary_icon": "a.png", "primary_label": "A" },
                { "button": 1, "primary_icon": "next.png", "display_page": 2 }
            ]
        },
        {
            "page_number": 2,
            "home_page": false,
            "keys": [
                { "button": 0, "primary_icon": "b.png", "primary_label": "B" },
                { "button": 1, "primary_icon": "back.png", "display_page": 1 }
            ]
        }
    ]
}"#;

#[test]
fn display_page_press_switches_and_repaints() {
    let mut h = harness(TWO_PAGE_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();

    assert_eq!(h.session.handle_press(1).unwrap(), Dispatch::Continue);
    assert_eq!(h.session.current_page(), 2);
    // Navigation clears first, then paints page 2's configured keys.
    assert_eq!(h.deck_log.clears.load(Ordering::SeqCst), 1);
    let all = renders(&h);
    let tail: Vec<_> = all[all.len() - 2..].to_vec();
    assert_eq!(
        tail,
        vec![
            ("/assets/b.png".to_string(), "B".to_string()),
            ("/assets/back.png".to_string(), "".to_string()),
        ]
    );
}

#[test]
fn navigation_leaves_other_pages_active_state_untouched() {
    let mut h = harness(TWO_PAGE_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();

    h.session.handle_press(1).unwrap();
    assert_eq!(h.session.current_page(), 2);
    h.session.handle_press(1).unwrap();
    assert_eq!(h.session.current_page(), 1);

    // Back on page 1 the keys still render their primary style.
    let all = renders(&h);
    let tail: Vec<_> = all[all.len() - 2..].to_vec();
    assert_eq!(
        tail,
        vec![
            ("/assets/a.png".to_string(), "A".to_string()),
            ("/assets/next.png".to_string(), "".to_string()),
        ]
    );
}

#[test]
fn navigating_to_missing_page_is_reported() {
    let mut h = harness(TWO_PAGE_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();

    let err = h.session.load_page(9).unwrap_err();
    assert!(matches!(err, Error::PageNotFound(9)));
    // The failed navigation didn't move the page pointer or clear the deck.
    assert_eq!(h.session.current_page(), 1);
    assert_eq!(h.deck_log.clears.load(Ordering::SeqCst), 0);
}

#[test]
fn render_failure_skips_that_key_but_paints_the_rest() {
    let mut h = harness(TWO_PAGE_CONFIG, 15, vec!["a.png"]);
    h.session.paint_home().unwrap();

    // a.png failed to load; next.png still made it to the deck.
    assert_eq!(pushed(&h), vec![1]);
}

#[test]
fn action_press_spawns_and_continues() {
    let config = r#"{
        "pages": [
            {
                "page_number": 1,
                "home_page": true,
                "keys": [
                    { "button": 0, "primary_icon": "run.png", "action": "true" }
                ]
            }
        ]
    }"#;
    let mut h = harness(config, 15, vec![]);
    h.session.paint_home().unwrap();
    assert_eq!(h.session.handle_press(0).unwrap(), Dispatch::Continue);
}

#[test]
fn release_is_a_no_op() {
    let mut h = harness(STARTUP_CONFIG, 15, vec![]);
    h.session.paint_home().unwrap();
    let before = renders(&h).len();

    assert_eq!(h.session.handle_release(0).unwrap(), Dispatch::Continue);
    assert_eq!(renders(&h).len(), before);
}
