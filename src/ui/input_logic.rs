//! Input router: key presses → menu navigation / quit.
//!
//! The router is the only writer of the selected index and the quit flag.

use crate::menu::MenuCatalog;
use crate::state::{ApplicationState, SharedState};
use crate::ui::{InputEvent, InputType, Key};

/// Move selection cursor one item up.
pub fn select_prev(selected: usize) -> usize {
    selected.saturating_sub(1)
}

/// Move selection cursor one item down if another item exists.
pub fn select_next(selected: usize, item_count: usize) -> usize {
    if selected + 1 < item_count {
        selected + 1
    } else {
        selected
    }
}

/// Apply one input event to the state.
///
/// Only `Press` events act: Up/Down navigate (clamped to the catalog),
/// any other key requests quit.
pub fn apply_key(state: &mut ApplicationState, catalog: &MenuCatalog, event: InputEvent) {
    if event.kind != InputType::Press {
        return;
    }

    match event.key {
        Key::Up => {
            state.select_prev();
        }
        Key::Down => {
            state.select_next(catalog.len());
        }
        _ => state.request_quit(),
    }
}

/// Key callback: route `event` into the shared state.
pub fn on_key_press(shared: &SharedState, catalog: &MenuCatalog, event: InputEvent) {
    let (selected, quit) = shared.update(|state| {
        apply_key(state, catalog, event);
        (state.selected_index(), state.should_quit())
    });
    debug!("Key {}: selected={} quit={}", event, selected, quit);
}
