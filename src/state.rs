//! Application state shared between the main loop and event callbacks.
//!
//! There is exactly one `ApplicationState` per run. All per-entry data is
//! stored inline; nothing here is allocated or freed on its own.
//!
//! Key presses and NFC scan events arrive from other execution contexts
//! (GPIO tasks, the NFC poll task), so the state sits behind a
//! critical-section mutex in [`SharedState`]. Every access is a short
//! closure: callbacks only ever wait for another field write, never for
//! a render.

use core::cell::RefCell;
use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use crate::config::{NO_DETECTION_SUMMARY, SUMMARY_CAPACITY};
use crate::menu::{EntryKind, MenuCatalog};
use crate::ui::input_logic::{select_next, select_prev};

/// `fmt::Write` adapter that stops at the buffer capacity instead of failing.
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Replace `buf` with `args`, truncated to the buffer capacity.
pub(crate) fn write_truncated<const N: usize>(buf: &mut String<N>, args: fmt::Arguments<'_>) {
    buf.clear();
    let _ = Truncating(buf).write_fmt(args);
}

/// Readings of the sub-scan screen.
#[derive(Clone, Debug, PartialEq)]
pub struct SubScanContext {
    current_rssi: f64,
    /// Reserved; never displayed.
    current_tag_strength: f64,
    protocol_summary: String<SUMMARY_CAPACITY>,
}

impl SubScanContext {
    pub fn new() -> Self {
        let mut protocol_summary = String::new();
        let _ = protocol_summary.push_str(NO_DETECTION_SUMMARY);
        Self {
            current_rssi: 0.0,
            current_tag_strength: 0.0,
            protocol_summary,
        }
    }

    /// Last sampled signal strength (dBm).
    pub fn current_rssi(&self) -> f64 {
        self.current_rssi
    }

    pub fn set_current_rssi(&mut self, rssi: f64) {
        self.current_rssi = rssi;
    }

    pub fn current_tag_strength(&self) -> f64 {
        self.current_tag_strength
    }

    pub fn protocol_summary(&self) -> &str {
        self.protocol_summary.as_str()
    }

    /// Replace the summary, truncating to `SUMMARY_CAPACITY` bytes.
    pub fn set_protocol_summary(&mut self, text: &str) {
        self.format_protocol_summary(format_args!("{}", text));
    }

    /// Replace the summary with formatted text, truncating to `SUMMARY_CAPACITY` bytes.
    pub fn format_protocol_summary(&mut self, args: fmt::Arguments<'_>) {
        write_truncated(&mut self.protocol_summary, args);
    }
}

impl Default for SubScanContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of the data belonging to the selected entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActiveApp<'a> {
    SubScan(&'a SubScanContext),
    Placeholder,
}

/// Detached copy of one frame's data. Placeholder entries carry no readings.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    selected_index: usize,
    sub_scan: Option<SubScanContext>,
}

impl Frame {
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn active_app(&self) -> ActiveApp<'_> {
        match &self.sub_scan {
            Some(ctx) => ActiveApp::SubScan(ctx),
            None => ActiveApp::Placeholder,
        }
    }
}

/// The single record the whole application revolves around.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationState {
    selected_index: usize,
    should_quit: bool,
    sub_scan: SubScanContext,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            should_quit: false,
            sub_scan: SubScanContext::new(),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn sub_scan(&self) -> &SubScanContext {
        &self.sub_scan
    }

    pub fn sub_scan_mut(&mut self) -> &mut SubScanContext {
        &mut self.sub_scan
    }

    /// Move the cursor up. Returns `true` if it moved.
    pub fn select_prev(&mut self) -> bool {
        let prev = select_prev(self.selected_index);
        let moved = prev != self.selected_index;
        self.selected_index = prev;
        moved
    }

    /// Move the cursor down within `entry_count` entries. Returns `true` if it moved.
    pub fn select_next(&mut self, entry_count: usize) -> bool {
        let next = select_next(self.selected_index, entry_count);
        let moved = next != self.selected_index;
        self.selected_index = next;
        moved
    }

    /// One-way: there is no way back to `false`.
    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn active_app(&self, catalog: &MenuCatalog) -> ActiveApp<'_> {
        match catalog.kind(self.selected_index) {
            EntryKind::SubScan => ActiveApp::SubScan(&self.sub_scan),
            EntryKind::Placeholder => ActiveApp::Placeholder,
        }
    }

    /// The sub-scan readings, only while the sub-scan entry is selected.
    pub fn active_sub_scan_mut(&mut self, catalog: &MenuCatalog) -> Option<&mut SubScanContext> {
        match catalog.kind(self.selected_index) {
            EntryKind::SubScan => Some(&mut self.sub_scan),
            EntryKind::Placeholder => None,
        }
    }

    /// Copy of what the selected entry needs to draw one frame.
    pub fn frame(&self, catalog: &MenuCatalog) -> Frame {
        let sub_scan = match self.active_app(catalog) {
            ActiveApp::SubScan(ctx) => Some(ctx.clone()),
            ActiveApp::Placeholder => None,
        };
        Frame {
            selected_index: self.selected_index,
            sub_scan,
        }
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}

/// [`ApplicationState`] behind a critical-section mutex.
pub struct SharedState {
    inner: Mutex<CriticalSectionRawMutex, RefCell<ApplicationState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ApplicationState::new())),
        }
    }

    /// Read the state under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&ApplicationState) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    /// Mutate the state under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut ApplicationState) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> ApplicationState {
        self.with(|state| state.clone())
    }

    /// Consistent copy of the selected entry's frame data, for rendering
    /// outside the lock.
    pub fn frame(&self, catalog: &MenuCatalog) -> Frame {
        self.with(|state| state.frame(catalog))
    }

    pub fn should_quit(&self) -> bool {
        self.with(|state| state.should_quit())
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
