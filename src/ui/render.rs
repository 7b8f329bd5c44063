//! Renderer: one frame for the selected menu entry.
//!
//! Rendering only reads. The sub-scan readings are consumed through
//! [`SubScanView`] and are touched only when the selected entry is the
//! live sub-scan screen.

use heapless::String;

use crate::config::{RSSI_LINE_CAPACITY, RSSI_Y, SUMMARY_Y, TEXT_X, TITLE_Y};
use crate::menu::{EntryKind, MenuCatalog, MenuEntry};
use crate::state::{write_truncated, ActiveApp, ApplicationState, Frame, SubScanContext};
use crate::ui::Canvas;

/// Read access to the sub-scan readings.
pub trait SubScanView {
    fn rssi(&self) -> f64;
    fn protocol_summary(&self) -> &str;
}

impl SubScanView for SubScanContext {
    fn rssi(&self) -> f64 {
        self.current_rssi()
    }

    fn protocol_summary(&self) -> &str {
        SubScanContext::protocol_summary(self)
    }
}

/// `"RSSI: <value> dBm"` with two decimals.
pub fn rssi_line(rssi: f64) -> String<RSSI_LINE_CAPACITY> {
    let mut line = String::new();
    write_truncated(&mut line, format_args!("RSSI: {:.2} dBm", rssi));
    line
}

/// Clear and draw the title of the entry at `selected`.
fn draw_title<'c, C>(canvas: &mut C, catalog: &'c MenuCatalog, selected: usize) -> Option<&'c MenuEntry>
where
    C: Canvas + ?Sized,
{
    canvas.clear();
    let entry = catalog.entry(selected)?;
    canvas.draw_text(TEXT_X, TITLE_Y, entry.name);
    Some(entry)
}

/// Draw the entry at `selected`.
pub fn draw<C, V>(canvas: &mut C, catalog: &MenuCatalog, selected: usize, view: &V)
where
    C: Canvas + ?Sized,
    V: SubScanView + ?Sized,
{
    let Some(entry) = draw_title(canvas, catalog, selected) else {
        return;
    };

    if entry.kind == EntryKind::SubScan {
        canvas.draw_text(TEXT_X, RSSI_Y, rssi_line(view.rssi()).as_str());
        canvas.draw_text(TEXT_X, SUMMARY_Y, view.protocol_summary());
    }
}

/// Draw the entry at `selected` from its tagged view. A placeholder
/// never reaches the sub-scan readings.
pub fn draw_app<C>(canvas: &mut C, catalog: &MenuCatalog, selected: usize, app: ActiveApp<'_>)
where
    C: Canvas + ?Sized,
{
    match app {
        ActiveApp::SubScan(ctx) => draw(canvas, catalog, selected, ctx),
        ActiveApp::Placeholder => {
            draw_title(canvas, catalog, selected);
        }
    }
}

/// Draw a frame straight from the state.
pub fn draw_state<C>(canvas: &mut C, catalog: &MenuCatalog, state: &ApplicationState)
where
    C: Canvas + ?Sized,
{
    draw_app(canvas, catalog, state.selected_index(), state.active_app(catalog));
}

/// Draw a detached frame.
pub fn draw_frame<C>(canvas: &mut C, catalog: &MenuCatalog, frame: &Frame)
where
    C: Canvas + ?Sized,
{
    draw_app(canvas, catalog, frame.selected_index(), frame.active_app());
}
