//! Application main loop.
//!
//! Acquires display, receiver and NFC scanner in that order, then ticks
//! every `TICK_INTERVAL_MS` until a quit is requested. Each resource is
//! held by a guard, so they are released in reverse order on every exit
//! path, including a failed acquisition part way through.

use core::ops::{Deref, DerefMut};

use embedded_hal_async::delay::DelayNs;

use crate::config::TICK_INTERVAL_MS;
use crate::error::Error;
use crate::menu::MenuCatalog;
use crate::nfc::{NfcScanner, Subscription};
use crate::radio::{self, Receiver};
use crate::state::{ActiveApp, SharedState};
use crate::ui::render::draw_frame;
use crate::ui::Surface;

/// Whether the loop should keep going after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    Running,
    Terminated,
}

/// Open display; closed on drop.
struct SurfaceGuard<'a, D: Surface> {
    surface: &'a mut D,
}

impl<'a, D: Surface> SurfaceGuard<'a, D> {
    fn acquire(surface: &'a mut D) -> Result<Self, D::Error> {
        surface.open()?;
        info!("Display open");
        Ok(Self { surface })
    }
}

impl<D: Surface> Deref for SurfaceGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.surface
    }
}

impl<D: Surface> DerefMut for SurfaceGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.surface
    }
}

impl<D: Surface> Drop for SurfaceGuard<'_, D> {
    fn drop(&mut self) {
        self.surface.close();
        info!("Display closed");
    }
}

/// Receiver in RX mode; stopped on drop.
struct ReceiverGuard<'a, R: Receiver> {
    receiver: &'a mut R,
}

impl<'a, R: Receiver> ReceiverGuard<'a, R> {
    fn acquire(receiver: &'a mut R) -> Result<Self, R::Error> {
        receiver.start()?;
        info!("Receiver started");
        Ok(Self { receiver })
    }
}

impl<R: Receiver> Deref for ReceiverGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.receiver
    }
}

impl<R: Receiver> DerefMut for ReceiverGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.receiver
    }
}

impl<R: Receiver> Drop for ReceiverGuard<'_, R> {
    fn drop(&mut self) {
        self.receiver.stop();
        info!("Receiver stopped");
    }
}

/// One loop iteration: check quit, refresh RSSI, draw and present a frame.
///
/// The sub-scan readings are only read or written while the sub-scan
/// entry is selected; the selection is checked again before the new
/// reading is stored. The lock is never held across the receiver read
/// or drawing.
pub fn tick<R, D>(
    state: &SharedState,
    catalog: &MenuCatalog,
    receiver: &mut R,
    surface: &mut D,
) -> LoopState
where
    R: Receiver + ?Sized,
    D: Surface + ?Sized,
{
    let (quit, last) = state.with(|s| {
        let last = match s.active_app(catalog) {
            ActiveApp::SubScan(ctx) => Some(ctx.current_rssi()),
            ActiveApp::Placeholder => None,
        };
        (s.should_quit(), last)
    });
    if quit {
        return LoopState::Terminated;
    }

    if let Some(last) = last {
        let rssi = radio::sample(receiver, last);
        state.update(|s| match s.active_sub_scan_mut(catalog) {
            Some(ctx) => ctx.set_current_rssi(rssi),
            None => debug!("Selection changed while sampling, RSSI dropped"),
        });
    }

    let frame = state.frame(catalog);
    draw_frame(surface, catalog, &frame);
    surface.present();
    LoopState::Running
}

/// Run the application until quit.
///
/// Fails without entering the loop if any resource cannot be acquired;
/// whatever was already acquired is released first.
pub async fn run<'h, D, R, S, T>(
    catalog: &MenuCatalog,
    state: &'h SharedState,
    surface: &mut D,
    receiver: &mut R,
    scanner: &mut S,
    delay: &mut T,
) -> Result<(), Error>
where
    D: Surface,
    R: Receiver,
    S: NfcScanner<'h>,
    T: DelayNs,
{
    let mut display = SurfaceGuard::acquire(surface).map_err(|_| {
        warn!("Display unavailable");
        Error::DisplayUnavailable
    })?;
    let mut radio = ReceiverGuard::acquire(receiver).map_err(|_| {
        warn!("Receiver unavailable");
        Error::ReceiverUnavailable
    })?;
    let _subscription = Subscription::start(scanner, state).map_err(|_| {
        warn!("NFC scanner unavailable");
        Error::ScannerUnavailable
    })?;

    info!("Main loop running");
    while tick(state, catalog, &mut *radio, &mut *display) == LoopState::Running {
        delay.delay_ms(TICK_INTERVAL_MS).await;
    }
    info!("Quit requested");
    Ok(())
}
