//! NFC scan events and the callback subscription.
//!
//! The scanner runs on its own and calls back into a
//! [`ScanEventHandler`] whenever a scan cycle finishes. The application
//! state is that handler: every event rewrites the protocol summary.

pub mod pn532;

use core::marker::PhantomData;

use crate::config::NO_DETECTION_SUMMARY;
use crate::state::{SharedState, SubScanContext};

/// Outcome of one scan cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanEventKind {
    /// One or more targets answered.
    Detected,
    /// The field was polled and nothing answered.
    NotDetected,
    /// The frontend failed during the cycle.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanEvent {
    pub kind: ScanEventKind,
    /// Number of distinct protocols seen (meaningful for `Detected`).
    pub protocol_count: usize,
}

impl ScanEvent {
    pub const fn detected(protocol_count: usize) -> Self {
        Self {
            kind: ScanEventKind::Detected,
            protocol_count,
        }
    }

    pub const fn not_detected() -> Self {
        Self {
            kind: ScanEventKind::NotDetected,
            protocol_count: 0,
        }
    }

    pub const fn error() -> Self {
        Self {
            kind: ScanEventKind::Error,
            protocol_count: 0,
        }
    }
}

/// Reduce `event` to the human-readable summary. Every event overwrites it.
pub fn summarize(event: &ScanEvent, ctx: &mut SubScanContext) {
    match event.kind {
        ScanEventKind::Detected if event.protocol_count > 0 => ctx.format_protocol_summary(
            format_args!("Detected NFC Protocols: {}", event.protocol_count),
        ),
        _ => ctx.set_protocol_summary(NO_DETECTION_SUMMARY),
    }
}

/// Callback target for scan events. May be invoked from another task.
pub trait ScanEventHandler: Sync {
    fn on_scan_event(&self, event: ScanEvent);
}

impl ScanEventHandler for SharedState {
    fn on_scan_event(&self, event: ScanEvent) {
        debug!("Scan event: {}", event);
        self.update(|state| summarize(&event, state.sub_scan_mut()));
    }
}

/// An NFC scanner that delivers events to a registered handler.
///
/// Once `stop` returns, the handler passed to `start` must not be invoked again.
pub trait NfcScanner<'h> {
    type Error;

    fn start(&mut self, handler: &'h dyn ScanEventHandler) -> Result<(), Self::Error>;

    fn stop(&mut self);
}

/// Live registration of a handler with a scanner. Dropping it stops the scanner.
pub struct Subscription<'a, 'h, S: NfcScanner<'h>> {
    scanner: &'a mut S,
    _handler: PhantomData<&'h dyn ScanEventHandler>,
}

impl<'a, 'h, S: NfcScanner<'h>> Subscription<'a, 'h, S> {
    /// Start `scanner` with `handler`. On error nothing is registered.
    pub fn start(scanner: &'a mut S, handler: &'h dyn ScanEventHandler) -> Result<Self, S::Error> {
        scanner.start(handler)?;
        info!("NFC scanner started");
        Ok(Self {
            scanner,
            _handler: PhantomData,
        })
    }
}

impl<'h, S: NfcScanner<'h>> Drop for Subscription<'_, 'h, S> {
    fn drop(&mut self) {
        self.scanner.stop();
        info!("NFC scanner stopped");
    }
}
