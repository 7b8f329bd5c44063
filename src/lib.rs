//! predator - a sub-GHz signal / NFC scanner handheld on nRF52840.
//!
//! Everything that does not touch a peripheral lives in this library so
//! it can be tested on the host:
//!
//! - `state`: application state behind a critical-section mutex
//! - `ui`: input router, renderer and the embedded-graphics canvas
//! - `radio`: receiver trait, RSSI sampling and the CC1101 driver
//! - `nfc`: scan events, the subscription handle and the PN532 driver
//! - `app`: the main loop and resource lifecycle
//!
//! Usage: `cargo test` on the host, `cargo run --release --features embedded`
//! on the device. The firmware in `main.rs` wires the drivers to the
//! nRF peripherals and spawns the input and NFC tasks.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod app;
pub mod config;
pub mod error;
pub mod menu;
pub mod nfc;
pub mod radio;
pub mod state;
pub mod ui;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use app::{run, tick, LoopState};
pub use error::{Error, NfcError};
pub use menu::{EntryKind, MenuCatalog, MenuEntry};
pub use nfc::{ScanEvent, ScanEventHandler, ScanEventKind, NfcScanner, Subscription};
pub use radio::Receiver;
pub use state::{ActiveApp, ApplicationState, Frame, SharedState, SubScanContext};
pub use ui::{Canvas, InputEvent, InputType, Key, Surface};
