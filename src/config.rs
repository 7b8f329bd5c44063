//! Application-wide constants and compile-time configuration.
//!
//! All pin assignments, timing parameters, layout coordinates and
//! protocol constants live here so they can be tuned in one place.

// Main loop

/// Delay between two main-loop ticks (ms).
pub const TICK_INTERVAL_MS: u32 = 100;

// Sub-scan screen

/// Maximum length of the NFC protocol summary (bytes, no terminator).
pub const SUMMARY_CAPACITY: usize = 127;

/// Summary shown until a scan reports at least one protocol.
pub const NO_DETECTION_SUMMARY: &str = "No NFC detected";

/// Capacity of the formatted RSSI line.
pub const RSSI_LINE_CAPACITY: usize = 32;

// Screen layout (SSD1306 128×64, 6×10 font, y = text baseline)

pub const TEXT_X: i32 = 10;
pub const TITLE_Y: i32 = 10;
pub const RSSI_Y: i32 = 32;
pub const SUMMARY_Y: i32 = 55;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button UP      → P0.11
//   Button DOWN    → P0.12
//   Button BACK    → P0.24
//   OLED I²C SDA   → P0.26
//   OLED I²C SCL   → P0.27
//   PN532 I²C SDA  → P0.30
//   PN532 I²C SCL  → P0.31
//   CC1101 SCK     → P1.15
//   CC1101 MISO    → P1.14
//   CC1101 MOSI    → P1.13
//   CC1101 CSN     → P1.12

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Sub-GHz receiver (CC1101)

/// Receive frequency.
pub const CC1101_FREQUENCY_HZ: u32 = 433_920_000;

/// Crystal frequency of the CC1101 module.
pub const CC1101_XTAL_HZ: u32 = 26_000_000;

// NFC frontend (PN532)

/// 7-bit I²C address of the PN532.
pub const PN532_I2C_ADDRESS: u8 = 0x24;

/// Pause between two InAutoPoll cycles (ms).
pub const NFC_POLL_INTERVAL_MS: u64 = 250;

/// How long to wait for the PN532 to raise its ready flag (ms).
pub const NFC_READY_TIMEOUT_MS: u32 = 100;

/// Upper bound for one InAutoPoll cycle to produce its response (ms).
pub const NFC_AUTO_POLL_TIMEOUT_MS: u64 = 1000;
