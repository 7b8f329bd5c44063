//! Unified error types for predator.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

use core::fmt;

/// Top-level error type returned by the application.
///
/// Only resource acquisition is fatal; everything else is handled where
/// it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The display surface could not be opened.
    DisplayUnavailable,

    /// The sub-GHz receiver did not enter receive mode.
    ReceiverUnavailable,

    /// The NFC scanner refused to start.
    ScannerUnavailable,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DisplayUnavailable => f.write_str("display unavailable"),
            Error::ReceiverUnavailable => f.write_str("sub-GHz receiver unavailable"),
            Error::ScannerUnavailable => f.write_str("NFC scanner unavailable"),
        }
    }
}

/// Errors raised by the PN532 frontend driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NfcError {
    /// I²C transaction failed.
    Bus,
    /// The chip did not report ready.
    NotReady,
    /// Ready flag not raised within `NFC_READY_TIMEOUT_MS`.
    Timeout,
    /// Expected an ACK frame, got something else.
    BadAck,
    /// Length or data checksum mismatch.
    Checksum,
    /// Frame shorter than its length byte claims.
    Truncated,
    /// Response to a different command, or not a PN532→host frame.
    UnexpectedResponse,
    /// Command parameters do not fit the frame buffer.
    BufferTooSmall,
}

impl fmt::Display for NfcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NfcError::Bus => "I2C bus error",
            NfcError::NotReady => "frontend not ready",
            NfcError::Timeout => "timed out waiting for frontend",
            NfcError::BadAck => "missing ACK frame",
            NfcError::Checksum => "frame checksum mismatch",
            NfcError::Truncated => "truncated frame",
            NfcError::UnexpectedResponse => "unexpected response",
            NfcError::BufferTooSmall => "frame buffer too small",
        };
        f.write_str(msg)
    }
}
