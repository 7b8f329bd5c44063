//! NXP PN532 NFC frontend over I²C.
//!
//! Normal information frame:
//! ```text
//! 00 00 FF LEN LCS TFI CMD [params...] DCS 00
//!
//! LEN  = bytes from TFI through the last param
//! LCS  = -LEN            (LEN + LCS == 0 mod 256)
//! TFI  = D4 host→PN532, D5 PN532→host
//! DCS  = -(TFI + CMD + params)
//! ```
//! Every I²C read starts with a status byte; bit 0 set means the chip
//! has data ready.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;

use crate::config::NFC_READY_TIMEOUT_MS;
use crate::error::NfcError;
use crate::nfc::ScanEvent;

/// Largest command frame we send.
pub const FRAME_MAX: usize = 64;

/// Read buffer for one response: status byte, 9 bytes of framing, then an
/// InAutoPoll payload with two targets of up to 64 bytes each.
pub const RESPONSE_MAX: usize = 1 + 9 + 1 + 2 * 64;

const HOST_TO_PN532: u8 = 0xD4;
const PN532_TO_HOST: u8 = 0xD5;
const STATUS_READY: u8 = 0x01;
const ACK_FRAME: [u8; 6] = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00];

// Commands
pub const SAM_CONFIGURATION: u8 = 0x14;
pub const RF_CONFIGURATION: u8 = 0x32;
pub const IN_AUTO_POLL: u8 = 0x60;

/// SAMConfiguration: normal mode, 1 s virtual card timeout, IRQ pin enabled.
pub const SAM_NORMAL_MODE: [u8; 3] = [0x01, 0x14, 0x01];

/// RFConfiguration: RF field item, field off.
pub const RF_FIELD_OFF: [u8; 2] = [0x01, 0x00];

/// InAutoPoll: one poll, 150 ms period, then the target types to try.
pub const AUTO_POLL_PARAMS: [u8; 7] = [
    0x01, // PollNr
    0x01, // Period (×150 ms)
    0x10, // Mifare / ISO14443-3A
    0x11, // FeliCa 212 kbps
    0x20, // ISO14443-4A
    0x23, // ISO14443-4B
    0x04, // Innovision Jewel
];

fn encode(tfi: u8, cmd: u8, params: &[u8], out: &mut [u8]) -> Result<usize, NfcError> {
    let total = params.len() + 9;
    let len = params.len() + 2;
    if total > out.len() || len > usize::from(u8::MAX) {
        return Err(NfcError::BufferTooSmall);
    }

    let len = len as u8;
    out[..5].copy_from_slice(&[0x00, 0x00, 0xFF, len, len.wrapping_neg()]);
    out[5] = tfi;
    out[6] = cmd;
    out[7..7 + params.len()].copy_from_slice(params);

    let sum = params
        .iter()
        .fold(tfi.wrapping_add(cmd), |acc, b| acc.wrapping_add(*b));
    out[7 + params.len()] = sum.wrapping_neg();
    out[8 + params.len()] = 0x00;
    Ok(total)
}

/// Build a host→PN532 command frame into `out`. Returns the frame length.
pub fn encode_frame(cmd: u8, params: &[u8], out: &mut [u8]) -> Result<usize, NfcError> {
    encode(HOST_TO_PN532, cmd, params, out)
}

/// `true` if `raw` (status byte + frame) is an ACK.
pub fn is_ack(raw: &[u8]) -> bool {
    raw.len() >= 7 && raw[0] & STATUS_READY != 0 && raw[1..7] == ACK_FRAME
}

/// Validate a response to `cmd` (status byte + frame) and return its payload.
pub fn parse_response(raw: &[u8], cmd: u8) -> Result<&[u8], NfcError> {
    let (&status, frame) = raw.split_first().ok_or(NfcError::Truncated)?;
    if status & STATUS_READY == 0 {
        return Err(NfcError::NotReady);
    }

    let start = frame
        .windows(2)
        .position(|w| w == [0x00, 0xFF])
        .ok_or(NfcError::UnexpectedResponse)?;
    let frame = &frame[start + 2..];

    let [len, lcs, rest @ ..] = frame else {
        return Err(NfcError::Truncated);
    };
    if len.wrapping_add(*lcs) != 0 {
        return Err(NfcError::Checksum);
    }

    let len = usize::from(*len);
    let body = rest.get(..len).ok_or(NfcError::Truncated)?;
    let dcs = *rest.get(len).ok_or(NfcError::Truncated)?;
    if body.iter().fold(dcs, |acc, b| acc.wrapping_add(*b)) != 0 {
        return Err(NfcError::Checksum);
    }

    match body {
        [PN532_TO_HOST, code, payload @ ..] if *code == cmd.wrapping_add(1) => Ok(payload),
        _ => Err(NfcError::UnexpectedResponse),
    }
}

/// Number of distinct target types in an InAutoPoll response payload.
///
/// Payload: `NbTg [Type Len Data...]*`. A malformed tail stops the count.
pub fn count_protocols(payload: &[u8]) -> usize {
    let Some((&targets, mut rest)) = payload.split_first() else {
        return 0;
    };

    let mut kinds: Vec<u8, 4> = Vec::new();
    for _ in 0..targets {
        let [kind, len, tail @ ..] = rest else {
            break;
        };
        if !kinds.contains(kind) && kinds.push(*kind).is_err() {
            break;
        }
        rest = tail.get(usize::from(*len)..).unwrap_or(&[]);
    }
    kinds.len()
}

/// Scan event for one InAutoPoll response payload.
pub fn scan_event(payload: &[u8]) -> ScanEvent {
    match count_protocols(payload) {
        0 => ScanEvent::not_detected(),
        n => ScanEvent::detected(n),
    }
}

pub struct Pn532<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pn532<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn send_command(&mut self, cmd: u8, params: &[u8]) -> Result<(), NfcError> {
        let mut frame = [0u8; FRAME_MAX];
        let len = encode_frame(cmd, params, &mut frame)?;
        self.i2c
            .write(self.address, &frame[..len])
            .map_err(|_| NfcError::Bus)
    }

    pub fn is_ready(&mut self) -> Result<bool, NfcError> {
        let mut status = [0u8; 1];
        self.i2c
            .read(self.address, &mut status)
            .map_err(|_| NfcError::Bus)?;
        Ok(status[0] & STATUS_READY != 0)
    }

    pub fn read_ack(&mut self) -> Result<(), NfcError> {
        let mut raw = [0u8; 7];
        self.i2c
            .read(self.address, &mut raw)
            .map_err(|_| NfcError::Bus)?;
        if is_ack(&raw) {
            Ok(())
        } else {
            Err(NfcError::BadAck)
        }
    }

    /// Read the response to `cmd` into `buf` and return its payload.
    pub fn read_response<'b>(&mut self, cmd: u8, buf: &'b mut [u8]) -> Result<&'b [u8], NfcError> {
        self.i2c
            .read(self.address, buf)
            .map_err(|_| NfcError::Bus)?;
        parse_response(buf, cmd)
    }

    /// Poll the status byte every millisecond for up to `NFC_READY_TIMEOUT_MS`.
    pub fn wait_ready<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), NfcError> {
        for _ in 0..NFC_READY_TIMEOUT_MS {
            if self.is_ready()? {
                return Ok(());
            }
            delay.delay_ms(1);
        }
        Err(NfcError::Timeout)
    }

    /// Send `cmd` and block until its response arrives.
    pub fn execute<'b, D: DelayNs>(
        &mut self,
        cmd: u8,
        params: &[u8],
        buf: &'b mut [u8],
        delay: &mut D,
    ) -> Result<&'b [u8], NfcError> {
        self.send_command(cmd, params)?;
        self.wait_ready(delay)?;
        self.read_ack()?;
        self.wait_ready(delay)?;
        self.read_response(cmd, buf)
    }
}
