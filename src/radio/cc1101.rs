//! TI CC1101 sub-GHz transceiver, receive-only.
//!
//! SPI header byte layout:
//! ```text
//! Bit 7: R/W (1 = read)
//! Bit 6: burst (status registers are read with burst set)
//! Bit 5..0: register address / command strobe
//! ```

use embedded_hal::spi::SpiDevice;

use crate::config::{CC1101_FREQUENCY_HZ, CC1101_XTAL_HZ};
use crate::radio::Receiver;

const READ_BURST: u8 = 0xC0;

// Configuration registers
const FREQ2: u8 = 0x0D;
const FREQ1: u8 = 0x0E;
const FREQ0: u8 = 0x0F;

// Command strobes
const SRES: u8 = 0x30;
const SRX: u8 = 0x34;
const SIDLE: u8 = 0x36;
const SFRX: u8 = 0x3A;

// Status registers
const RSSI: u8 = 0x34;

/// RSSI offset (dB) for the 433 MHz band.
const RSSI_OFFSET_DB: f64 = 74.0;

/// 24-bit FREQ word for `freq_hz` with the given crystal.
pub fn frequency_word(freq_hz: u32, xtal_hz: u32) -> u32 {
    ((u64::from(freq_hz) << 16) / u64::from(xtal_hz)) as u32 & 0x00FF_FFFF
}

/// Convert the raw RSSI status register (two's complement, 0.5 dB steps) to dBm.
pub fn rssi_dbm(raw: u8) -> f64 {
    f64::from(raw as i8) / 2.0 - RSSI_OFFSET_DB
}

pub struct Cc1101<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> Cc1101<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    fn strobe(&mut self, command: u8) -> Result<(), SPI::Error> {
        self.spi.write(&[command])
    }

    fn write_register(&mut self, address: u8, value: u8) -> Result<(), SPI::Error> {
        self.spi.write(&[address, value])
    }

    fn read_status(&mut self, address: u8) -> Result<u8, SPI::Error> {
        let mut buf = [address | READ_BURST, 0];
        self.spi.transfer_in_place(&mut buf)?;
        Ok(buf[1])
    }

    fn set_frequency(&mut self, freq_hz: u32) -> Result<(), SPI::Error> {
        let [_, f2, f1, f0] = frequency_word(freq_hz, CC1101_XTAL_HZ).to_be_bytes();
        self.write_register(FREQ2, f2)?;
        self.write_register(FREQ1, f1)?;
        self.write_register(FREQ0, f0)
    }
}

impl<SPI: SpiDevice> Receiver for Cc1101<SPI> {
    type Error = SPI::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.strobe(SRES)?;
        self.set_frequency(CC1101_FREQUENCY_HZ)?;
        self.strobe(SFRX)?;
        self.strobe(SRX)?;
        info!("CC1101 receiving at {} Hz", CC1101_FREQUENCY_HZ);
        Ok(())
    }

    fn stop(&mut self) {
        if self.strobe(SIDLE).is_err() {
            warn!("CC1101 idle strobe failed");
        }
    }

    fn rssi(&mut self) -> Result<f64, Self::Error> {
        self.read_status(RSSI).map(rssi_dbm)
    }
}
