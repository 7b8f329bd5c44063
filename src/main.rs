//! predator firmware entry point.
//!
//! Wires the nRF52840 peripherals to the drivers, spawns the button and
//! NFC tasks, then runs the main loop until the user quits.

#![no_std]
#![no_main]

mod board;

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin as _};
use embassy_nrf::{bind_interrupts, peripherals, spim, twim};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use predator::config::PN532_I2C_ADDRESS;
use predator::nfc::pn532::Pn532;
use predator::radio::cc1101::Cc1101;
use predator::{Key, MenuCatalog, SharedState};

use board::buttons::button_task;
use board::display::Ssd1306Surface;
use board::nfc::{poll_task, NfcLink, Pn532Scanner};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<peripherals::TWISPI1>;
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
});

static CATALOG: MenuCatalog = MenuCatalog::new();
static STATE: StaticCell<SharedState> = StaticCell::new();
static NFC_LINK: StaticCell<NfcLink> = StaticCell::new();
static OLED_TX_BUF: ConstStaticCell<[u8; 32]> = ConstStaticCell::new([0; 32]);
static NFC_TX_BUF: ConstStaticCell<[u8; 32]> = ConstStaticCell::new([0; 32]);

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("predator starting");

    let state: &'static SharedState = STATE.init(SharedState::new());

    // Buttons
    for (pin, key) in [
        (p.P0_11.degrade(), Key::Up),
        (p.P0_12.degrade(), Key::Down),
        (p.P0_24.degrade(), Key::Back),
    ] {
        if spawner.spawn(button_task(pin, key, state, &CATALOG)).is_err() {
            error!("Failed to spawn button task for {}", key);
        }
    }

    // OLED
    let mut twim_config = twim::Config::default();
    twim_config.frequency = twim::Frequency::K400;
    let oled_i2c = twim::Twim::new(
        p.TWISPI0,
        Irqs,
        p.P0_26,
        p.P0_27,
        twim_config,
        OLED_TX_BUF.take(),
    );
    let mut surface = Ssd1306Surface::new(oled_i2c);

    // CC1101
    let mut spim_config = spim::Config::default();
    spim_config.frequency = spim::Frequency::M4;
    spim_config.mode = spim::MODE_0;
    let spim = spim::Spim::new(p.SPI3, Irqs, p.P1_15, p.P1_14, p.P1_13, spim_config);
    let cs = Output::new(p.P1_12, Level::High, OutputDrive::Standard);
    let Ok(spi_device) = ExclusiveDevice::new_no_delay(spim, cs);
    let mut receiver = Cc1101::new(spi_device);

    // PN532
    let nfc_i2c = twim::Twim::new(
        p.TWISPI1,
        Irqs,
        p.P0_30,
        p.P0_31,
        twim::Config::default(),
        NFC_TX_BUF.take(),
    );
    let link: &'static NfcLink = NFC_LINK.init(NfcLink::new(Pn532::new(nfc_i2c, PN532_I2C_ADDRESS)));
    if spawner.spawn(poll_task(link)).is_err() {
        error!("Failed to spawn NFC poll task");
    }
    let mut scanner = Pn532Scanner::new(link);

    match predator::run(
        &CATALOG,
        state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut Delay,
    )
    .await
    {
        Ok(()) => info!("predator exited"),
        Err(e) => error!("predator failed to start: {}", e),
    }
}
