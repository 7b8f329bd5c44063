//! PN532 scanner: a background poll task plus the [`NfcScanner`] handle
//! the main loop subscribes through.
//!
//! The task runs InAutoPoll cycles only while a handler is registered.
//! Every PN532 exchange awaits the chip's ready bit on the executor
//! timer, so the other tasks keep running while it works. Events are delivered with the handler slot locked, so once
//! [`Pn532Scanner::stop`] has cleared the slot no further callback can
//! happen.

use core::cell::{Cell, RefCell};

use defmt::{debug, info, warn};
use embassy_nrf::peripherals::TWISPI1;
use embassy_nrf::twim::Twim;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant, Timer};

use predator::config::{NFC_AUTO_POLL_TIMEOUT_MS, NFC_POLL_INTERVAL_MS, NFC_READY_TIMEOUT_MS};
use predator::nfc::pn532::{
    self, Pn532, AUTO_POLL_PARAMS, IN_AUTO_POLL, RESPONSE_MAX, RF_CONFIGURATION, RF_FIELD_OFF,
    SAM_CONFIGURATION, SAM_NORMAL_MODE,
};
use predator::{NfcError, NfcScanner, ScanEvent, ScanEventHandler};

pub type Pn532Bus = Twim<'static, TWISPI1>;

/// PN532 driver and the registered handler, shared by the poll task and
/// the scanner handle.
pub struct NfcLink {
    pn532: Mutex<ThreadModeRawMutex, RefCell<Pn532<Pn532Bus>>>,
    handler: Mutex<ThreadModeRawMutex, Cell<Option<&'static dyn ScanEventHandler>>>,
}

impl NfcLink {
    pub fn new(pn532: Pn532<Pn532Bus>) -> Self {
        Self {
            pn532: Mutex::new(RefCell::new(pn532)),
            handler: Mutex::new(Cell::new(None)),
        }
    }

    fn with_pn532<R>(&self, f: impl FnOnce(&mut Pn532<Pn532Bus>) -> R) -> R {
        self.pn532.lock(|cell| f(&mut cell.borrow_mut()))
    }

    fn is_armed(&self) -> bool {
        self.handler.lock(|slot| slot.get().is_some())
    }

    fn arm(&self, handler: &'static dyn ScanEventHandler) {
        self.handler.lock(|slot| slot.set(Some(handler)));
    }

    fn disarm(&self) {
        self.handler.lock(|slot| slot.set(None));
    }

    /// Deliver `event` if a handler is still registered.
    fn dispatch(&self, event: ScanEvent) {
        self.handler.lock(|slot| {
            if let Some(handler) = slot.get() {
                handler.on_scan_event(event);
            }
        });
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<(), NfcError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.with_pn532(|p| p.is_ready())? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(NfcError::Timeout);
            }
            Timer::after_millis(1).await;
        }
    }

    /// Send `cmd`, then await the ACK and a response arriving within `timeout`.
    async fn exchange<'b>(
        &self,
        cmd: u8,
        params: &[u8],
        buf: &'b mut [u8],
        timeout: Duration,
    ) -> Result<&'b [u8], NfcError> {
        self.with_pn532(|p| p.send_command(cmd, params))?;
        self.wait_ready(Duration::from_millis(u64::from(NFC_READY_TIMEOUT_MS)))
            .await?;
        self.with_pn532(|p| p.read_ack())?;
        self.wait_ready(timeout).await?;
        self.with_pn532(|p| p.read_response(cmd, buf))
    }

    async fn configure(&self) -> Result<(), NfcError> {
        let mut buf = [0u8; RESPONSE_MAX];
        let timeout = Duration::from_millis(u64::from(NFC_READY_TIMEOUT_MS));
        self.exchange(SAM_CONFIGURATION, &SAM_NORMAL_MODE, &mut buf, timeout)
            .await?;
        Ok(())
    }

    async fn field_off(&self) -> Result<(), NfcError> {
        let mut buf = [0u8; RESPONSE_MAX];
        let timeout = Duration::from_millis(u64::from(NFC_READY_TIMEOUT_MS));
        self.exchange(RF_CONFIGURATION, &RF_FIELD_OFF, &mut buf, timeout)
            .await?;
        Ok(())
    }

    /// One InAutoPoll cycle.
    async fn poll_once(&self) -> Result<ScanEvent, NfcError> {
        let mut buf = [0u8; RESPONSE_MAX];
        let timeout = Duration::from_millis(NFC_AUTO_POLL_TIMEOUT_MS);
        let payload = self
            .exchange(IN_AUTO_POLL, &AUTO_POLL_PARAMS, &mut buf, timeout)
            .await?;
        Ok(pn532::scan_event(payload))
    }
}

/// Background NFC polling; idles while nobody is subscribed.
///
/// The SAM is configured once per subscription, before the first poll.
#[embassy_executor::task]
pub async fn poll_task(link: &'static NfcLink) -> ! {
    info!("NFC poll task started");
    let mut field_on = false;

    loop {
        Timer::after_millis(NFC_POLL_INTERVAL_MS).await;

        if !link.is_armed() {
            if field_on {
                if let Err(e) = link.field_off().await {
                    warn!("PN532 field off failed: {}", e);
                }
                field_on = false;
            }
            continue;
        }

        if !field_on {
            if let Err(e) = link.configure().await {
                warn!("PN532 SAM configuration failed: {}", e);
                link.dispatch(ScanEvent::error());
                continue;
            }
            field_on = true;
        }

        let event = match link.poll_once().await {
            Ok(event) => event,
            Err(e) => {
                warn!("NFC poll failed: {}", e);
                ScanEvent::error()
            }
        };
        debug!("NFC poll: {}", event);
        link.dispatch(event);
    }
}

/// Main-loop handle on the PN532.
pub struct Pn532Scanner {
    link: &'static NfcLink,
}

impl Pn532Scanner {
    pub fn new(link: &'static NfcLink) -> Self {
        Self { link }
    }
}

impl NfcScanner<'static> for Pn532Scanner {
    type Error = NfcError;

    /// Checks the PN532 answers on the bus, then arms the poll task.
    fn start(&mut self, handler: &'static dyn ScanEventHandler) -> Result<(), NfcError> {
        self.link.with_pn532(|p| p.is_ready())?;
        self.link.arm(handler);
        Ok(())
    }

    fn stop(&mut self) {
        self.link.disarm();
    }
}
