//! GPIO button input with async debouncing.
//!
//! Three physical buttons (active-low with internal pull-up):
//!   - UP   - previous menu entry
//!   - DOWN - next menu entry
//!   - BACK - quit
//!
//! Each button is handled by its own task that waits for a GPIO edge,
//! debounces it and routes the event straight into the shared state.

use defmt::info;
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};

use predator::config::BUTTON_DEBOUNCE_MS;
use predator::ui::input_logic::on_key_press;
use predator::{InputEvent, InputType, Key, MenuCatalog, SharedState};

/// Run a single button polling loop.
///
/// A debounced falling edge reports `Press`, the following rising edge
/// reports `Release`.
#[embassy_executor::task(pool_size = 3)]
pub async fn button_task(
    pin: AnyPin,
    key: Key,
    state: &'static SharedState,
    catalog: &'static MenuCatalog,
) -> ! {
    let mut btn = Input::new(pin, Pull::Up);
    info!("Button task for {} started", key);

    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            on_key_press(state, catalog, InputEvent::press(key));

            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
            on_key_press(state, catalog, InputEvent::new(InputType::Release, key));
        }
    }
}
