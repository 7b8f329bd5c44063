//! nRF52840 glue: peripherals behind the library traits, and the
//! background tasks that feed the shared state.

pub mod buttons;
pub mod display;
pub mod nfc;
