//! SSD1306 OLED as a [`Surface`].

use defmt::warn;
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::Twim;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use predator::ui::display::GraphicsCanvas;
use predator::{Canvas, Surface};

/// Concrete display driver on the first TWIM instance.
pub type Oled = Ssd1306<
    I2CInterface<Twim<'static, TWISPI0>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

pub struct Ssd1306Surface {
    canvas: GraphicsCanvas<Oled>,
}

impl Ssd1306Surface {
    pub fn new(i2c: Twim<'static, TWISPI0>) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        Self {
            canvas: GraphicsCanvas::new(display),
        }
    }
}

impl Canvas for Ssd1306Surface {
    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.canvas.draw_text(x, y, text);
    }
}

impl Surface for Ssd1306Surface {
    type Error = ();

    fn open(&mut self) -> Result<(), ()> {
        let display = self.canvas.target_mut();
        display.init().map_err(drop)?;
        display.clear_buffer();
        display.flush().map_err(drop)
    }

    fn present(&mut self) {
        if self.canvas.target_mut().flush().is_err() {
            warn!("Display flush failed");
        }
    }

    fn close(&mut self) {
        let display = self.canvas.target_mut();
        display.clear_buffer();
        let _ = display.flush();
        let _ = display.set_display_on(false);
    }
}
