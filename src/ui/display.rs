//! `Canvas` implementation over embedded-graphics.
//!
//! Works with any monochrome `DrawTarget` - the SSD1306 buffer on the
//! device, `MockDisplay` on the host.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use crate::ui::Canvas;

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Draws text onto a `BinaryColor` draw target.
///
/// Draw errors are dropped: a buffered target cannot fail, and a lost
/// frame is replaced on the next tick.
pub struct GraphicsCanvas<T> {
    target: T,
}

impl<T> GraphicsCanvas<T>
where
    T: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_inner(self) -> T {
        self.target
    }
}

impl<T> Canvas for GraphicsCanvas<T>
where
    T: DrawTarget<Color = BinaryColor>,
{
    fn clear(&mut self) {
        let _ = self.target.clear(BinaryColor::Off);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        let _ = Text::new(text, Point::new(x, y), text_style()).draw(&mut self.target);
    }
}
