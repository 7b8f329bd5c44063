//! User interface - key input, rendering and the drawing surface.
//!
//! ## Components
//!
//! - **Input router** (`input_logic`): turns key presses into menu
//!   navigation or a quit request.
//! - **Renderer** (`render`): draws the selected entry from a state snapshot.
//! - **Display** (`display`): `Canvas` over any embedded-graphics target.

pub mod display;
pub mod input_logic;
pub mod render;

/// Physical keys of the handheld.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Back,
}

/// Transition reported for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputType {
    Press,
    Release,
    Short,
    Long,
    Repeat,
}

/// One discrete input event as delivered by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEvent {
    pub kind: InputType,
    pub key: Key,
}

impl InputEvent {
    pub const fn new(kind: InputType, key: Key) -> Self {
        Self { kind, key }
    }

    pub const fn press(key: Key) -> Self {
        Self::new(InputType::Press, key)
    }
}

/// Text drawing primitives needed by the renderer.
pub trait Canvas {
    fn clear(&mut self);

    /// Draw `text` with its baseline at `y`.
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
}

/// A canvas backed by a physical screen that must be opened and closed.
pub trait Surface: Canvas {
    type Error;

    /// Power up and clear the screen.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Push the drawn frame to the screen.
    fn present(&mut self);

    /// Blank the screen and power it down.
    fn close(&mut self);
}
