//! Display collaborator: screen size queries and the hardware viewport/scissor calls.
//!
//! The core never talks to a GPU directly. A backend implements [`Graphics`]; the
//! [`HeadlessGraphics`] implementation just records what it was asked to do.

use std::cell::Cell;

use crate::shapes::ScreenBounds;

/// Screen-size provider plus the two side-effecting rectangle calls the core needs.
pub trait Graphics {
    /// Logical width in pixels.
    fn width(&self) -> i32;
    /// Logical height in pixels. Flips Y between top-left input and bottom-left world origins.
    fn height(&self) -> i32;

    fn back_buffer_width(&self) -> i32 {
        self.width()
    }

    fn back_buffer_height(&self) -> i32 {
        self.height()
    }

    /// Set the hardware viewport, in back-buffer pixels.
    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32);

    /// Set the hardware scissor rectangle, in back-buffer pixels.
    fn set_scissor(&self, x: i32, y: i32, width: i32, height: i32);

    fn set_scissor_enabled(&self, enabled: bool);
}

/// How rectangles given in logical coordinates reach the back buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HdpiMode {
    /// Coordinates are logical and get scaled to back-buffer pixels when sizes differ.
    #[default]
    Logical,
    /// Coordinates are already back-buffer pixels.
    Pixels,
}

impl HdpiMode {
    pub fn to_back_buffer_x(gfx: &dyn Graphics, logical_x: i32) -> i32 {
        (logical_x as f32 * gfx.back_buffer_width() as f32 / gfx.width() as f32) as i32
    }

    pub fn to_back_buffer_y(gfx: &dyn Graphics, logical_y: i32) -> i32 {
        (logical_y as f32 * gfx.back_buffer_height() as f32 / gfx.height() as f32) as i32
    }

    pub fn to_logical_x(gfx: &dyn Graphics, back_buffer_x: i32) -> i32 {
        (back_buffer_x as f32 * gfx.width() as f32 / gfx.back_buffer_width() as f32) as i32
    }

    pub fn to_logical_y(gfx: &dyn Graphics, back_buffer_y: i32) -> i32 {
        (back_buffer_y as f32 * gfx.height() as f32 / gfx.back_buffer_height() as f32) as i32
    }

    /// Convert a rectangle for the hardware, honoring this mode.
    pub fn to_back_buffer(self, gfx: &dyn Graphics, rect: ScreenBounds) -> ScreenBounds {
        let scaled =
            gfx.width() != gfx.back_buffer_width() || gfx.height() != gfx.back_buffer_height();
        if self == HdpiMode::Logical && scaled {
            ScreenBounds::new(
                Self::to_back_buffer_x(gfx, rect.x),
                Self::to_back_buffer_y(gfx, rect.y),
                Self::to_back_buffer_x(gfx, rect.width),
                Self::to_back_buffer_y(gfx, rect.height),
            )
        } else {
            rect
        }
    }

    pub fn apply_viewport(self, gfx: &dyn Graphics, rect: ScreenBounds) {
        let r = self.to_back_buffer(gfx, rect);
        gfx.set_viewport(r.x, r.y, r.width, r.height);
    }

    pub fn apply_scissor(self, gfx: &dyn Graphics, rect: ScreenBounds) {
        let r = self.to_back_buffer(gfx, rect);
        gfx.set_scissor(r.x, r.y, r.width, r.height);
    }
}

/// Fixed-size display with no GPU behind it.
#[derive(Debug)]
pub struct HeadlessGraphics {
    pub width: i32,
    pub height: i32,
    pub back_buffer_width: i32,
    pub back_buffer_height: i32,
    viewport: Cell<Option<ScreenBounds>>,
    scissor: Cell<Option<ScreenBounds>>,
    scissor_enabled: Cell<bool>,
}

impl HeadlessGraphics {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_back_buffer(width, height, width, height)
    }

    pub fn with_back_buffer(width: i32, height: i32, back_width: i32, back_height: i32) -> Self {
        Self {
            width,
            height,
            back_buffer_width: back_width,
            back_buffer_height: back_height,
            viewport: Cell::new(None),
            scissor: Cell::new(None),
            scissor_enabled: Cell::new(false),
        }
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.back_buffer_width = width;
        self.back_buffer_height = height;
    }

    /// Last rectangle passed to [`Graphics::set_viewport`].
    pub fn last_viewport(&self) -> Option<ScreenBounds> {
        self.viewport.get()
    }

    pub fn last_scissor(&self) -> Option<ScreenBounds> {
        self.scissor.get()
    }

    pub fn scissor_enabled(&self) -> bool {
        self.scissor_enabled.get()
    }
}

impl Graphics for HeadlessGraphics {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn back_buffer_width(&self) -> i32 {
        self.back_buffer_width
    }

    fn back_buffer_height(&self) -> i32 {
        self.back_buffer_height
    }

    fn set_viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.viewport.set(Some(ScreenBounds::new(x, y, width, height)));
    }

    fn set_scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.scissor.set(Some(ScreenBounds::new(x, y, width, height)));
    }

    fn set_scissor_enabled(&self, enabled: bool) {
        self.scissor_enabled.set(enabled);
    }
}
