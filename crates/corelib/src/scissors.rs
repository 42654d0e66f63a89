//! Nested scissor rectangles.

use crate::camera::Camera;
use crate::graphics::{Graphics, HdpiMode};
use crate::shapes::{Rectangle, ScreenBounds};
use crate::{Mat4, vec3};

/// Stack of clip rectangles in logical screen pixels. Each push is intersected with its parent.
#[derive(Debug, Default)]
pub struct ScissorStack {
    stack: Vec<Rectangle>,
    pub hdpi: HdpiMode,
}

impl ScissorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `scissor` and apply it. Returns `false` (and pushes nothing) if the clipped area
    /// is less than a pixel wide or tall.
    pub fn push(&mut self, gfx: &dyn Graphics, scissor: Rectangle) -> bool {
        let mut scissor = fix(scissor);
        match self.stack.last() {
            None => {
                if scissor.width < 1.0 || scissor.height < 1.0 {
                    return false;
                }
                gfx.set_scissor_enabled(true);
            }
            Some(parent) => {
                let min_x = parent.x.max(scissor.x);
                let max_x = (parent.x + parent.width).min(scissor.x + scissor.width);
                if max_x - min_x < 1.0 {
                    return false;
                }
                let min_y = parent.y.max(scissor.y);
                let max_y = (parent.y + parent.height).min(scissor.y + scissor.height);
                if max_y - min_y < 1.0 {
                    return false;
                }
                scissor = Rectangle::new(min_x, min_y, max_x - min_x, (max_y - min_y).max(1.0));
            }
        }
        self.stack.push(scissor);
        self.hdpi.apply_scissor(gfx, to_bounds(&scissor));
        true
    }

    /// Pop the top rectangle, restoring the parent or disabling scissoring.
    pub fn pop(&mut self, gfx: &dyn Graphics) -> Option<Rectangle> {
        let old = self.stack.pop()?;
        match self.stack.last() {
            None => gfx.set_scissor_enabled(false),
            Some(parent) => self.hdpi.apply_scissor(gfx, to_bounds(parent)),
        }
        Some(old)
    }

    pub fn peek(&self) -> Option<&Rectangle> {
        self.stack.last()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Current clip area, or the whole display when nothing is pushed.
    pub fn current_viewport(&self, gfx: &dyn Graphics) -> Rectangle {
        self.stack.last().copied().unwrap_or_else(|| {
            Rectangle::new(0.0, 0.0, gfx.width() as f32, gfx.height() as f32)
        })
    }
}

/// Map a world-space `area` (after `batch_transform`) to a screen-space scissor rectangle.
pub fn calculate_scissors(
    camera: &Camera,
    viewport: Rectangle,
    batch_transform: &Mat4,
    area: Rectangle,
) -> Rectangle {
    let min = batch_transform.transform_point3(vec3(area.x, area.y, 0.0));
    let min = camera.project(min, viewport);
    let max =
        batch_transform.transform_point3(vec3(area.x + area.width, area.y + area.height, 0.0));
    let max = camera.project(max, viewport);
    Rectangle::new(min.x, min.y, max.x - min.x, max.y - min.y)
}

/// Round to whole pixels and make width/height non-negative.
fn fix(rect: Rectangle) -> Rectangle {
    let mut r = Rectangle::new(
        rect.x.round(),
        rect.y.round(),
        rect.width.round(),
        rect.height.round(),
    );
    if r.width < 0.0 {
        r.width = -r.width;
        r.x -= r.width;
    }
    if r.height < 0.0 {
        r.height = -r.height;
        r.y -= r.height;
    }
    r
}

fn to_bounds(r: &Rectangle) -> ScreenBounds {
    ScreenBounds::new(r.x as i32, r.y as i32, r.width as i32, r.height as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessGraphics;

    #[test]
    fn nested_push_intersects_and_pop_restores() {
        let gfx = HeadlessGraphics::new(800, 600);
        let mut stack = ScissorStack::new();

        assert!(stack.push(&gfx, Rectangle::new(0.0, 0.0, 400.0, 300.0)));
        assert!(gfx.scissor_enabled());
        assert!(stack.push(&gfx, Rectangle::new(200.0, 100.0, 400.0, 400.0)));
        assert_eq!(
            gfx.last_scissor(),
            Some(ScreenBounds::new(200, 100, 200, 200))
        );

        stack.pop(&gfx);
        assert_eq!(gfx.last_scissor(), Some(ScreenBounds::new(0, 0, 400, 300)));
        stack.pop(&gfx);
        assert!(!gfx.scissor_enabled());
        assert!(stack.pop(&gfx).is_none());
    }

    #[test]
    fn rejects_sub_pixel_areas() {
        let gfx = HeadlessGraphics::new(800, 600);
        let mut stack = ScissorStack::new();
        assert!(!stack.push(&gfx, Rectangle::new(0.0, 0.0, 0.2, 50.0)));
        assert!(stack.is_empty());

        assert!(stack.push(&gfx, Rectangle::new(0.0, 0.0, 100.0, 100.0)));
        assert!(!stack.push(&gfx, Rectangle::new(200.0, 0.0, 50.0, 50.0)));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn negative_sizes_are_normalized() {
        let gfx = HeadlessGraphics::new(800, 600);
        let mut stack = ScissorStack::new();
        assert!(stack.push(&gfx, Rectangle::new(100.0, 100.0, -50.0, -20.0)));
        assert_eq!(stack.peek(), Some(&Rectangle::new(50.0, 80.0, 50.0, 20.0)));
    }

    #[test]
    fn scissors_follow_camera_mapping() {
        let mut cam = Camera::orthographic();
        cam.set_to_ortho(false, 400.0, 300.0);
        let viewport = Rectangle::new(0.0, 0.0, 800.0, 600.0);
        let area = Rectangle::new(100.0, 50.0, 100.0, 100.0);
        let r = calculate_scissors(&cam, viewport, &Mat4::IDENTITY, area);
        assert!((r.x - 200.0).abs() < 1e-2);
        assert!((r.y - 100.0).abs() < 1e-2);
        assert!((r.width - 200.0).abs() < 1e-2);
        assert!((r.height - 200.0).abs() < 1e-2);
    }
}
