//! Viewports: map a world of some logical size onto a rectangle of the display.
//!
//! A [`Viewport`] owns its [`Camera`]. On every resize the caller runs
//! [`Viewport::update`], which picks the screen rectangle and world size for the
//! viewport's [`ViewportKind`], pushes the rectangle to the hardware and refreshes the
//! camera. All projections go through the viewport so the camera always sees the
//! viewport's own screen rectangle (split-screen setups depend on this).

use crate::camera::Camera;
use crate::error::{CoreError, CoreResult};
use crate::graphics::{Graphics, HdpiMode};
use crate::scaling::{Scaling, check_size};
use crate::scissors;
use crate::shapes::{Rectangle, ScreenBounds};
use crate::{Mat4, Vec2, Vec3, vec2, vec3};

/// Sizing strategy of a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportKind {
    /// Fixed world size scaled into the screen with a [`Scaling`] policy, centered.
    Scaling { scaling: Scaling },
    /// Keeps at least `min_world_*` visible, extending the world on one axis to fill the
    /// screen instead of letterboxing. A `max_world_*` of 0 means unbounded.
    Extend {
        min_world_width: f32,
        min_world_height: f32,
        max_world_width: f32,
        max_world_height: f32,
        scaling: Scaling,
    },
    /// World size follows the screen size; always covers the full screen.
    Screen { units_per_pixel: f32 },
}

/// Space left between the viewport and the display edges, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Gutters {
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
    pub top: i32,
}

#[derive(Clone, Debug)]
pub struct Viewport {
    camera: Camera,
    kind: ViewportKind,
    world_width: f32,
    world_height: f32,
    bounds: ScreenBounds,
    pub hdpi: HdpiMode,
}

impl Viewport {
    fn with_kind(kind: ViewportKind, world_width: f32, world_height: f32) -> Self {
        Self {
            camera: Camera::orthographic(),
            kind,
            world_width,
            world_height,
            bounds: ScreenBounds::default(),
            hdpi: HdpiMode::default(),
        }
    }

    pub fn scaling(scaling: Scaling, world_width: f32, world_height: f32) -> CoreResult<Self> {
        check_size("world", vec2(world_width, world_height))?;
        Ok(Self::with_kind(ViewportKind::Scaling { scaling }, world_width, world_height))
    }

    /// Keeps aspect ratio and letterboxes.
    pub fn fit(world_width: f32, world_height: f32) -> CoreResult<Self> {
        Self::scaling(Scaling::Fit, world_width, world_height)
    }

    /// Keeps aspect ratio and covers the screen; part of the world may be cut off.
    pub fn fill(world_width: f32, world_height: f32) -> CoreResult<Self> {
        Self::scaling(Scaling::Fill, world_width, world_height)
    }

    /// Always covers the screen, distorting the aspect ratio.
    pub fn stretch(world_width: f32, world_height: f32) -> CoreResult<Self> {
        Self::scaling(Scaling::Stretch, world_width, world_height)
    }

    pub fn extend(min_world_width: f32, min_world_height: f32) -> CoreResult<Self> {
        Self::extend_with_max(min_world_width, min_world_height, 0.0, 0.0)
    }

    pub fn extend_with_max(
        min_world_width: f32,
        min_world_height: f32,
        max_world_width: f32,
        max_world_height: f32,
    ) -> CoreResult<Self> {
        check_size("minimum world", vec2(min_world_width, min_world_height))?;
        check_max("width", min_world_width, max_world_width)?;
        check_max("height", min_world_height, max_world_height)?;
        Ok(Self::with_kind(
            ViewportKind::Extend {
                min_world_width,
                min_world_height,
                max_world_width,
                max_world_height,
                scaling: Scaling::Fit,
            },
            min_world_width,
            min_world_height,
        ))
    }

    /// One world unit per pixel.
    pub fn screen() -> Self {
        let units_per_pixel = 1.0;
        Self::with_kind(ViewportKind::Screen { units_per_pixel }, 0.0, 0.0)
    }

    pub fn screen_with_units(units_per_pixel: f32) -> CoreResult<Self> {
        if !(units_per_pixel.is_finite() && units_per_pixel > 0.0) {
            return Err(CoreError::invalid(format!(
                "units per pixel must be positive, got {units_per_pixel}"
            )));
        }
        Ok(Self::with_kind(ViewportKind::Screen { units_per_pixel }, 0.0, 0.0))
    }

    /// Replace the default orthographic camera.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) -> Camera {
        std::mem::replace(&mut self.camera, camera)
    }

    #[inline]
    pub fn kind(&self) -> &ViewportKind {
        &self.kind
    }

    #[inline]
    pub fn kind_mut(&mut self) -> &mut ViewportKind {
        &mut self.kind
    }

    #[inline]
    pub fn world_width(&self) -> f32 {
        self.world_width
    }

    #[inline]
    pub fn world_height(&self) -> f32 {
        self.world_height
    }

    /// World units per screen pixel, for screen viewports.
    pub fn units_per_pixel(&self) -> Option<f32> {
        match self.kind {
            ViewportKind::Screen { units_per_pixel } => Some(units_per_pixel),
            _ => None,
        }
    }

    pub fn set_world_size(&mut self, world_width: f32, world_height: f32) {
        self.world_width = world_width;
        self.world_height = world_height;
    }

    #[inline]
    pub fn screen_bounds(&self) -> ScreenBounds {
        self.bounds
    }

    pub fn set_screen_bounds(&mut self, bounds: ScreenBounds) {
        self.bounds = bounds;
    }

    pub fn set_screen_position(&mut self, x: i32, y: i32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    pub fn set_screen_size(&mut self, width: i32, height: i32) {
        self.bounds.width = width;
        self.bounds.height = height;
    }

    /// Recompute screen bounds and world size for a display of the given size, then [`apply`].
    ///
    /// Callers must not pass a zero-sized screen.
    ///
    /// [`apply`]: Viewport::apply
    pub fn update(
        &mut self,
        gfx: &dyn Graphics,
        screen_width: i32,
        screen_height: i32,
        center_camera: bool,
    ) {
        let screen = vec2(screen_width as f32, screen_height as f32);
        match self.kind {
            ViewportKind::Scaling { scaling } => {
                let scaled = scaling.apply(vec2(self.world_width, self.world_height), screen);
                let (w, h) = (round(scaled.x), round(scaled.y));
                self.bounds = centered(screen_width, screen_height, w, h);
            }
            ViewportKind::Extend {
                min_world_width,
                min_world_height,
                max_world_width,
                max_world_height,
                scaling,
            } => {
                let mut world_w = min_world_width;
                let mut world_h = min_world_height;
                let scaled = scaling.apply(vec2(world_w, world_h), screen);
                let mut w = round(scaled.x);
                let mut h = round(scaled.y);
                if w < screen_width {
                    let to_viewport = h as f32 / world_h;
                    let to_world = world_h / h as f32;
                    let mut lengthen = (screen_width - w) as f32 * to_world;
                    if max_world_width > 0.0 {
                        lengthen = lengthen.min(max_world_width - min_world_width);
                    }
                    world_w += lengthen;
                    w += round(lengthen * to_viewport);
                }
                if h < screen_height {
                    let to_viewport = w as f32 / world_w;
                    let to_world = world_w / w as f32;
                    let mut lengthen = (screen_height - h) as f32 * to_world;
                    if max_world_height > 0.0 {
                        lengthen = lengthen.min(max_world_height - min_world_height);
                    }
                    world_h += lengthen;
                    h += round(lengthen * to_viewport);
                }
                self.set_world_size(world_w, world_h);
                self.bounds = centered(screen_width, screen_height, w, h);
            }
            ViewportKind::Screen { units_per_pixel } => {
                self.bounds = ScreenBounds::new(0, 0, screen_width, screen_height);
                self.set_world_size(screen.x * units_per_pixel, screen.y * units_per_pixel);
            }
        }

        log::debug!(
            "Viewport update: screen={}x{} bounds=({}, {}, {}x{}) world={}x{}",
            screen_width,
            screen_height,
            self.bounds.x,
            self.bounds.y,
            self.bounds.width,
            self.bounds.height,
            self.world_width,
            self.world_height
        );

        self.apply(gfx, center_camera);
    }

    /// Push the screen rectangle to the hardware and the world size into the camera.
    pub fn apply(&mut self, gfx: &dyn Graphics, center_camera: bool) {
        self.hdpi.apply_viewport(gfx, self.bounds);
        self.camera.viewport_width = self.world_width;
        self.camera.viewport_height = self.world_height;
        if center_camera {
            self.camera.position = vec3(self.world_width / 2.0, self.world_height / 2.0, 0.0);
        }
        self.camera.update(true);
    }

    /// Touch coordinates (top-left origin) to world coordinates.
    pub fn unproject(&self, gfx: &dyn Graphics, touch: Vec2) -> Vec2 {
        self.unproject3(gfx, vec3(touch.x, touch.y, 1.0)).truncate()
    }

    /// World coordinates to screen pixels (bottom-left origin).
    pub fn project(&self, world: Vec2) -> Vec2 {
        self.project3(vec3(world.x, world.y, 1.0)).truncate()
    }

    pub fn unproject3(&self, gfx: &dyn Graphics, screen: Vec3) -> Vec3 {
        self.camera.unproject(screen, self.bounds.as_rect(), gfx.height() as f32)
    }

    pub fn project3(&self, world: Vec3) -> Vec3 {
        self.camera.project(world, self.bounds.as_rect())
    }

    /// World coordinates (after `transform`) to screen pixels with a top-left origin.
    pub fn to_screen_coordinates(&self, gfx: &dyn Graphics, world: Vec2, transform: &Mat4) -> Vec2 {
        let p = transform.transform_point3(vec3(world.x, world.y, 0.0));
        let s = self.camera.project(p, self.bounds.as_rect());
        vec2(s.x, gfx.height() as f32 - s.y)
    }

    /// Screen-space scissor rectangle for a world-space `area`.
    pub fn calculate_scissors(&self, batch_transform: &Mat4, area: Rectangle) -> Rectangle {
        scissors::calculate_scissors(&self.camera, self.bounds.as_rect(), batch_transform, area)
    }

    pub fn gutters(&self, gfx: &dyn Graphics) -> Gutters {
        let b = self.bounds;
        Gutters {
            left: b.x,
            right: gfx.width() - (b.x + b.width),
            bottom: b.y,
            top: gfx.height() - (b.y + b.height),
        }
    }
}

fn check_max(axis: &str, min: f32, max: f32) -> CoreResult<()> {
    if max == 0.0 || (max.is_finite() && max >= min) {
        Ok(())
    } else {
        Err(CoreError::invalid(format!(
            "maximum world {axis} {max} must be 0 (unbounded) or at least the minimum {min}"
        )))
    }
}

#[inline]
fn round(v: f32) -> i32 {
    v.round() as i32
}

#[inline]
fn centered(screen_width: i32, screen_height: i32, width: i32, height: i32) -> ScreenBounds {
    ScreenBounds::new(
        (screen_width - width) / 2,
        (screen_height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessGraphics;

    #[test]
    fn fit_letterboxes_wide_screen() {
        let gfx = HeadlessGraphics::new(1000, 500);
        let mut vp = Viewport::fit(16.0, 9.0).unwrap();
        vp.update(&gfx, 1000, 500, true);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(55, 0, 889, 500));
        assert_eq!((vp.world_width(), vp.world_height()), (16.0, 9.0));
        assert_eq!(
            gfx.last_viewport(),
            Some(ScreenBounds::new(55, 0, 889, 500))
        );
        assert_eq!(vp.camera().viewport_width, 16.0);
        assert_eq!(vp.camera().position, vec3(8.0, 4.5, 0.0));
        assert_eq!(
            vp.gutters(&gfx),
            Gutters {
                left: 55,
                right: 56,
                bottom: 0,
                top: 0
            }
        );
    }

    #[test]
    fn scaling_viewports_stay_within_screen() {
        for (w, h) in [(1000, 500), (500, 1000), (1920, 1080), (333, 777)] {
            let gfx = HeadlessGraphics::new(w, h);
            for mut vp in [
                Viewport::fit(16.0, 9.0).unwrap(),
                Viewport::stretch(16.0, 9.0).unwrap(),
                Viewport::screen(),
                Viewport::extend(800.0, 600.0).unwrap(),
            ] {
                vp.update(&gfx, w, h, false);
                let b = vp.screen_bounds();
                assert!(
                    b.width <= w && b.height <= h,
                    "{:?} on {w}x{h}: {b:?}",
                    vp.kind()
                );
                assert!(b.x >= 0 && b.y >= 0);
            }
        }
    }

    #[test]
    fn fill_overflows_one_axis() {
        let gfx = HeadlessGraphics::new(1000, 500);
        let mut vp = Viewport::fill(4.0, 3.0).unwrap();
        vp.update(&gfx, 1000, 500, false);
        let b = vp.screen_bounds();
        assert_eq!((b.width, b.height), (1000, 750));
        assert_eq!((b.x, b.y), (0, -125));
    }

    #[test]
    fn stretch_fills_screen_exactly() {
        let gfx = HeadlessGraphics::new(1000, 500);
        let mut vp = Viewport::stretch(16.0, 9.0).unwrap();
        vp.update(&gfx, 1000, 500, false);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(0, 0, 1000, 500));
    }

    #[test]
    fn extend_grows_world_width_on_wide_screen() {
        let gfx = HeadlessGraphics::new(1920, 600);
        let mut vp = Viewport::extend(800.0, 600.0).unwrap();
        vp.update(&gfx, 1920, 600, true);
        assert_eq!(vp.world_height(), 600.0);
        assert!(vp.world_width() > 800.0);
        assert!((vp.world_width() - 1920.0).abs() < 1e-3);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(0, 0, 1920, 600));
    }

    #[test]
    fn extend_respects_maximum() {
        let gfx = HeadlessGraphics::new(1920, 600);
        let mut vp = Viewport::extend_with_max(800.0, 600.0, 1000.0, 0.0).unwrap();
        vp.update(&gfx, 1920, 600, true);
        assert!((vp.world_width() - 1000.0).abs() < 1e-3);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(460, 0, 1000, 600));
    }

    #[test]
    fn extend_grows_height_on_tall_screen() {
        let gfx = HeadlessGraphics::new(800, 1200);
        let mut vp = Viewport::extend(800.0, 600.0).unwrap();
        vp.update(&gfx, 800, 1200, false);
        assert_eq!(vp.world_width(), 800.0);
        assert!((vp.world_height() - 1200.0).abs() < 1e-3);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(0, 0, 800, 1200));
    }

    #[test]
    fn screen_viewport_matches_pixels() {
        let gfx = HeadlessGraphics::new(1024, 768);
        let mut vp = Viewport::screen();
        vp.update(&gfx, 1024, 768, true);
        assert_eq!(vp.world_width(), 1024.0);
        assert_eq!(vp.world_height(), 768.0);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(0, 0, 1024, 768));

        let mut half = Viewport::screen_with_units(0.5).unwrap();
        half.update(&gfx, 1024, 768, true);
        assert_eq!((half.world_width(), half.world_height()), (512.0, 384.0));
        assert_eq!(half.units_per_pixel(), Some(0.5));
        assert_eq!(Viewport::fit(4.0, 3.0).unwrap().units_per_pixel(), None);
    }

    #[test]
    fn constructors_reject_degenerate_sizes() {
        assert!(Viewport::fit(0.0, 9.0).is_err());
        assert!(Viewport::fill(16.0, -1.0).is_err());
        assert!(Viewport::extend(0.0, 600.0).is_err());
        assert!(Viewport::extend_with_max(800.0, 600.0, 400.0, 0.0).is_err());
        assert!(Viewport::screen_with_units(0.0).is_err());
    }

    #[test]
    fn unproject_inverts_project() {
        let gfx = HeadlessGraphics::new(1000, 500);
        let mut vp = Viewport::fit(16.0, 9.0).unwrap();
        vp.update(&gfx, 1000, 500, true);

        let world = vec2(4.0, 2.0);
        let screen = vp.project(world);
        // Touch input is top-left origin.
        let touch = vec2(screen.x, 500.0 - screen.y);
        let back = vp.unproject(&gfx, touch);
        assert!((back - world).length() < 1e-3, "{back}");
    }

    #[test]
    fn center_of_letterboxed_screen_is_world_center() {
        let gfx = HeadlessGraphics::new(1000, 500);
        let mut vp = Viewport::fit(16.0, 9.0).unwrap();
        vp.update(&gfx, 1000, 500, true);
        let w = vp.unproject(&gfx, vec2(55.0 + 889.0 / 2.0, 250.0));
        assert!((w - vec2(8.0, 4.5)).length() < 1e-3, "{w}");
    }

    #[test]
    fn split_screen_viewports_use_their_own_bounds() {
        let gfx = HeadlessGraphics::new(800, 400);
        let mut left = Viewport::stretch(10.0, 10.0).unwrap();
        let mut right = Viewport::stretch(10.0, 10.0).unwrap();
        left.update(&gfx, 400, 400, true);
        right.update(&gfx, 400, 400, true);
        right.set_screen_position(400, 0);
        right.apply(&gfx, true);

        let l = left.unproject(&gfx, vec2(200.0, 200.0));
        let r = right.unproject(&gfx, vec2(600.0, 200.0));
        assert!((l - vec2(5.0, 5.0)).length() < 1e-3, "{l}");
        assert!((r - vec2(5.0, 5.0)).length() < 1e-3, "{r}");
        assert_eq!(
            gfx.last_viewport(),
            Some(ScreenBounds::new(400, 0, 400, 400))
        );
    }

    #[test]
    fn to_screen_coordinates_uses_top_left_origin() {
        let gfx = HeadlessGraphics::new(800, 600);
        let mut vp = Viewport::screen();
        vp.update(&gfx, 800, 600, true);
        let s = vp.to_screen_coordinates(&gfx, vec2(100.0, 100.0), &Mat4::IDENTITY);
        assert!((s - vec2(100.0, 500.0)).length() < 1e-2, "{s}");

        let r = vp.calculate_scissors(&Mat4::IDENTITY, Rectangle::new(10.0, 20.0, 30.0, 40.0));
        assert!((r.x - 10.0).abs() < 1e-2 && (r.height - 40.0).abs() < 1e-2);
    }

    #[test]
    fn apply_scales_hardware_viewport_on_hidpi_display() {
        let gfx = HeadlessGraphics::with_back_buffer(1000, 500, 2000, 1000);
        let mut vp = Viewport::fit(16.0, 9.0).unwrap();
        vp.update(&gfx, 1000, 500, true);
        assert_eq!(vp.screen_bounds(), ScreenBounds::new(55, 0, 889, 500));
        assert_eq!(
            gfx.last_viewport(),
            Some(ScreenBounds::new(110, 0, 1778, 1000))
        );

        // Touch input stays in logical pixels.
        let w = vp.unproject(&gfx, vec2(55.0 + 889.0 / 2.0, 250.0));
        assert!((w - vec2(8.0, 4.5)).length() < 1e-3, "{w}");

        vp.hdpi = HdpiMode::Pixels;
        vp.apply(&gfx, true);
        assert_eq!(
            gfx.last_viewport(),
            Some(ScreenBounds::new(55, 0, 889, 500))
        );
    }

    #[test]
    fn update_is_idempotent() {
        let gfx = HeadlessGraphics::new(1280, 720);
        let mut vp = Viewport::extend(800.0, 600.0).unwrap();
        vp.update(&gfx, 1280, 720, true);
        let (bounds, world) = (vp.screen_bounds(), (vp.world_width(), vp.world_height()));
        vp.update(&gfx, 1280, 720, true);
        assert_eq!(vp.screen_bounds(), bounds);
        assert_eq!((vp.world_width(), vp.world_height()), world);
    }
}
