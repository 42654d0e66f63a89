use crate::frustum::{Frustum, Ray};
use crate::graphics::Graphics;
use crate::shapes::Rectangle;
use crate::{Mat4, Quat, Vec3, vec3};

/// Below this, a look-at direction is treated as collinear with `up`.
const COLLINEAR_EPSILON: f32 = 1e-6;

/// Projection model used by [`Camera::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Parallel projection; `zoom` scales the visible extents.
    Orthographic { zoom: f32 },
    /// Vertical field of view in degrees.
    Perspective { field_of_view: f32 },
}

/// Camera with explicit position/direction/up vectors (right-handed, GL clip space).
///
/// Matrices are only recomputed by [`Camera::update`]; reading them after moving the
/// camera without an update gives the previous frame's values.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    /// Unit view direction.
    pub direction: Vec3,
    /// Unit up vector, orthogonal to `direction` after `look_at`/`normalize_up`.
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    /// World-space extents covered by the camera.
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub kind: Projection,

    projection: Mat4,
    view: Mat4,
    combined: Mat4,
    inv_projection_view: Mat4,
    frustum: Frustum,
}

impl Default for Camera {
    fn default() -> Self {
        Self::orthographic()
    }
}

impl Camera {
    fn with_kind(kind: Projection, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            direction: vec3(0.0, 0.0, -1.0),
            up: Vec3::Y,
            near,
            far,
            viewport_width: 0.0,
            viewport_height: 0.0,
            kind,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            combined: Mat4::IDENTITY,
            inv_projection_view: Mat4::IDENTITY,
            frustum: Frustum::default(),
        }
    }

    /// Orthographic camera with zero extents. Matrices are not computed until `update`.
    pub fn orthographic() -> Self {
        Self::with_kind(Projection::Orthographic { zoom: 1.0 }, 0.0, 100.0)
    }

    /// Orthographic camera covering `width` x `height` world units, already updated.
    pub fn orthographic_sized(width: f32, height: f32) -> Self {
        let mut camera = Self::orthographic();
        camera.viewport_width = width;
        camera.viewport_height = height;
        camera.update(true);
        camera
    }

    /// Perspective camera, already updated.
    pub fn perspective(field_of_view: f32, width: f32, height: f32) -> Self {
        let mut camera = Self::with_kind(Projection::Perspective { field_of_view }, 1.0, 100.0);
        camera.viewport_width = width;
        camera.viewport_height = height;
        camera.update(true);
        camera
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// `projection * view` as of the last update.
    #[inline]
    pub fn combined(&self) -> Mat4 {
        self.combined
    }

    /// Inverse of `combined` as of the last `update(true)`.
    #[inline]
    pub fn inv_projection_view(&self) -> Mat4 {
        self.inv_projection_view
    }

    #[inline]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Orthographic zoom, 1.0 for perspective cameras.
    #[inline]
    pub fn zoom(&self) -> f32 {
        match self.kind {
            Projection::Orthographic { zoom } => zoom,
            Projection::Perspective { .. } => 1.0,
        }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if let Projection::Orthographic { zoom: z } = &mut self.kind {
            *z = zoom;
        }
    }

    /// Recompute projection, view and combined. With `update_frustum`, also the inverse and
    /// the frustum.
    ///
    /// A singular `combined` (zero extents, `near == far`) leaves the previous inverse in place.
    pub fn update(&mut self, update_frustum: bool) {
        let (w, h) = (self.viewport_width, self.viewport_height);
        self.projection = match self.kind {
            Projection::Orthographic { zoom } => Mat4::orthographic_rh_gl(
                zoom * -w / 2.0,
                zoom * (w / 2.0),
                zoom * -(h / 2.0),
                zoom * h / 2.0,
                self.near,
                self.far,
            ),
            Projection::Perspective { field_of_view } => Mat4::perspective_rh_gl(
                field_of_view.to_radians(),
                w / h,
                self.near.abs(),
                self.far.abs(),
            ),
        };
        self.view = Mat4::look_to_rh(self.position, self.direction, self.up);
        self.combined = self.projection * self.view;

        if update_frustum {
            let det = self.combined.determinant();
            if det == 0.0 || !det.is_finite() {
                log::warn!(
                    "Singular camera matrix ({}x{}, near={}, far={}), keeping previous inverse",
                    w,
                    h,
                    self.near,
                    self.far
                );
                return;
            }
            self.inv_projection_view = self.combined.inverse();
            self.frustum.update(&self.inv_projection_view);
        }
    }

    /// Set up an orthographic view with (0,0) at the bottom-left, or top-left if `y_down`.
    pub fn set_to_ortho(&mut self, y_down: bool, viewport_width: f32, viewport_height: f32) {
        if y_down {
            self.up = vec3(0.0, -1.0, 0.0);
            self.direction = vec3(0.0, 0.0, 1.0);
        } else {
            self.up = Vec3::Y;
            self.direction = vec3(0.0, 0.0, -1.0);
        }
        let zoom = self.zoom();
        self.position = vec3(
            zoom * viewport_width / 2.0,
            zoom * viewport_height / 2.0,
            0.0,
        );
        self.viewport_width = viewport_width;
        self.viewport_height = viewport_height;
        self.update(true);
    }

    /// Point the camera at `target`. No-op if `target` coincides with the position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        let dot = dir.dot(self.up);
        if (dot - 1.0).abs() < COLLINEAR_EPSILON {
            self.up = -self.direction;
        } else if (dot + 1.0).abs() < COLLINEAR_EPSILON {
            self.up = self.direction;
        }
        self.direction = dir;
        self.normalize_up();
    }

    /// Make `up` unit length and orthogonal to `direction`; `direction` is left untouched.
    pub fn normalize_up(&mut self) {
        let right = self.direction.cross(self.up);
        let up = right.cross(self.direction).normalize_or_zero();
        if up != Vec3::ZERO {
            self.up = up;
        }
    }

    /// Rotate direction and up around `axis`. Does not re-orthonormalize; call
    /// [`Camera::normalize_up`] when accumulated drift matters.
    pub fn rotate(&mut self, axis: Vec3, degrees: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        self.rotate_quat(Quat::from_axis_angle(axis, degrees.to_radians()));
    }

    pub fn rotate_quat(&mut self, rotation: Quat) {
        self.direction = rotation * self.direction;
        self.up = rotation * self.up;
    }

    /// Rotate by the upper 3x3 part of `transform`.
    pub fn rotate_by_matrix(&mut self, transform: &Mat4) {
        self.direction = transform.transform_vector3(self.direction);
        self.up = transform.transform_vector3(self.up);
    }

    /// Orbit around `point`: position, direction and up all rotate.
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, degrees: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        let rotation = Quat::from_axis_angle(axis, degrees.to_radians());
        let offset = point - self.position;
        self.translate(offset);
        self.rotate_quat(rotation);
        self.translate(-(rotation * offset));
    }

    /// Apply `transform` to the position and rotate direction/up by it.
    pub fn transform(&mut self, transform: &Mat4) {
        self.position = transform.transform_point3(self.position);
        self.rotate_by_matrix(transform);
    }

    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// World point to screen pixels (bottom-left origin) inside `viewport`; z is depth in [0, 1].
    pub fn project(&self, world: Vec3, viewport: Rectangle) -> Vec3 {
        let ndc = self.combined.project_point3(world);
        vec3(
            viewport.width * (ndc.x + 1.0) / 2.0 + viewport.x,
            viewport.height * (ndc.y + 1.0) / 2.0 + viewport.y,
            (ndc.z + 1.0) / 2.0,
        )
    }

    /// Screen point (top-left origin, z depth in [0, 1]) to world space.
    ///
    /// `screen_height` is the full display height used to flip Y. Relies on the inverse
    /// from the last `update(true)`.
    pub fn unproject(&self, screen: Vec3, viewport: Rectangle, screen_height: f32) -> Vec3 {
        let x = screen.x - viewport.x;
        let y = screen_height - screen.y - viewport.y;
        let ndc = vec3(
            (2.0 * x) / viewport.width - 1.0,
            (2.0 * y) / viewport.height - 1.0,
            2.0 * screen.z - 1.0,
        );
        self.inv_projection_view.project_point3(ndc)
    }

    /// [`Camera::project`] onto the whole display.
    pub fn project_on(&self, gfx: &dyn Graphics, world: Vec3) -> Vec3 {
        self.project(world, full_screen(gfx))
    }

    /// [`Camera::unproject`] from the whole display.
    pub fn unproject_on(&self, gfx: &dyn Graphics, screen: Vec3) -> Vec3 {
        self.unproject(screen, full_screen(gfx), gfx.height() as f32)
    }

    /// Ray from the near plane through the given screen point (top-left origin).
    pub fn pick_ray(
        &self,
        screen_x: f32,
        screen_y: f32,
        viewport: Rectangle,
        screen_height: f32,
    ) -> Ray {
        let near = self.unproject(vec3(screen_x, screen_y, 0.0), viewport, screen_height);
        let far = self.unproject(vec3(screen_x, screen_y, 1.0), viewport, screen_height);
        Ray::new(near, far - near)
    }
}

fn full_screen(gfx: &dyn Graphics) -> Rectangle {
    Rectangle::new(0.0, 0.0, gfx.width() as f32, gfx.height() as f32)
}
