//! Core types: math re-exports, cameras, viewports and scaling policies.

pub use glam::{Mat4, Quat, Vec2, Vec3, vec2, vec3};

pub mod camera;
pub mod error;
pub mod frustum;
pub mod graphics;
pub mod scaling;
pub mod scissors;
pub mod shapes;
pub mod viewport;

pub use camera::{Camera, Projection};
pub use error::{CoreError, CoreResult};
pub use frustum::{Frustum, Plane, Ray};
pub use graphics::{Graphics, HdpiMode, HeadlessGraphics};
pub use scaling::Scaling;
pub use scissors::ScissorStack;
pub use shapes::{Polygon, Rectangle, ScreenBounds};
pub use viewport::{Gutters, Viewport, ViewportKind};
