//! 2D shapes used for screen rectangles, scissors and hit tests.

use crate::error::{CoreError, CoreResult};
use crate::{Vec2, vec2};

/// Integer pixel rectangle on the display (origin bottom-left).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenBounds {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn as_rect(&self) -> Rectangle {
        Rectangle::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// Axis-aligned float rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.x <= point.x
            && self.x + self.width >= point.x
            && self.y <= point.y
            && self.y + self.height >= point.y
    }

    pub fn overlaps(&self, other: &Rectangle) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Smallest rectangle containing both.
    pub fn merge(&self, other: &Rectangle) -> Rectangle {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Rectangle::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Simple polygon with a local-space vertex list and a 2D transform.
///
/// Transformed vertices are cached and recomputed only after a mutation.
#[derive(Clone, Debug)]
pub struct Polygon {
    local: Vec<Vec2>,
    world: Vec<Vec2>,
    dirty: bool,
    position: Vec2,
    origin: Vec2,
    rotation_deg: f32,
    scale: Vec2,
}

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> CoreResult<Self> {
        check_vertex_count(&vertices)?;
        Ok(Self {
            world: Vec::with_capacity(vertices.len()),
            local: vertices,
            dirty: true,
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            rotation_deg: 0.0,
            scale: Vec2::ONE,
        })
    }

    /// Build from a flat `[x0, y0, x1, y1, ...]` list.
    pub fn from_flat(coords: &[f32]) -> CoreResult<Self> {
        if coords.len() % 2 != 0 {
            return Err(CoreError::invalid(format!(
                "polygon coordinate list has odd length {}",
                coords.len()
            )));
        }
        Self::new(coords.chunks_exact(2).map(|c| vec2(c[0], c[1])).collect())
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.local
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec2>) -> CoreResult<()> {
        check_vertex_count(&vertices)?;
        self.local = vertices;
        self.dirty = true;
        Ok(())
    }

    pub fn set_vertex(&mut self, index: usize, vertex: Vec2) -> CoreResult<()> {
        let len = self.local.len();
        let slot = self.local.get_mut(index).ok_or_else(|| {
            CoreError::invalid(format!("vertex {index} doesn't exist (len={len})"))
        })?;
        *slot = vertex;
        self.dirty = true;
        Ok(())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.local.len()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.dirty = true;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.dirty = true;
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation_deg = degrees;
        self.dirty = true;
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.rotation_deg += degrees;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.dirty = true;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation_deg
    }

    /// Vertices with origin, scale, rotation and position applied.
    pub fn transformed_vertices(&mut self) -> &[Vec2] {
        if self.dirty {
            self.dirty = false;
            let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
            let (origin, scale, position) = (self.origin, self.scale, self.position);
            let rotate = self.rotation_deg != 0.0;
            self.world.clear();
            self.world.extend(self.local.iter().map(|&v| {
                let mut p = (v - origin) * scale;
                if rotate {
                    p = vec2(cos * p.x - sin * p.y, sin * p.x + cos * p.y);
                }
                position + p + origin
            }));
        }
        &self.world
    }

    pub fn vertex(&mut self, index: usize) -> CoreResult<Vec2> {
        let len = self.local.len();
        self.transformed_vertices()
            .get(index)
            .copied()
            .ok_or_else(|| CoreError::invalid(format!("vertex {index} doesn't exist (len={len})")))
    }

    /// Unsigned area (shoelace).
    pub fn area(&mut self) -> f32 {
        signed_area(self.transformed_vertices()).abs()
    }

    pub fn centroid(&mut self) -> Vec2 {
        let verts = self.transformed_vertices();
        let area = signed_area(verts);
        if area.abs() < f32::EPSILON {
            let sum: Vec2 = verts.iter().copied().sum();
            return sum / verts.len() as f32;
        }
        let mut c = Vec2::ZERO;
        for (i, &a) in verts.iter().enumerate() {
            let b = verts[(i + 1) % verts.len()];
            let cross = a.x * b.y - b.x * a.y;
            c += (a + b) * cross;
        }
        c / (6.0 * area)
    }

    pub fn bounding_rectangle(&mut self) -> Rectangle {
        let verts = self.transformed_vertices();
        let mut min = verts[0];
        let mut max = verts[0];
        for &v in &verts[1..] {
            min = min.min(v);
            max = max.max(v);
        }
        Rectangle::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Even-odd point-in-polygon test against the transformed vertices.
    pub fn contains(&mut self, point: Vec2) -> bool {
        let verts = self.transformed_vertices();
        let mut crossings = 0u32;
        for (i, &a) in verts.iter().enumerate() {
            let b = verts[(i + 1) % verts.len()];
            let spans = (a.y <= point.y && point.y < b.y) || (b.y <= point.y && point.y < a.y);
            if spans && point.x < (b.x - a.x) / (b.y - a.y) * (point.y - a.y) + a.x {
                crossings += 1;
            }
        }
        crossings & 1 == 1
    }
}

fn check_vertex_count(vertices: &[Vec2]) -> CoreResult<()> {
    if vertices.len() < 3 {
        return Err(CoreError::invalid(format!(
            "polygon must contain at least 3 points, got {}",
            vertices.len()
        )));
    }
    Ok(())
}

fn signed_area(verts: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    for (i, &a) in verts.iter().enumerate() {
        let b = verts[(i + 1) % verts.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_flat(&[0.0, 0.0, 2.0, 0.0, 2.0, 2.0, 0.0, 2.0]).unwrap()
    }

    #[test]
    fn rejects_fewer_than_three_points() {
        assert!(Polygon::from_flat(&[0.0, 0.0, 1.0, 1.0]).is_err());
        assert!(Polygon::from_flat(&[0.0, 0.0, 1.0]).is_err());
        let mut p = square();
        assert!(p.set_vertices(vec![Vec2::ZERO]).is_err());
        assert!(p.set_vertex(4, Vec2::ONE).is_err());
    }

    #[test]
    fn area_centroid_and_bounds() {
        let mut p = square();
        assert!((p.area() - 4.0).abs() < 1e-6);
        assert!((p.centroid() - vec2(1.0, 1.0)).length() < 1e-6);

        p.translate(vec2(10.0, 5.0));
        let r = p.bounding_rectangle();
        assert_eq!(r, Rectangle::new(10.0, 5.0, 2.0, 2.0));
    }

    #[test]
    fn rotation_about_origin() {
        let mut p = square();
        p.set_origin(vec2(1.0, 1.0));
        p.set_rotation(90.0);
        let v = p.vertex(0).unwrap();
        assert!((v - vec2(2.0, 0.0)).length() < 1e-5, "{v}");
        // Area is invariant under rotation.
        assert!((p.area() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn contains_uses_transformed_vertices() {
        let mut p = square();
        assert!(p.contains(vec2(1.0, 1.0)));
        assert!(!p.contains(vec2(3.0, 1.0)));
        p.set_scale(vec2(2.0, 2.0));
        assert!(p.contains(vec2(3.0, 1.0)));
    }

    #[test]
    fn rectangle_merge_and_overlap() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert_eq!(a.merge(&b), Rectangle::new(0.0, 0.0, 15.0, 15.0));
        assert!(!a.overlaps(&Rectangle::new(20.0, 0.0, 1.0, 1.0)));
        assert!(a.contains(a.center()));
    }
}
