//! Clip volume planes and picking rays.

use crate::{Mat4, Vec3, vec3};

/// Plane `normal · p + d = 0`. Points with positive distance are on the front side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane through three points, normal = (a - b) x (b - c).
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (a - b).cross(b - c).normalize_or_zero();
        Self {
            normal,
            d: -a.dot(normal),
        }
    }

    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    #[inline]
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }
}

/// NDC cube corners: near face first (z = -1), counter-clockwise from bottom-left.
const CLIP_CORNERS: [Vec3; 8] = [
    vec3(-1.0, -1.0, -1.0),
    vec3(1.0, -1.0, -1.0),
    vec3(1.0, 1.0, -1.0),
    vec3(-1.0, 1.0, -1.0),
    vec3(-1.0, -1.0, 1.0),
    vec3(1.0, -1.0, 1.0),
    vec3(1.0, 1.0, 1.0),
    vec3(-1.0, 1.0, 1.0),
];

/// Corner index triples per plane: near, far, left, right, top, bottom.
const PLANE_CORNERS: [[usize; 3]; 6] = [
    [1, 0, 2],
    [4, 5, 7],
    [0, 4, 3],
    [5, 1, 6],
    [2, 3, 6],
    [4, 0, 1],
];

/// Six planes bounding what a camera sees, all facing inwards.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
    pub corners: [Vec3; 8],
}

impl Default for Frustum {
    fn default() -> Self {
        let mut frustum = Self {
            planes: [Plane::new(Vec3::ZERO, 0.0); 6],
            corners: CLIP_CORNERS,
        };
        frustum.update(&Mat4::IDENTITY);
        frustum
    }
}

impl Frustum {
    /// Rebuild planes from an inverse projection-view matrix.
    pub fn update(&mut self, inv_projection_view: &Mat4) {
        for (corner, clip) in self.corners.iter_mut().zip(CLIP_CORNERS) {
            *corner = inv_projection_view.project_point3(clip);
        }
        let center = self.corners.iter().copied().sum::<Vec3>() / 8.0;
        for (plane, [a, b, c]) in self.planes.iter_mut().zip(PLANE_CORNERS) {
            let p = Plane::from_points(self.corners[a], self.corners[b], self.corners[c]);
            // Handedness of the matrix decides winding; orient every plane towards the inside.
            *plane = if p.distance(center) < 0.0 {
                p.flipped()
            } else {
                p
            };
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance(point) >= 0.0)
    }

    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes.iter().all(|p| p.distance(center) >= -radius)
    }

    /// Conservative AABB test: true if any part of the box may be inside.
    pub fn contains_bounds(&self, center: Vec3, half_extents: Vec3) -> bool {
        self.planes.iter().all(|p| {
            let reach = half_extents.dot(p.normal.abs());
            p.distance(center) >= -reach
        })
    }
}

/// Half-line from `origin` along unit `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to the plane, if it is hit in front of the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < f32::EPSILON {
            return None;
        }
        let t = -plane.distance(self.origin) / denom;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_frustum_is_the_clip_cube() {
        let f = Frustum::default();
        assert!(f.contains_point(Vec3::ZERO));
        assert!(f.contains_point(vec3(0.99, -0.99, 0.5)));
        assert!(!f.contains_point(vec3(1.5, 0.0, 0.0)));
        assert!(!f.contains_point(vec3(0.0, 0.0, -1.5)));
    }

    #[test]
    fn sphere_and_bounds_overlap_edges() {
        let f = Frustum::default();
        assert!(f.contains_sphere(vec3(1.4, 0.0, 0.0), 0.5));
        assert!(!f.contains_sphere(vec3(1.6, 0.0, 0.0), 0.5));
        assert!(f.contains_bounds(vec3(1.4, 0.0, 0.0), Vec3::splat(0.5)));
        assert!(!f.contains_bounds(vec3(3.0, 0.0, 0.0), Vec3::splat(0.5)));
    }

    #[test]
    fn ray_hits_plane_in_front_only() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let ray = Ray::new(vec3(0.0, 0.0, 5.0), vec3(0.0, 0.0, -2.0));
        let t = ray.intersect_plane(&plane).unwrap();
        assert!((t - 5.0).abs() < 1e-6);
        assert_eq!(ray.at(t), Vec3::ZERO);

        let away = Ray::new(vec3(0.0, 0.0, 5.0), Vec3::Z);
        assert!(away.intersect_plane(&plane).is_none());
    }
}
