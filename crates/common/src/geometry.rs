use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box defined by min and max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// An inverted box that any `expand` call will overwrite.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Parametric distance below which a triangle hit is treated as parallel/degenerate.
const TRIANGLE_EPSILON: f32 = 1e-7;

impl Ray {
    /// Create a ray. The direction is normalized; a zero direction yields a
    /// ray that hits nothing.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test. Returns the entry distance (clamped to 0 when the origin is
    /// inside the box).
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        if self.direction == Vec3::ZERO {
            return None;
        }
        let inv = self.direction.recip();
        let t1 = (aabb.min - self.origin) * inv;
        let t2 = (aabb.max - self.origin) * inv;

        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }

    /// Nearest non-negative hit with a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        if self.direction == Vec3::ZERO {
            return None;
        }
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt = disc.sqrt();
        let t0 = -b - sqrt;
        let t1 = -b + sqrt;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(0.0)
        } else {
            None
        }
    }

    /// Möller–Trumbore ray/triangle test, two-sided.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < TRIANGLE_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_hit_and_miss() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let hit = Ray::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::X).intersect_aabb(&aabb);
        assert!((hit.unwrap() - 2.0).abs() < 1e-5);

        let miss = Ray::new(Vec3::new(-2.0, 5.0, 0.5), Vec3::X).intersect_aabb(&aabb);
        assert!(miss.is_none());
    }

    #[test]
    fn aabb_behind_origin_is_missed() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::new(3.0, 0.5, 0.5), Vec3::X);
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn aabb_inside_clamps_to_zero() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let ray = Ray::new(Vec3::splat(0.5), Vec3::Y);
        assert_eq!(ray.intersect_aabb(&aabb), Some(0.0));
    }

    #[test]
    fn sphere_hit_distance() {
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y);
        let t = ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap();
        assert!((t - 8.0).abs() < 1e-5);
        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 2.0).is_none());
    }

    #[test]
    fn triangle_hit_from_above() {
        let ray = Ray::new(Vec3::new(0.25, 5.0, 0.25), -Vec3::Y);
        let t = ray
            .intersect_triangle(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert!(ray.at(t).y.abs() < 1e-5);
    }

    #[test]
    fn triangle_miss_outside_edges() {
        let ray = Ray::new(Vec3::new(0.9, 5.0, 0.9), -Vec3::Y);
        assert!(
            ray.intersect_triangle(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0))
                .is_none()
        );
    }

    #[test]
    fn expand_grows_empty_box() {
        let mut aabb = Aabb::empty();
        aabb.expand(Vec3::new(1.0, 2.0, 3.0));
        aabb.expand(Vec3::new(-1.0, 0.0, 5.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 5.0));
        assert!(aabb.contains_point(Vec3::new(0.0, 1.0, 4.0)));
    }
}
