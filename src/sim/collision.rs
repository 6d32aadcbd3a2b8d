//! Geometric queries for gameplay collision
//!
//! Everything here is a pure function of its arguments. Barriers are tested on
//! the ground plane (their footprint); hostiles are approximated by spheres.
//! Not a physics engine: there is no response, only yes/no and nearest-hit.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Immutable collision footprint of a wall/crate, loaded once at world setup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticBarrier {
    /// Footprint center
    pub position: Vec3,
    /// Rotation about +Y (radians)
    pub yaw: f32,
    /// Extent along the local X axis
    pub width: f32,
    /// Extent along the local Z axis
    pub depth: f32,
}

impl StaticBarrier {
    pub fn new(position: Vec3, yaw: f32, width: f32, depth: f32) -> Self {
        Self {
            position,
            yaw,
            width,
            depth,
        }
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn half_depth(&self) -> f32 {
        self.depth / 2.0
    }

    /// Bring a world point into the barrier's unrotated frame
    #[inline]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        Quat::from_rotation_y(-self.yaw) * (point - self.position)
    }

    /// Oriented-box test of a circle of `radius` around `point`
    pub fn contains(&self, point: Vec3, radius: f32) -> bool {
        let local = self.to_local(point);
        local.x.abs() < self.half_width() + radius && local.z.abs() < self.half_depth() + radius
    }
}

/// Does a circle at `point` overlap any barrier
pub fn collides_with_barriers(point: Vec3, radius: f32, barriers: &[StaticBarrier]) -> bool {
    barriers.iter().any(|b| b.contains(point, radius))
}

/// Sphere overlap; touching spheres do not collide
#[inline]
pub fn spheres_collide(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

#[inline]
pub fn point_in_sphere(point: Vec3, center: Vec3, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Nearest forward intersection of a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter; equals world distance for a unit direction
    pub distance: f32,
    pub point: Vec3,
}

/// Intersect `origin + t * dir` with a sphere.
///
/// Takes the smaller root only: a sphere behind the origin, or one the origin
/// is already inside of, is a miss.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<RayHit> {
    let oc = origin - center;
    let a = dir.dot(dir);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    if t < 0.0 {
        return None;
    }
    Some(RayHit {
        distance: t,
        point: origin + dir * t,
    })
}

/// Closest point to `point` on the segment from `start` to `end`
pub fn closest_point_on_segment(point: Vec3, start: Vec3, end: Vec3) -> Vec3 {
    let segment = end - start;
    let length = segment.length();
    if length < 1e-6 {
        return start; // Degenerate segment
    }
    let dir = segment / length;
    let t = (point - start).dot(dir).clamp(0.0, length);
    start + dir * t
}

/// Inside the square `[-boundary, boundary]` on both ground axes
#[inline]
pub fn within_bounds(point: Vec3, boundary: f32) -> bool {
    point.x.abs() <= boundary && point.z.abs() <= boundary
}

/// Clamp both ground axes into the square boundary; height is untouched
#[inline]
pub fn clamp_to_bounds(point: Vec3, boundary: f32) -> Vec3 {
    Vec3::new(
        point.x.clamp(-boundary, boundary),
        point.y,
        point.z.clamp(-boundary, boundary),
    )
}

/// Anything with a world position that can be range-queried
pub trait Positioned {
    fn position(&self) -> Vec3;
}

/// Candidates whose position lies within `radius` of `center`, in input order
pub fn within_radius<'a, T, I>(candidates: I, center: Vec3, radius: f32) -> Vec<&'a T>
where
    T: Positioned + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let radius_sq = radius * radius;
    candidates
        .into_iter()
        .filter(|c| c.position().distance_squared(center) <= radius_sq)
        .collect()
}
