//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Midpoint of two points.
#[inline]
pub fn midpoint(a: &Point3d, b: &Point3d) -> Point3d {
    Point3d::from((a.coords + b.coords) * 0.5)
}

/// Centroid of a triangle.
#[inline]
pub fn centroid(a: &Point3d, b: &Point3d, c: &Point3d) -> Point3d {
    Point3d::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Unit normal of the triangle `(a, b, c)`, following its winding.
///
/// Returns `None` when the triangle has (near) zero area and the normal
/// cannot be normalized.
pub fn triangle_normal(a: &Point3d, b: &Point3d, c: &Point3d) -> Option<Vector3d> {
    let cross = (b - a).cross(&(c - b));
    cross.try_normalize(f64::EPSILON)
}

/// Area of the triangle `(a, b, c)`.
#[inline]
pub fn triangle_area(a: &Point3d, b: &Point3d, c: &Point3d) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}

/// Perimeter of the triangle `(a, b, c)`.
#[inline]
pub fn triangle_perimeter(a: &Point3d, b: &Point3d, c: &Point3d) -> f64 {
    (a - b).norm() + (b - c).norm() + (c - a).norm()
}
