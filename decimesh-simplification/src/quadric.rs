//! Error quadrics
//!
//! A quadric is the symmetric 4x4 matrix `Q = [n, d]ᵗ[n, d]` of a plane with
//! unit normal `n` and offset `d`. Evaluating it at a point gives the squared
//! distance of the point to the plane; sums of quadrics give sums of squared
//! distances to several planes.

use decimesh_core::{Point3d, Vector3d};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use std::ops::{Add, AddAssign};

/// Below this absolute determinant the 3x3 block of a quadric is treated as
/// singular and no optimal point is extracted.
pub const SINGULARITY_TOLERANCE: f64 = 1e-5;

/// Symmetric 4x4 error quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    matrix: Matrix4<f64>,
}

impl Default for Quadric {
    fn default() -> Self {
        Self::zero()
    }
}

impl Quadric {
    /// The quadric that assigns zero error everywhere.
    pub fn zero() -> Self {
        Self {
            matrix: Matrix4::zeros(),
        }
    }

    /// Fundamental quadric of the plane `n·p + d = 0`.
    ///
    /// `normal` is expected to be of unit length.
    pub fn from_plane(normal: &Vector3d, offset: f64) -> Self {
        let p = Vector4::new(normal.x, normal.y, normal.z, offset);
        Self {
            matrix: p * p.transpose(),
        }
    }

    /// Raw matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Upper-left 3x3 block `A`.
    pub fn tensor(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Upper-right column `b`.
    pub fn vector(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Lower-right scalar `c`.
    pub fn offset(&self) -> f64 {
        self.matrix[(3, 3)]
    }

    /// Evaluate `pᵗAp + 2bᵗp + c`.
    pub fn evaluate(&self, point: &Point3d) -> f64 {
        let p = point.coords;
        let a = self.tensor();
        p.dot(&(a * p)) + 2.0 * self.vector().dot(&p) + self.offset()
    }

    /// Point minimizing the quadric, if the 3x3 block is well conditioned.
    ///
    /// Solves `A p = -b`. Returns `None` when `|det A|` is below
    /// [`SINGULARITY_TOLERANCE`].
    pub fn optimal_point(&self) -> Option<Point3d> {
        let a = self.tensor();
        if a.determinant().abs() < SINGULARITY_TOLERANCE {
            return None;
        }
        let inverse = a.try_inverse()?;
        let p = -(inverse * self.vector());
        if p.iter().all(|c| c.is_finite()) {
            Some(Point3d::from(p))
        } else {
            None
        }
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        Quadric {
            matrix: self.matrix + other.matrix,
        }
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        self.matrix += other.matrix;
    }
}

impl std::iter::Sum for Quadric {
    fn sum<I: Iterator<Item = Quadric>>(iter: I) -> Quadric {
        iter.fold(Quadric::zero(), |acc, q| acc + q)
    }
}
