//! Mesh decimation by incremental vertex-pair contraction
//!
//! This crate reduces the triangle count of a mesh by repeatedly joining two
//! adjacent vertices into one:
//! - An arena-backed topology store with explicit adjacency
//! - Pluggable cost policies (quadric error, angle sum, random)
//! - A scheduler driving the policy down to a triangle target

pub mod quadric;
pub mod topology;
pub mod policy;
pub mod scheduler;
pub mod decimator;

pub use quadric::*;
pub use topology::*;
pub use policy::*;
pub use scheduler::*;
pub use decimator::*;

use decimesh_core::{Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Simplify mesh by removing `reduction_ratio` of its triangles, in (0.0, 1.0]
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh>;
}
