//! # decimesh
//!
//! Triangle mesh decimation by incremental vertex-pair contraction.
//!
//! This is the umbrella crate that provides convenient access to all decimesh
//! functionality. Use the individual crates for more granular control over
//! dependencies.
//!
//! ## Features
//!
//! - **Core**: Flat triangle mesh, errors and the progress contract
//! - **I/O**: Reading and writing the OBJ triangle subset
//! - **Simplification**: Topology store, cost policies and the decimation loop
//!
//! ## Quick Start
//!
//! ```rust
//! use decimesh::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut mesh = TriangleMesh::new();
//! for y in 0..5 {
//!     for x in 0..5 {
//!         mesh.add_vertex(Point3d::new(x as f64, y as f64, 0.0));
//!     }
//! }
//! for y in 0..4 {
//!     for x in 0..4 {
//!         let v = y * 5 + x;
//!         mesh.add_face([v, v + 5, v + 1]);
//!         mesh.add_face([v + 1, v + 5, v + 6]);
//!     }
//! }
//!
//! let options = DecimateOptions::with_target_ratio(0.5).method(Method::Qem);
//! let result = decimate(&mesh, &options, NoProgress)?;
//! assert!(result.mesh.face_count() <= 16);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io and simplification
//! - `io`: File format support
//! - `simplification`: The decimation engine
//! - `all`: Enables all features

// Re-export core functionality
pub use decimesh_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use decimesh_io as io;

#[cfg(feature = "simplification")]
pub use decimesh_simplification as simplification;

/// Convenient imports for common use cases
pub mod prelude {
    pub use decimesh_core::*;

    #[cfg(feature = "io")]
    pub use decimesh_io::{read_mesh, write_mesh, ObjReader, ObjWriter};

    #[cfg(feature = "simplification")]
    pub use decimesh_simplification::{
        decimate, DecimateOptions, Decimation, Decimator, JoinPosition, MeshSimplifier, MeshStats,
        Method, Target, TopologyMesh,
    };
}
