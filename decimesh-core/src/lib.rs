//! Core data structures and traits for decimesh
//!
//! This crate provides the fundamental types shared by the decimation engine,
//! the wire format reader/writer and the command-line tool: the flat
//! triangle mesh, point aliases, the error type and the progress contract.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod progress;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use progress::*;
pub use error::*;
