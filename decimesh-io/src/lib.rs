//! Mesh I/O for decimesh
//!
//! Reads and writes the plain-text OBJ subset the decimator consumes and
//! produces. The path-level functions dispatch on the file extension through
//! a default [`IoRegistry`].

pub mod obj;
pub mod registry;

pub use obj::{ObjReader, ObjWriter, READ_STAGE, WRITE_STAGE};
pub use registry::{IoRegistry, MeshReader, MeshWriter};

use decimesh_core::{NoProgress, ProgressListener, Result, TriangleMesh};
use std::path::Path;

/// Auto-detect format and read mesh
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    read_mesh_with_progress(path, &mut NoProgress)
}

/// Auto-detect format and read mesh, reporting progress
pub fn read_mesh_with_progress<P: AsRef<Path>>(
    path: P,
    progress: &mut dyn ProgressListener,
) -> Result<TriangleMesh> {
    IoRegistry::with_defaults().read_mesh(path.as_ref(), progress)
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    write_mesh_with_progress(mesh, path, &mut NoProgress)
}

/// Auto-detect format and write mesh, reporting progress
pub fn write_mesh_with_progress<P: AsRef<Path>>(
    mesh: &TriangleMesh,
    path: P,
    progress: &mut dyn ProgressListener,
) -> Result<()> {
    IoRegistry::with_defaults().write_mesh(mesh, path.as_ref(), progress)
}
