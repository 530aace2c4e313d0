//! Extension-keyed registry of mesh readers and writers
//!
//! Callers that only know a path go through [`IoRegistry`], which picks the
//! handler from the file extension. New formats are added by registering a
//! [`MeshReader`] or [`MeshWriter`] under their extension.

use crate::obj::{ObjReader, ObjWriter};
use decimesh_core::{Error, ProgressListener, Result, TriangleMesh};
use std::collections::HashMap;
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader: Send + Sync {
    /// Read a mesh from the given path
    fn read_mesh(&self, path: &Path, progress: &mut dyn ProgressListener) -> Result<TriangleMesh>;

    /// Get the format name this reader handles
    fn format_name(&self) -> &'static str;
}

/// Trait for writing meshes to files
pub trait MeshWriter: Send + Sync {
    /// Write a mesh to the given path
    fn write_mesh(
        &self,
        mesh: &TriangleMesh,
        path: &Path,
        progress: &mut dyn ProgressListener,
    ) -> Result<()>;

    /// Get the format name this writer handles
    fn format_name(&self) -> &'static str;
}

/// IO registry that maps file extensions to format handlers
pub struct IoRegistry {
    mesh_readers: HashMap<String, Box<dyn MeshReader>>,
    mesh_writers: HashMap<String, Box<dyn MeshWriter>>,
}

impl IoRegistry {
    /// Create a new empty IO registry
    pub fn new() -> Self {
        Self {
            mesh_readers: HashMap::new(),
            mesh_writers: HashMap::new(),
        }
    }

    /// Registry with every built-in format registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_mesh_reader("obj", Box::new(ObjReader));
        registry.register_mesh_writer("obj", Box::new(ObjWriter));
        registry
    }

    /// Register a mesh reader for a specific extension
    pub fn register_mesh_reader(&mut self, format: &str, handler: Box<dyn MeshReader>) {
        self.mesh_readers.insert(format.to_lowercase(), handler);
    }

    /// Register a mesh writer for a specific extension
    pub fn register_mesh_writer(&mut self, format: &str, handler: Box<dyn MeshWriter>) {
        self.mesh_writers.insert(format.to_lowercase(), handler);
    }

    /// Read a mesh with the reader registered for the path's extension
    pub fn read_mesh(
        &self,
        path: &Path,
        progress: &mut dyn ProgressListener,
    ) -> Result<TriangleMesh> {
        let format = extension_of(path)?;
        let reader = self.mesh_readers.get(&format).ok_or_else(|| {
            Error::UnsupportedFormat(format!("No mesh reader found for format: {format}"))
        })?;
        reader.read_mesh(path, progress)
    }

    /// Write a mesh with the writer registered for the path's extension
    pub fn write_mesh(
        &self,
        mesh: &TriangleMesh,
        path: &Path,
        progress: &mut dyn ProgressListener,
    ) -> Result<()> {
        let format = extension_of(path)?;
        let writer = self.mesh_writers.get(&format).ok_or_else(|| {
            Error::UnsupportedFormat(format!("No mesh writer found for format: {format}"))
        })?;
        writer.write_mesh(mesh, path, progress)
    }

    /// Get a sorted list of readable mesh formats
    pub fn supported_mesh_formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.mesh_readers.keys().cloned().collect();
        formats.sort();
        formats
    }

    /// Check if a format is supported for reading meshes
    pub fn supports_mesh_reading(&self, format: &str) -> bool {
        self.mesh_readers.contains_key(&format.to_lowercase())
    }

    /// Check if a format is supported for writing meshes
    pub fn supports_mesh_writing(&self, format: &str) -> bool {
        self.mesh_writers.contains_key(&format.to_lowercase())
    }
}

impl Default for IoRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn extension_of(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| {
            Error::UnsupportedFormat(format!("No file extension on {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use decimesh_core::NoProgress;

    #[test]
    fn test_default_registry() {
        let registry = IoRegistry::default();
        assert_eq!(registry.supported_mesh_formats(), vec!["obj".to_string()]);
        assert!(registry.supports_mesh_reading("OBJ"));
        assert!(registry.supports_mesh_writing("obj"));
        assert!(!registry.supports_mesh_reading("ply"));
    }

    #[test]
    fn test_unknown_extension() {
        let registry = IoRegistry::with_defaults();
        let result = registry.read_mesh(Path::new("model.ply"), &mut NoProgress);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));

        let result = registry.write_mesh(&TriangleMesh::new(), Path::new("model"), &mut NoProgress);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_empty_registry() {
        let registry = IoRegistry::new();
        assert!(registry.supported_mesh_formats().is_empty());
        let result = registry.read_mesh(Path::new("model.obj"), &mut NoProgress);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
