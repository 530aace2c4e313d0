//! Decimation entry point
//!
//! Loads a flat mesh into a topology store, runs the scheduler with the
//! selected cost policy, optionally cleans up degenerate triangles, and
//! exports the result.

use crate::policy::{AngleSumPolicy, CostPolicy, JoinPosition, QemPolicy, RandomPolicy};
use crate::scheduler::{ContractionScheduler, RunReport};
use crate::topology::{MeshStats, TopologyMesh, DEFAULT_DEGENERATE_EPSILON};
use crate::MeshSimplifier;
use decimesh_core::{Error, NoProgress, ProgressListener, Result, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// How far to decimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Stop at this many triangles.
    Triangles(usize),
    /// Remove this fraction of the triangles, in `(0, 1]`.
    Ratio(f64),
}

impl Target {
    /// Absolute triangle target for a mesh of `triangles` triangles.
    ///
    /// A ratio `r` maps to `round(triangles * (1 - r))`.
    pub fn resolve(&self, triangles: usize) -> Result<usize> {
        match *self {
            Target::Triangles(n) => Ok(n),
            Target::Ratio(r) if r > 0.0 && r <= 1.0 => {
                Ok((triangles as f64 * (1.0 - r)).round() as usize)
            }
            Target::Ratio(r) => Err(Error::invalid_target(
                0,
                triangles,
                format!("ratio {} is outside (0, 1]", r),
            )),
        }
    }
}

/// Cost policy used to pick contractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Quadric error metric.
    #[default]
    Qem,
    /// Angle-sum flatness.
    AngleSum,
    /// Random nearest-neighbor.
    Random,
}

impl Method {
    /// Short command-line name.
    pub fn short_name(&self) -> &'static str {
        match self {
            Method::Qem => "qem",
            Method::AngleSum => "asem",
            Method::Random => "rem",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "qem" => Ok(Method::Qem),
            "asem" | "angle-sum" => Ok(Method::AngleSum),
            "rem" | "random" => Ok(Method::Random),
            other => Err(Error::InvalidData(format!("unknown decimation method '{}'", other))),
        }
    }
}

/// Parameters of a decimation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimateOptions {
    pub target: Target,
    pub method: Method,
    /// Placement of the surviving vertex for [`Method::AngleSum`].
    pub join_position: JoinPosition,
    /// Seed for [`Method::Random`].
    pub seed: u64,
    /// Collapse triangles at or below this area after the run.
    pub degenerate_epsilon: Option<f64>,
}

impl Default for DecimateOptions {
    fn default() -> Self {
        Self {
            target: Target::Ratio(0.5),
            method: Method::default(),
            join_position: JoinPosition::default(),
            seed: 0,
            degenerate_epsilon: None,
        }
    }
}

impl DecimateOptions {
    #[must_use]
    pub fn with_target_triangles(count: usize) -> Self {
        Self {
            target: Target::Triangles(count),
            ..Default::default()
        }
    }

    /// Remove `ratio` of the triangles.
    #[must_use]
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target: Target::Ratio(ratio),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn join_position(mut self, join_position: JoinPosition) -> Self {
        self.join_position = join_position;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable the degenerate cleanup pass with `epsilon`.
    #[must_use]
    pub fn with_degenerate_epsilon(mut self, epsilon: f64) -> Self {
        self.degenerate_epsilon = Some(epsilon);
        self
    }

    /// Enable the degenerate cleanup pass with the default epsilon.
    #[must_use]
    pub fn with_degenerate_cleanup(self) -> Self {
        self.with_degenerate_epsilon(DEFAULT_DEGENERATE_EPSILON)
    }
}

/// Result of a decimation run.
#[derive(Debug, Clone)]
pub struct Decimation {
    pub mesh: TriangleMesh,
    pub report: RunReport,
    /// Statistics of the store after the run and cleanup. Isolated vertices
    /// are counted here but left out of `mesh`.
    pub stats: MeshStats,
    /// Triangles deleted by the cleanup pass.
    pub degenerate_removed: usize,
}

/// Configured decimation run.
#[derive(Debug, Clone, Default)]
pub struct Decimator {
    options: DecimateOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl Decimator {
    pub fn new(options: DecimateOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Stop with [`Error::Cancelled`] once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn options(&self) -> &DecimateOptions {
        &self.options
    }

    /// Decimate `mesh` according to the options.
    pub fn run<L: ProgressListener>(&self, mesh: &TriangleMesh, progress: L) -> Result<Decimation> {
        let target = self.options.target.resolve(mesh.face_count())?;
        debug!(
            method = %self.options.method,
            triangles = mesh.face_count(),
            target,
            "Resolved decimation target"
        );
        match self.options.method {
            Method::Qem => self.run_policy(mesh, target, QemPolicy::new(), progress),
            Method::AngleSum => self.run_policy(
                mesh,
                target,
                AngleSumPolicy::with_join_position(self.options.join_position),
                progress,
            ),
            Method::Random => {
                self.run_policy(mesh, target, RandomPolicy::with_seed(self.options.seed), progress)
            }
        }
    }

    fn run_policy<C, L>(
        &self,
        mesh: &TriangleMesh,
        target: usize,
        mut policy: C,
        progress: L,
    ) -> Result<Decimation>
    where
        C: CostPolicy,
        L: ProgressListener,
    {
        let mut store = TopologyMesh::<C::Payload>::load(mesh)?;

        let mut scheduler = ContractionScheduler::new();
        if let Some(flag) = &self.cancel {
            scheduler = scheduler.with_cancel_flag(Arc::clone(flag));
        }
        let report = scheduler.run(&mut store, target, &mut policy, progress)?;

        let degenerate_removed = match self.options.degenerate_epsilon {
            Some(epsilon) => store.remove_degenerate(epsilon),
            None => 0,
        };

        Ok(Decimation {
            stats: store.stats(),
            mesh: store.save(),
            report,
            degenerate_removed,
        })
    }
}

impl MeshSimplifier for Decimator {
    fn simplify(&self, mesh: &TriangleMesh, reduction_ratio: f32) -> Result<TriangleMesh> {
        let options = DecimateOptions {
            target: Target::Ratio(f64::from(reduction_ratio)),
            ..self.options.clone()
        };
        let decimator = Decimator {
            options,
            cancel: self.cancel.clone(),
        };
        decimator.run(mesh, NoProgress).map(|d| d.mesh)
    }
}

/// Decimate `mesh` with `options`, reporting to `progress`.
pub fn decimate<L: ProgressListener>(
    mesh: &TriangleMesh,
    options: &DecimateOptions,
    progress: L,
) -> Result<Decimation> {
    Decimator::new(options.clone()).run(mesh, progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_resolution() {
        assert_eq!(Target::Triangles(7).resolve(100).unwrap(), 7);
        assert_eq!(Target::Ratio(0.5).resolve(12).unwrap(), 6);
        assert_eq!(Target::Ratio(0.25).resolve(10).unwrap(), 8);
        assert_eq!(Target::Ratio(1.0).resolve(12).unwrap(), 0);

        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                Target::Ratio(bad).resolve(12),
                Err(Error::InvalidTarget { .. })
            ));
        }
    }

    #[test]
    fn test_method_names() {
        assert_eq!("qem".parse::<Method>().unwrap(), Method::Qem);
        assert_eq!("ASEM".parse::<Method>().unwrap(), Method::AngleSum);
        assert_eq!("rem".parse::<Method>().unwrap(), Method::Random);
        assert!("fast".parse::<Method>().is_err());
        assert_eq!(Method::AngleSum.to_string(), "asem");
    }

    #[test]
    fn test_options_builders() {
        let options = DecimateOptions::with_target_triangles(40)
            .method(Method::Random)
            .seed(9)
            .with_degenerate_cleanup();
        assert_eq!(options.target, Target::Triangles(40));
        assert_eq!(options.method, Method::Random);
        assert_eq!(options.seed, 9);
        assert_eq!(options.degenerate_epsilon, Some(DEFAULT_DEGENERATE_EPSILON));

        let defaults = DecimateOptions::default();
        assert_eq!(defaults.method, Method::Qem);
        assert_eq!(defaults.join_position, JoinPosition::Target);
        assert!(defaults.degenerate_epsilon.is_none());
    }

    #[test]
    fn test_ratio_of_one_is_rejected_by_scheduler() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            (0..14).map(|i| decimesh_core::Point3d::new(i as f64, (i % 2) as f64, 0.0)).collect(),
            (0..12).map(|i| [i, i + 1, i + 2]).collect(),
        );
        let result = decimate(&mesh, &DecimateOptions::with_target_ratio(1.0), NoProgress);
        assert!(matches!(result, Err(Error::InvalidTarget { target: 0, .. })));
    }
}
