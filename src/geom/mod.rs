mod adjacency;
mod basis;
mod core;
mod curve;
mod dual;
mod error;
mod knot;
mod mesh;
mod metrics;
mod quadtree;
mod quality;
mod smooth;
mod surface;
mod triangulation;
mod zell;

pub use adjacency::{
    Edge, Pairwise, PairwiseCircular, adjacencies_upper_diagonal, adjacency_upper_diagonal,
    neighbors, pairwise, pairwise_circular, upper_diagonal,
};
pub use basis::{BasisFunction, BasisSamples, basis_value, bernstein_polynomial, bernstein_samples};
pub use core::{Point2, Point3, Tolerance, Vec3};
pub use curve::{
    Coefficient, Curve, CurveFit, FitOptions, KnotPlacement, PeriodicCurve, SampleTimes,
};
pub use dual::{BoundaryLoops, DualMeshOutput, DualMesher, QuadTreeMesher};
pub use error::{GeomError, GeomResult};
pub use knot::{Degree, KnotVector, MAX_BISECTIONS, evaluation_times};
pub use mesh::{BoundaryFixity, Element, ElementId, GeomMesh, NodeId};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use quadtree::{Quad, QuadMesh, QuadTree, SpatialCell};
pub use quality::{
    det_jacobian_of_quad, jacobian_of_quad, minimum_jacobian_of_quad,
    minimum_scaled_jacobian_of_quad, nodal_areas_of_quad, perimeter_segment_lengths,
};
pub use smooth::{
    SmoothOptions, apply_displacements, smooth, smooth_iterations, smooth_iterations_with_metrics,
};
pub use surface::{Grid, Lattice, Surface, SurfaceEvaluation, Volume, VolumeEvaluation};
pub use triangulation::{
    delaunay, flatten_indices, signed_area, triangulate_grid, triangulate_parametric,
};
pub use zell::{ROOT_HASH, Zell, ZellTree, subdivide};

#[cfg(test)]
mod tests;
