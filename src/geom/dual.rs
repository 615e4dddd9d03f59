//! Exchange types for dual-mesh generators.
//!
//! A mesher receives discretized boundary loops and returns numbered nodes
//! plus CCW element connectivity. [`QuadTreeMesher`] is the in-crate
//! implementation; external contouring engines plug in through
//! [`DualMesher`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::adjacency::{Edge, adjacencies_upper_diagonal};
use super::core::{Point2, Point3, Tolerance};
use super::error::{GeomError, GeomResult};
use super::mesh::{Element, ElementId, NodeId};
use super::quadtree::{QuadTree, SpatialCell};

/// Ordered closed loops of boundary points, e.g. the outer and inner rims
/// of an annulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLoops {
    loops: Vec<Vec<Point2>>,
}

impl BoundaryLoops {
    /// Every loop needs at least three finite points.
    pub fn new(loops: Vec<Vec<Point2>>) -> GeomResult<Self> {
        if loops.is_empty() {
            return Err(GeomError::parameter("at least one boundary loop is required"));
        }
        for (i, points) in loops.iter().enumerate() {
            if points.len() < 3 {
                return Err(GeomError::parameter(format!(
                    "boundary loop {i} has {} points, at least three are required",
                    points.len()
                )));
            }
            if !points.iter().all(|p| p.is_finite()) {
                return Err(GeomError::parameter(format!(
                    "boundary loop {i} has non-finite coordinates"
                )));
            }
        }
        Ok(Self { loops })
    }

    /// Splits parallel coordinate arrays at NaN separators.
    pub fn from_separated(xs: &[f64], ys: &[f64]) -> GeomResult<Self> {
        if xs.len() != ys.len() {
            return Err(GeomError::parameter(format!(
                "coordinate arrays differ in length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }

        let mut loops = Vec::new();
        let mut current = Vec::new();
        for (x, y) in xs.iter().zip(ys) {
            if x.is_nan() || y.is_nan() {
                if !current.is_empty() {
                    loops.push(std::mem::take(&mut current));
                }
            } else {
                current.push(Point2::new(*x, *y));
            }
        }
        if !current.is_empty() {
            loops.push(current);
        }
        Self::new(loops)
    }

    /// Flattens the loops into `(xs, ys)` with one NaN between loops.
    #[must_use]
    pub fn to_separated(&self) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (i, points) in self.loops.iter().enumerate() {
            if i > 0 {
                xs.push(f64::NAN);
                ys.push(f64::NAN);
            }
            xs.extend(points.iter().map(|p| p.x));
            ys.extend(points.iter().map(|p| p.y));
        }
        (xs, ys)
    }

    #[must_use]
    pub fn loops(&self) -> &[Vec<Point2>] {
        &self.loops
    }

    pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.loops.iter().flatten().copied()
    }

    /// Smallest square around all points, widened by `padding` on each side.
    pub fn bounding_cell(&self, padding: f64) -> GeomResult<SpatialCell> {
        let mut lo = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut hi = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in self.points() {
            lo = Point2::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = Point2::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        let size = (hi.x - lo.x).max(hi.y - lo.y) + 2.0 * padding;
        let center = Point2::new(0.5 * (lo.x + hi.x), 0.5 * (lo.y + hi.y));
        SpatialCell::new(center, size)
    }
}

/// Mesher result: nodes keyed by id and elements in right-hand-rule order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DualMeshOutput {
    pub nodes: BTreeMap<NodeId, Point3>,
    pub elements: Vec<Element>,
}

impl DualMeshOutput {
    #[must_use]
    pub fn edges(&self) -> BTreeSet<Edge> {
        adjacencies_upper_diagonal(self.elements.iter().map(|e| e.nodes.as_slice()))
    }

    /// Planar node positions, the input shape of the smoother.
    #[must_use]
    pub fn planar_nodes(&self) -> BTreeMap<NodeId, [f64; 2]> {
        self.nodes.iter().map(|(id, p)| (*id, [p.x, p.y])).collect()
    }
}

/// A dual-mesh generator.
pub trait DualMesher {
    fn mesh(&self, loops: &BoundaryLoops) -> GeomResult<DualMeshOutput>;
}

/// Meshes the leaves of a quadtree refined on the boundary points.
///
/// Nodes and elements are numbered from one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadTreeMesher {
    pub bounds: SpatialCell,
    pub level_max: usize,
    pub tolerance: Tolerance,
}

impl QuadTreeMesher {
    #[must_use]
    pub fn new(bounds: SpatialCell, level_max: usize) -> Self {
        Self {
            bounds,
            level_max,
            tolerance: Tolerance::WELD,
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

fn one_based(index: u32) -> GeomResult<u32> {
    index
        .checked_add(1)
        .ok_or_else(|| GeomError::parameter(format!("index {index} exceeds the id range")))
}

impl DualMesher for QuadTreeMesher {
    fn mesh(&self, loops: &BoundaryLoops) -> GeomResult<DualMeshOutput> {
        let points: Vec<Point2> = loops.points().collect();
        let tree = QuadTree::new(self.bounds, 0, self.level_max, &points)?;
        let quad_mesh = tree.mesh(self.tolerance)?;

        let nodes = quad_mesh
            .coordinates
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let id = NodeId::try_from(i)
                    .map_err(|_| GeomError::parameter(format!("node index {i} exceeds the id range")))?;
                Ok((one_based(id)?, p.to_point3()))
            })
            .collect::<GeomResult<BTreeMap<_, _>>>()?;

        let elements = quad_mesh
            .connectivity
            .iter()
            .enumerate()
            .map(|(k, quad)| {
                let id = ElementId::try_from(k)
                    .map_err(|_| GeomError::parameter(format!("element index {k} exceeds the id range")))?;
                let nodes = quad.iter().map(|n| one_based(*n)).collect::<GeomResult<Vec<_>>>()?;
                Ok(Element::new(one_based(id)?, nodes))
            })
            .collect::<GeomResult<Vec<_>>>()?;

        log::debug!(
            "quadtree mesher produced {} nodes and {} elements from {} loops",
            nodes.len(),
            elements.len(),
            loops.loops().len()
        );
        Ok(DualMeshOutput { nodes, elements })
    }
}
