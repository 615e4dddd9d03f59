use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::adjacency::{Edge, adjacencies_upper_diagonal};
use super::core::{Point2, Tolerance};
use super::error::{GeomError, GeomResult};
use super::mesh::{NodeId, weld_points};
use super::metrics::{GeomMetrics, TimingBucket};

/// Axis-aligned square cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialCell {
    center: Point2,
    size: f64,
}

impl SpatialCell {
    pub fn new(center: Point2, size: f64) -> GeomResult<Self> {
        if !center.is_finite() {
            return Err(GeomError::parameter("cell center must be finite"));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(GeomError::parameter(format!(
                "cell size must be positive and finite, got {size}"
            )));
        }
        Ok(Self { center, size })
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn west(&self) -> f64 {
        self.center.x - self.size / 2.0
    }

    #[must_use]
    pub fn east(&self) -> f64 {
        self.center.x + self.size / 2.0
    }

    #[must_use]
    pub fn south(&self) -> f64 {
        self.center.y - self.size / 2.0
    }

    #[must_use]
    pub fn north(&self) -> f64 {
        self.center.y + self.size / 2.0
    }

    /// Boundary points count as contained.
    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.west() && p.x <= self.east() && p.y >= self.south() && p.y <= self.north()
    }

    /// Quarter cells in the order sw, nw, se, ne.
    #[must_use]
    pub fn divide(&self) -> [SpatialCell; 4] {
        let west_x = (self.center.x + self.west()) / 2.0;
        let east_x = (self.center.x + self.east()) / 2.0;
        let south_y = (self.center.y + self.south()) / 2.0;
        let north_y = (self.center.y + self.north()) / 2.0;
        let size = self.size / 2.0;

        [
            (west_x, south_y),
            (west_x, north_y),
            (east_x, south_y),
            (east_x, north_y),
        ]
        .map(|(x, y)| SpatialCell {
            center: Point2::new(x, y),
            size,
        })
    }

    #[must_use]
    pub fn vertices(&self) -> Quad {
        Quad {
            sw: Point2::new(self.west(), self.south()),
            se: Point2::new(self.east(), self.south()),
            ne: Point2::new(self.east(), self.north()),
            nw: Point2::new(self.west(), self.north()),
        }
    }
}

/// Leaf geometry, corners counter-clockwise from the southwest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub sw: Point2,
    pub se: Point2,
    pub ne: Point2,
    pub nw: Point2,
}

impl Quad {
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [self.sw, self.se, self.ne, self.nw]
    }

    #[must_use]
    pub fn centroid(&self) -> Point2 {
        let c = self.corners();
        Point2::new(
            c.iter().map(|p| p.x).sum::<f64>() / 4.0,
            c.iter().map(|p| p.y).sum::<f64>() / 4.0,
        )
    }

    /// Shoelace area, positive for the counter-clockwise winding.
    #[must_use]
    pub fn area(&self) -> f64 {
        let c = self.corners();
        0.5 * (0..4)
            .map(|i| {
                let (a, b) = (c[i], c[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
    }
}

/// Point-driven quadtree: a cell refines while it holds at least one seed
/// point and its children would not exceed `level_max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadTree {
    cell: SpatialCell,
    level: usize,
    level_max: usize,
    children: Option<Box<[QuadTree; 4]>>,
}

impl QuadTree {
    pub fn new(cell: SpatialCell, level: usize, level_max: usize, points: &[Point2]) -> GeomResult<Self> {
        if level_max < 1 {
            return Err(GeomError::parameter("level_max must be one or greater"));
        }
        let tree = Self::build(cell, level, level_max, points);
        log::debug!(
            "quadtree refined to {} leaves (depth {}, level_max {level_max})",
            tree.leaf_count(),
            tree.depth()
        );
        Ok(tree)
    }

    fn build(cell: SpatialCell, level: usize, level_max: usize, points: &[Point2]) -> Self {
        let mut tree = Self {
            cell,
            level,
            level_max,
            children: None,
        };
        if level + 1 > level_max {
            return tree;
        }

        let contained: Vec<Point2> = points.iter().copied().filter(|p| cell.contains(*p)).collect();
        if contained.is_empty() {
            return tree;
        }

        let children = cell
            .divide()
            .map(|child| Self::build(child, level + 1, level_max, &contained));
        tree.children = Some(Box::new(children));
        tree
    }

    #[must_use]
    pub fn cell(&self) -> &SpatialCell {
        &self.cell
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in the order sw, nw, se, ne.
    #[must_use]
    pub fn children(&self) -> Option<&[QuadTree; 4]> {
        self.children.as_deref()
    }

    fn visit_leaves<'a>(&'a self, visit: &mut impl FnMut(&'a QuadTree)) {
        match &self.children {
            Some(children) => children.iter().for_each(|child| child.visit_leaves(visit)),
            None => visit(self),
        }
    }

    #[must_use]
    pub fn leaves(&self) -> Vec<&QuadTree> {
        let mut out = Vec::new();
        self.visit_leaves(&mut |leaf| out.push(leaf));
        out
    }

    /// Leaf quads in depth-first sw, nw, se, ne order.
    #[must_use]
    pub fn quads(&self) -> Vec<Quad> {
        self.leaves().into_iter().map(|leaf| leaf.cell.vertices()).collect()
    }

    /// Level of every leaf, aligned with [`QuadTree::quads`].
    #[must_use]
    pub fn quad_levels(&self) -> Vec<usize> {
        self.leaves().into_iter().map(|leaf| leaf.level).collect()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit_leaves(&mut |_| count += 1);
        count
    }

    /// Deepest leaf level.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = self.level;
        self.visit_leaves(&mut |leaf| depth = depth.max(leaf.level));
        depth
    }

    /// Leaf quads as a mesh whose coincident corners share one node.
    pub fn mesh(&self, tol: Tolerance) -> GeomResult<QuadMesh> {
        let corners: Vec<Point2> = self.quads().iter().flat_map(Quad::corners).collect();
        let (coordinates, remap) = weld_points(&corners, tol);

        let ids = remap
            .iter()
            .map(|i| {
                NodeId::try_from(*i)
                    .map_err(|_| GeomError::parameter(format!("node index {i} exceeds the id range")))
            })
            .collect::<GeomResult<Vec<_>>>()?;
        let connectivity = ids.chunks_exact(4).map(|q| [q[0], q[1], q[2], q[3]]).collect();

        Ok(QuadMesh {
            coordinates,
            connectivity,
        })
    }

    /// [`QuadTree::mesh`], timing the welding pass.
    pub fn mesh_with_metrics(&self, tol: Tolerance, metrics: &mut GeomMetrics) -> GeomResult<QuadMesh> {
        metrics.time(TimingBucket::Welding, || self.mesh(tol))
    }
}

/// Welded quadtree leaves: node coordinates and per-quad node indices
/// (sw, se, ne, nw).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadMesh {
    pub coordinates: Vec<Point2>,
    pub connectivity: Vec<[NodeId; 4]>,
}

impl QuadMesh {
    /// Undirected wireframe of the quads.
    #[must_use]
    pub fn edges(&self) -> BTreeSet<Edge> {
        adjacencies_upper_diagonal(self.connectivity.iter().map(|q| q.as_slice()))
    }
}
