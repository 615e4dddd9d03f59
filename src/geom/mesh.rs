use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::core::{Point2, Tolerance};
use super::error::{GeomError, GeomResult};

/// Integer identifier of a mesh node.
pub type NodeId = u32;

/// Integer identifier of a mesh element.
pub type ElementId = u32;

/// A polygonal element: its identifier followed by its node ids in
/// right-hand-rule (CCW) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub nodes: Vec<NodeId>,
}

impl Element {
    #[must_use]
    pub fn new(id: ElementId, nodes: Vec<NodeId>) -> Self {
        Self { id, nodes }
    }
}

/// Per-node fixed degrees of freedom, 1-based (`1 = x`, `2 = y`, `3 = z`).
///
/// Nodes absent from the map are fully free.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundaryFixity {
    fixed: BTreeMap<NodeId, BTreeSet<usize>>,
}

impl BoundaryFixity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the listed DOFs of `node` as fixed, merging with any earlier entry.
    pub fn fix(&mut self, node: NodeId, dofs: impl IntoIterator<Item = usize>) -> &mut Self {
        self.fixed.entry(node).or_default().extend(dofs);
        self
    }

    /// Builder-style variant of [`BoundaryFixity::fix`].
    #[must_use]
    pub fn with(mut self, node: NodeId, dofs: impl IntoIterator<Item = usize>) -> Self {
        self.fix(node, dofs);
        self
    }

    #[must_use]
    pub fn dofs(&self, node: NodeId) -> Option<&BTreeSet<usize>> {
        self.fixed.get(&node)
    }

    /// True when axis `dof` (1-based) of `node` is fixed.
    #[must_use]
    pub fn is_fixed(&self, node: NodeId, dof: usize) -> bool {
        self.fixed.get(&node).is_some_and(|set| set.contains(&dof))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fixed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &BTreeSet<usize>)> {
        self.fixed.iter().map(|(node, dofs)| (*node, dofs))
    }

    /// Rejects DOF indices outside `1..=dimension`.
    pub fn validate(&self, dimension: usize) -> GeomResult<()> {
        for (node, dofs) in &self.fixed {
            if let Some(bad) = dofs.iter().find(|d| **d == 0 || **d > dimension) {
                return Err(GeomError::parameter(format!(
                    "node {node}: fixed dof {bad} is outside 1..={dimension}"
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(NodeId, Vec<usize>)> for BoundaryFixity {
    fn from_iter<I: IntoIterator<Item = (NodeId, Vec<usize>)>>(iter: I) -> Self {
        let mut fixity = Self::new();
        for (node, dofs) in iter {
            fixity.fix(node, dofs);
        }
        fixity
    }
}

/// Triangle mesh handed to rendering collaborators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl GeomMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    pub fn validate(&self) -> GeomResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(GeomError::parameter("mesh indices are not a triangle list"));
        }
        if self.has_invalid_vertices() {
            return Err(GeomError::parameter("mesh has NaN/Inf vertex coordinates"));
        }
        if !self.has_valid_indices() {
            return Err(GeomError::parameter("mesh has out-of-bounds vertex indices"));
        }
        Ok(())
    }
}

/// Merges planar points closer than `tol`, returning the unique points and,
/// for every input point, the index of its representative.
///
/// Lookup runs over a quantized grid with cell size `tol.eps`, checking the
/// neighbouring buckets so points straddling a cell boundary still merge.
pub(crate) fn weld_points(points: &[Point2], tol: Tolerance) -> (Vec<Point2>, Vec<usize>) {
    if !tol.eps.is_finite() || tol.eps <= 0.0 {
        return (points.to_vec(), (0..points.len()).collect());
    }

    let inv = 1.0 / tol.eps;
    let quantize = |value: f64| -> Option<i64> {
        value
            .is_finite()
            .then(|| (value * inv).floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    };

    let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    let mut unique: Vec<Point2> = Vec::with_capacity(points.len());
    let mut remap = Vec::with_capacity(points.len());

    for p in points.iter().copied() {
        let key = quantize(p.x).zip(quantize(p.y));

        let found = key.and_then(|(kx, ky)| {
            (-1i64..=1)
                .flat_map(|dx| {
                    (-1i64..=1).map(move |dy| (kx.saturating_add(dx), ky.saturating_add(dy)))
                })
                .filter_map(|lookup| buckets.get(&lookup))
                .flatten()
                .copied()
                .find(|cand| tol.approx_eq_point2(unique[*cand], p))
        });

        let index = found.unwrap_or_else(|| {
            let new_index = unique.len();
            unique.push(p);
            if let Some(key) = key {
                buckets.entry(key).or_default().push(new_index);
            }
            new_index
        });
        remap.push(index);
    }

    (unique, remap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixity_merges_and_validates() {
        let mut fixity = BoundaryFixity::new();
        fixity.fix(1, [1]).fix(1, [2]);
        assert!(fixity.is_fixed(1, 1));
        assert!(fixity.is_fixed(1, 2));
        assert!(!fixity.is_fixed(2, 1));
        assert!(fixity.validate(2).is_ok());
        assert!(matches!(fixity.validate(1), Err(GeomError::InvalidParameter(_))));

        let zero = BoundaryFixity::new().with(3, [0]);
        assert!(zero.validate(3).is_err());
    }

    #[test]
    fn mesh_validation() {
        let mesh = GeomMesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.triangle_count(), 1);

        let bad = GeomMesh::new(mesh.positions.clone(), vec![0, 1, 3]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn weld_merges_nearby_points() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1e-12, -1e-12),
            Point2::new(1.0, 1e-13),
        ];
        let (unique, remap) = weld_points(&pts, Tolerance::WELD);
        assert_eq!(unique.len(), 2);
        assert_eq!(remap, vec![0, 1, 0, 1]);
    }

    #[test]
    fn weld_handles_coordinates_beyond_the_bucket_range() {
        let pts = [
            Point2::new(1e10, 1e10),
            Point2::new(1e10 + 0.5, 1e10),
            Point2::new(1e10, 1e10),
            Point2::new(-1e10, -1e10),
        ];
        let (unique, remap) = weld_points(&pts, Tolerance::WELD);
        assert_eq!(unique.len(), 3);
        assert_eq!(remap, vec![0, 1, 0, 2]);
    }
}
