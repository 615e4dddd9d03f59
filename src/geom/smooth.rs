//! Laplacian smoothing with per-axis boundary fixity.
//!
//! Each free axis of a node moves by `update_ratio * (mean(neighbors) - self)`;
//! fixed axes stay put. [`smooth`] only computes the deltas, leaving
//! apply-then-repeat to the caller or to [`smooth_iterations`].

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::adjacency::{adjacencies_upper_diagonal, neighbors};
use super::error::{GeomError, GeomResult};
use super::mesh::{BoundaryFixity, Element, NodeId};
use super::metrics::{GeomMetrics, TimingBucket};

/// Options for [`smooth_iterations`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothOptions {
    /// Fraction of the distance to the neighbor centroid moved per pass,
    /// strictly between 0 and 1.
    pub update_ratio: f64,
    /// Number of smoothing passes.
    pub iterations: usize,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            update_ratio: 0.1,
            iterations: 1,
        }
    }
}

impl SmoothOptions {
    #[must_use]
    pub fn with_update_ratio(mut self, update_ratio: f64) -> Self {
        self.update_ratio = update_ratio;
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

type Neighborhood = BTreeMap<NodeId, BTreeSet<NodeId>>;

fn check_update_ratio(update_ratio: f64) -> GeomResult<()> {
    if update_ratio > 0.0 && update_ratio < 1.0 {
        Ok(())
    } else {
        Err(GeomError::parameter(format!(
            "update_ratio must lie strictly between 0 and 1, got {update_ratio}"
        )))
    }
}

/// Builds the neighbor graph and checks that every node can be smoothed.
fn neighborhood<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    elements: &[Element],
    boundary: &BoundaryFixity,
) -> GeomResult<Neighborhood> {
    boundary.validate(D)?;

    let edges = adjacencies_upper_diagonal(elements.iter().map(|e| e.nodes.as_slice()));
    if let Some(unknown) = edges
        .iter()
        .flat_map(|edge| [edge.lo(), edge.hi()])
        .find(|id| !nodes.contains_key(id))
    {
        return Err(GeomError::UnknownNode(unknown));
    }

    let map = neighbors(&edges);
    if let Some(lonely) = nodes.keys().find(|id| map.get(*id).is_none_or(BTreeSet::is_empty)) {
        return Err(GeomError::DegenerateNeighborhood(*lonely));
    }
    Ok(map)
}

fn node_delta<const D: usize>(
    id: NodeId,
    position: &[f64; D],
    adjacent: &BTreeSet<NodeId>,
    nodes: &BTreeMap<NodeId, [f64; D]>,
    boundary: &BoundaryFixity,
    update_ratio: f64,
) -> [f64; D] {
    let mut sum = [0.0; D];
    for q in adjacent.iter().filter_map(|n| nodes.get(n)) {
        for (s, v) in sum.iter_mut().zip(q) {
            *s += v;
        }
    }
    let count = adjacent.len() as f64;

    std::array::from_fn(|axis| {
        if boundary.is_fixed(id, axis + 1) {
            0.0
        } else {
            update_ratio * (sum[axis] / count - position[axis])
        }
    })
}

#[cfg(feature = "parallel")]
fn deltas<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    map: &Neighborhood,
    boundary: &BoundaryFixity,
    update_ratio: f64,
) -> BTreeMap<NodeId, [f64; D]> {
    nodes
        .par_iter()
        .filter_map(|(id, position)| {
            let adjacent = map.get(id)?;
            Some((*id, node_delta(*id, position, adjacent, nodes, boundary, update_ratio)))
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn deltas<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    map: &Neighborhood,
    boundary: &BoundaryFixity,
    update_ratio: f64,
) -> BTreeMap<NodeId, [f64; D]> {
    nodes
        .iter()
        .filter_map(|(id, position)| {
            let adjacent = map.get(id)?;
            Some((*id, node_delta(*id, position, adjacent, nodes, boundary, update_ratio)))
        })
        .collect()
}

/// Displacement of every node toward the centroid of its neighbors.
///
/// Neighbors come from the element edges. Fails with `InvalidParameter` for
/// an `update_ratio` outside `(0, 1)` or a fixed DOF outside `1..=D`, with
/// `UnknownNode` when an element references a node without coordinates,
/// and with `DegenerateNeighborhood` for a node that shares no edge.
pub fn smooth<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    elements: &[Element],
    boundary: &BoundaryFixity,
    update_ratio: f64,
) -> GeomResult<BTreeMap<NodeId, [f64; D]>> {
    check_update_ratio(update_ratio)?;
    let map = neighborhood(nodes, elements, boundary)?;
    log::debug!("smoothing {} nodes over {} elements", nodes.len(), elements.len());
    Ok(deltas(nodes, &map, boundary, update_ratio))
}

/// Adds `deltas` to `nodes`; nodes without a delta keep their position.
#[must_use]
pub fn apply_displacements<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    deltas: &BTreeMap<NodeId, [f64; D]>,
) -> BTreeMap<NodeId, [f64; D]> {
    nodes
        .iter()
        .map(|(id, position)| {
            let moved = match deltas.get(id) {
                Some(delta) => std::array::from_fn(|axis| position[axis] + delta[axis]),
                None => *position,
            };
            (*id, moved)
        })
        .collect()
}

/// Runs `options.iterations` smoothing passes, applying each pass's deltas
/// before computing the next, and returns the final positions.
pub fn smooth_iterations<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    elements: &[Element],
    boundary: &BoundaryFixity,
    options: &SmoothOptions,
) -> GeomResult<BTreeMap<NodeId, [f64; D]>> {
    smooth_iterations_with_metrics(nodes, elements, boundary, options, &mut GeomMetrics::default())
}

/// [`smooth_iterations`], timing the adjacency and smoothing passes.
pub fn smooth_iterations_with_metrics<const D: usize>(
    nodes: &BTreeMap<NodeId, [f64; D]>,
    elements: &[Element],
    boundary: &BoundaryFixity,
    options: &SmoothOptions,
    metrics: &mut GeomMetrics,
) -> GeomResult<BTreeMap<NodeId, [f64; D]>> {
    check_update_ratio(options.update_ratio)?;
    let map = metrics.time(TimingBucket::Adjacency, || neighborhood(nodes, elements, boundary))?;

    let mut current = nodes.clone();
    metrics.time(TimingBucket::Smoothing, || {
        for _ in 0..options.iterations {
            let step = deltas(&current, &map, boundary, options.update_ratio);
            current = apply_displacements(&current, &step);
        }
    });
    log::debug!(
        "smoothed {} nodes in {} passes",
        current.len(),
        options.iterations
    );
    Ok(current)
}
