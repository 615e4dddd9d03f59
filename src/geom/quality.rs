//! Shape metrics for bilinear quadrilaterals, used to judge smoothed meshes.
//!
//! Vertices are ordered counter-clockwise and map to the parent corners
//! `(-1, -1)`, `(1, -1)`, `(1, 1)`, `(-1, 1)`.

use super::adjacency::pairwise_circular;
use super::core::{Point2, Vec3};
use super::error::{GeomError, GeomResult};

fn check_parent_coordinate(name: &str, value: f64) -> GeomResult<()> {
    if (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GeomError::parameter(format!("{name} must lie in [-1, 1], got {value}")))
    }
}

/// Jacobian `[[dx/dxi, dy/dxi], [dx/deta, dy/deta]]` at `(xi, eta)`.
pub fn jacobian_of_quad(xi: f64, eta: f64, vertices: &[Point2; 4]) -> GeomResult<[[f64; 2]; 2]> {
    check_parent_coordinate("xi", xi)?;
    check_parent_coordinate("eta", eta)?;

    let d_xi = [-1.0 + eta, 1.0 - eta, 1.0 + eta, -1.0 - eta];
    let d_eta = [-1.0 + xi, -1.0 - xi, 1.0 + xi, 1.0 - xi];
    let row = |shape: [f64; 4]| -> [f64; 2] {
        let (x, y) = shape
            .iter()
            .zip(vertices)
            .fold((0.0, 0.0), |(x, y), (s, v)| (x + s * v.x, y + s * v.y));
        [0.25 * x, 0.25 * y]
    };
    Ok([row(d_xi), row(d_eta)])
}

pub fn det_jacobian_of_quad(xi: f64, eta: f64, vertices: &[Point2; 4]) -> GeomResult<f64> {
    let [[a, b], [c, d]] = jacobian_of_quad(xi, eta, vertices)?;
    Ok(a * d - b * c)
}

/// Signed corner areas: the cross product of the two edges meeting at each
/// vertex, projected on `+z`. Negative at a re-entrant or inverted corner.
#[must_use]
pub fn nodal_areas_of_quad(vertices: &[Point2; 4]) -> [f64; 4] {
    let edge = |i: usize| -> Vec3 {
        let (a, b) = (vertices[i], vertices[(i + 1) % 4]);
        Vec3::new(b.x - a.x, b.y - a.y, 0.0)
    };
    let edges = [edge(0), edge(1), edge(2), edge(3)];
    std::array::from_fn(|i| edges[(i + 3) % 4].cross(edges[i]).dot(Vec3::Z))
}

#[must_use]
pub fn minimum_jacobian_of_quad(vertices: &[Point2; 4]) -> f64 {
    nodal_areas_of_quad(vertices).into_iter().fold(f64::INFINITY, f64::min)
}

/// Corner areas normalized by the lengths of the two adjoining edges; `1.0`
/// for a rectangle. A corner touching a zero-length edge scores `0.0`.
#[must_use]
pub fn minimum_scaled_jacobian_of_quad(vertices: &[Point2; 4]) -> f64 {
    let areas = nodal_areas_of_quad(vertices);
    let lengths = perimeter_segment_lengths(vertices);
    (0..4)
        .map(|i| {
            let scale = lengths[(i + 3) % 4] * lengths[i];
            if scale > 0.0 { areas[i] / scale } else { 0.0 }
        })
        .fold(f64::INFINITY, f64::min)
}

/// Lengths of the closed polygon's edges, starting with `p0 -> p1`.
#[must_use]
pub fn perimeter_segment_lengths(coordinates: &[Point2]) -> Vec<f64> {
    if coordinates.len() < 2 {
        return Vec::new();
    }
    pairwise_circular(coordinates.iter().copied())
        .map(|(a, b)| a.distance_to(b))
        .collect()
}
