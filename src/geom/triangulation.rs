use super::core::Point2;

/// Two triangles per cell of a structured `v_count × u_count` grid whose
/// vertex `(v, u)` sits at index `v * u_count + u`.
///
/// Grids with fewer than two samples along either axis have no cells.
#[must_use]
pub fn triangulate_grid(u_count: usize, v_count: usize) -> Vec<[usize; 3]> {
    if u_count < 2 || v_count < 2 {
        return Vec::new();
    }

    let mut triangles = Vec::with_capacity((u_count - 1) * (v_count - 1) * 2);
    let stride = u_count;
    for v in 0..v_count - 1 {
        for u in 0..u_count - 1 {
            let i0 = v * stride + u;
            let i1 = v * stride + u + 1;
            let i2 = (v + 1) * stride + u;
            let i3 = (v + 1) * stride + u + 1;

            triangles.push([i0, i1, i2]);
            triangles.push([i2, i1, i3]);
        }
    }
    triangles
}

/// Delaunay triangulation of a planar point set. Empty when the points are
/// collinear or fewer than three.
#[must_use]
pub fn delaunay(points: &[Point2]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }
    let delaunator_points: Vec<delaunator::Point> = points
        .iter()
        .map(|p| delaunator::Point { x: p.x, y: p.y })
        .collect();

    let triangulation = delaunator::triangulate(&delaunator_points);
    triangulation
        .triangles
        .chunks_exact(3)
        .map(|tri| [tri[0], tri[1], tri[2]])
        .collect()
}

/// Triangulates the rectangular parametric domain sampled at `t × u`,
/// vertex `(i, j)` at index `i * |u| + j`.
///
/// Empty when either axis has fewer than two distinct samples.
#[must_use]
pub fn triangulate_parametric(t: &[f64], u: &[f64]) -> Vec<[usize; 3]> {
    let points: Vec<Point2> = t
        .iter()
        .flat_map(|ti| u.iter().map(move |uj| Point2::new(*ti, *uj)))
        .collect();

    let triangles = delaunay(&points);
    if triangles.is_empty() && !points.is_empty() {
        log::warn!(
            "parametric domain of {}x{} samples is degenerate, no triangles produced",
            t.len(),
            u.len()
        );
    }
    triangles
}

/// Signed area of a planar triangle, positive when counter-clockwise.
#[must_use]
pub fn signed_area(a: Point2, b: Point2, c: Point2) -> f64 {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

/// Flattens triangles into the `u32` index buffer renderers consume.
#[must_use]
pub fn flatten_indices(triangles: &[[usize; 3]]) -> Vec<u32> {
    triangles
        .iter()
        .flatten()
        .map(|i| u32::try_from(*i).unwrap_or(u32::MAX))
        .collect()
}
