use std::ops::Index;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::basis::basis_row;
use super::core::Point3;
use super::curve::{Coefficient, basis_count, blend};
use super::error::{GeomError, GeomResult};
use super::knot::{Degree, KnotVector, check_bisections, sample_spans};
use super::mesh::GeomMesh;
use super::metrics::{GeomMetrics, TimingBucket};
use super::triangulation::{flatten_indices, triangulate_parametric};

// ─────────────────────────────────────────────────────────────────────────────
// Sampled arrays
// ─────────────────────────────────────────────────────────────────────────────

/// Row-major 2-D array of scalars.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Grid {
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.rows && j < self.cols).then(|| self.values[i * self.cols + j])
    }

    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.rows).then(|| &self.values[i * self.cols..(i + 1) * self.cols])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.values[i * self.cols + j]
    }
}

/// Row-major 3-D array of scalars.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Lattice {
    shape: (usize, usize, usize),
    values: Vec<f64>,
}

impl Lattice {
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Index<(usize, usize, usize)> for Lattice {
    type Output = f64;

    fn index(&self, (i, j, k): (usize, usize, usize)) -> &f64 {
        let (_, nj, nk) = self.shape;
        &self.values[(i * nj + j) * nk + k]
    }
}

fn split_axes(points: &[Point3]) -> [Vec<f64>; 3] {
    [
        points.iter().map(|p| p.x).collect(),
        points.iter().map(|p| p.y).collect(),
        points.iter().map(|p| p.z).collect(),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface
// ─────────────────────────────────────────────────────────────────────────────

/// Evaluated surface: parametric samples and coordinate grids shaped
/// `(|t|, |u|)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceEvaluation {
    pub t: Vec<f64>,
    pub u: Vec<f64>,
    pub x: Grid,
    pub y: Grid,
    pub z: Grid,
}

impl SurfaceEvaluation {
    #[must_use]
    pub fn point(&self, i: usize, j: usize) -> Point3 {
        Point3::new(self.x[(i, j)], self.y[(i, j)], self.z[(i, j)])
    }

    /// All points, vertex `(i, j)` at index `i * |u| + j`.
    #[must_use]
    pub fn points(&self) -> Vec<Point3> {
        self.x
            .as_slice()
            .iter()
            .zip(self.y.as_slice())
            .zip(self.z.as_slice())
            .map(|((x, y), z)| Point3::new(*x, *y, *z))
            .collect()
    }
}

/// Tensor-product B-spline surface over a `n_t × n_u` control net.
///
/// The evaluated grid and its triangulation are computed on first access and
/// cached.
#[derive(Debug, Clone)]
pub struct Surface {
    knots_t: KnotVector,
    degree_t: Degree,
    knots_u: KnotVector,
    degree_u: Degree,
    control_net: Vec<Vec<Point3>>,
    t: Vec<f64>,
    u: Vec<f64>,
    evaluations: OnceLock<SurfaceEvaluation>,
    triangulation: OnceLock<Vec<[usize; 3]>>,
}

/// Checks `rows` against the basis count of one parametric direction.
fn check_rows(expected: usize, actual: usize) -> GeomResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(GeomError::InvalidCoefficientCount { expected, actual })
    }
}

/// Domain samples of one parametric direction.
fn direction_times(knots: &KnotVector, degree: Degree, bisections: u32) -> GeomResult<Vec<f64>> {
    let n = basis_count(knots, degree)?;
    Ok(sample_spans(knots.values(), degree.value()..n, bisections))
}

fn basis_table(knots: &KnotVector, degree: Degree, times: &[f64]) -> Vec<Vec<f64>> {
    times
        .iter()
        .map(|t| basis_row(knots.values(), degree.value(), *t))
        .collect()
}

/// `Σ_a weights[a] · net[a]`, element-wise over equally long rows.
fn blend_rows<P: Coefficient>(weights: &[f64], net: &[Vec<P>]) -> Vec<P> {
    let width = net.first().map_or(0, Vec::len);
    (0..width)
        .map(|b| {
            weights
                .iter()
                .zip(net)
                .fold(P::ZERO, |acc, (w, row)| acc.scaled_add(*w, row[b]))
        })
        .collect()
}

fn surface_row(weights_t: &[f64], basis_u: &[Vec<f64>], net: &[Vec<Point3>]) -> Vec<Point3> {
    let partial = blend_rows(weights_t, net);
    basis_u.iter().map(|w| blend(w, &partial)).collect()
}

#[cfg(feature = "parallel")]
fn surface_points(basis_t: &[Vec<f64>], basis_u: &[Vec<f64>], net: &[Vec<Point3>]) -> Vec<Point3> {
    basis_t
        .par_iter()
        .flat_map_iter(|w| surface_row(w, basis_u, net))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn surface_points(basis_t: &[Vec<f64>], basis_u: &[Vec<f64>], net: &[Vec<Point3>]) -> Vec<Point3> {
    basis_t
        .iter()
        .flat_map(|w| surface_row(w, basis_u, net))
        .collect()
}

impl Surface {
    pub fn new(
        knots_t: KnotVector,
        degree_t: Degree,
        knots_u: KnotVector,
        degree_u: Degree,
        control_net: Vec<Vec<Point3>>,
        bisections: u32,
    ) -> GeomResult<Self> {
        check_bisections(bisections)?;
        check_rows(basis_count(&knots_t, degree_t)?, control_net.len())?;
        let n_u = basis_count(&knots_u, degree_u)?;
        for row in &control_net {
            check_rows(n_u, row.len())?;
        }

        let t = direction_times(&knots_t, degree_t, bisections)?;
        let u = direction_times(&knots_u, degree_u, bisections)?;
        Ok(Self {
            knots_t,
            degree_t,
            knots_u,
            degree_u,
            control_net,
            t,
            u,
            evaluations: OnceLock::new(),
            triangulation: OnceLock::new(),
        })
    }

    #[must_use]
    pub fn control_net(&self) -> &[Vec<Point3>] {
        &self.control_net
    }

    #[must_use]
    pub fn degrees(&self) -> (Degree, Degree) {
        (self.degree_t, self.degree_u)
    }

    #[must_use]
    pub fn evaluation_times_t(&self) -> &[f64] {
        &self.t
    }

    #[must_use]
    pub fn evaluation_times_u(&self) -> &[f64] {
        &self.u
    }

    /// Point at a single `(t, u)` parameter pair.
    #[must_use]
    pub fn point_at(&self, t: f64, u: f64) -> Point3 {
        let weights_t = basis_row(self.knots_t.values(), self.degree_t.value(), t);
        let weights_u = basis_row(self.knots_u.values(), self.degree_u.value(), u);
        blend(&weights_u, &blend_rows(&weights_t, &self.control_net))
    }

    pub fn evaluations(&self) -> &SurfaceEvaluation {
        self.evaluations.get_or_init(|| self.evaluate())
    }

    fn evaluate(&self) -> SurfaceEvaluation {
        let basis_t = basis_table(&self.knots_t, self.degree_t, &self.t);
        let basis_u = basis_table(&self.knots_u, self.degree_u, &self.u);
        let points = surface_points(&basis_t, &basis_u, &self.control_net);

        log::debug!(
            "evaluated surface of {}x{} control points on {}x{} samples",
            self.control_net.len(),
            self.control_net.first().map_or(0, Vec::len),
            self.t.len(),
            self.u.len()
        );

        let (rows, cols) = (self.t.len(), self.u.len());
        let [x, y, z] = split_axes(&points);
        SurfaceEvaluation {
            t: self.t.clone(),
            u: self.u.clone(),
            x: Grid { rows, cols, values: x },
            y: Grid { rows, cols, values: y },
            z: Grid { rows, cols, values: z },
        }
    }

    /// Triangles over the `(t, u)` samples, vertex `(i, j)` at `i * |u| + j`.
    pub fn triangulation(&self) -> &[[usize; 3]] {
        self.triangulation
            .get_or_init(|| triangulate_parametric(&self.t, &self.u))
    }

    #[must_use]
    pub fn to_mesh(&self) -> GeomMesh {
        let positions = self.evaluations().points().into_iter().map(Point3::to_array).collect();
        GeomMesh::new(positions, flatten_indices(self.triangulation()))
    }

    /// [`Surface::to_mesh`], timing the evaluation and triangulation passes.
    #[must_use]
    pub fn to_mesh_with_metrics(&self, metrics: &mut GeomMetrics) -> GeomMesh {
        metrics.time(TimingBucket::SurfaceEvaluation, || {
            self.evaluations();
        });
        metrics.time(TimingBucket::Triangulation, || {
            self.triangulation();
        });
        self.to_mesh()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Volume
// ─────────────────────────────────────────────────────────────────────────────

/// Evaluated volume: samples along `t`, `u`, `v` and coordinate lattices
/// shaped `(|t|, |u|, |v|)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeEvaluation {
    pub t: Vec<f64>,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub x: Lattice,
    pub y: Lattice,
    pub z: Lattice,
}

/// Trivariate tensor-product B-spline over a `n_t × n_u × n_v` control lattice.
#[derive(Debug, Clone)]
pub struct Volume {
    knots: [KnotVector; 3],
    degrees: [Degree; 3],
    control_lattice: Vec<Vec<Vec<Point3>>>,
    times: [Vec<f64>; 3],
    evaluations: OnceLock<VolumeEvaluation>,
}

impl Volume {
    pub fn new(
        knots: [KnotVector; 3],
        degrees: [Degree; 3],
        control_lattice: Vec<Vec<Vec<Point3>>>,
        bisections: u32,
    ) -> GeomResult<Self> {
        check_bisections(bisections)?;
        let [n_t, n_u, n_v] = [0, 1, 2].map(|d| basis_count(&knots[d], degrees[d]));
        let (n_t, n_u, n_v) = (n_t?, n_u?, n_v?);

        check_rows(n_t, control_lattice.len())?;
        for sheet in &control_lattice {
            check_rows(n_u, sheet.len())?;
            for row in sheet {
                check_rows(n_v, row.len())?;
            }
        }

        let times = [
            direction_times(&knots[0], degrees[0], bisections)?,
            direction_times(&knots[1], degrees[1], bisections)?,
            direction_times(&knots[2], degrees[2], bisections)?,
        ];
        Ok(Self {
            knots,
            degrees,
            control_lattice,
            times,
            evaluations: OnceLock::new(),
        })
    }

    pub fn evaluations(&self) -> &VolumeEvaluation {
        self.evaluations.get_or_init(|| self.evaluate())
    }

    fn evaluate(&self) -> VolumeEvaluation {
        let [basis_t, basis_u, basis_v] =
            [0, 1, 2].map(|d| basis_table(&self.knots[d], self.degrees[d], &self.times[d]));

        let mut points = Vec::with_capacity(basis_t.len() * basis_u.len() * basis_v.len());
        for weights_t in &basis_t {
            let sheet: Vec<Vec<Point3>> = (0..self.control_lattice.first().map_or(0, Vec::len))
                .map(|b| {
                    let column: Vec<Vec<Point3>> =
                        self.control_lattice.iter().map(|s| s[b].clone()).collect();
                    blend_rows(weights_t, &column)
                })
                .collect();
            for weights_u in &basis_u {
                let line = blend_rows(weights_u, &sheet);
                points.extend(basis_v.iter().map(|w| blend(w, &line)));
            }
        }

        log::debug!("evaluated volume on {} samples", points.len());

        let shape = (basis_t.len(), basis_u.len(), basis_v.len());
        let [x, y, z] = split_axes(&points);
        let [t, u, v] = self.times.clone();
        VolumeEvaluation {
            t,
            u,
            v,
            x: Lattice { shape, values: x },
            y: Lattice { shape, values: y },
            z: Lattice { shape, values: z },
        }
    }
}
