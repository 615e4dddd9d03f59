use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::basis::{BasisFunction, basis_row, cox_de_boor};
use super::core::{Point2, Point3};
use super::error::{GeomError, GeomResult};
use super::knot::{Degree, KnotVector, check_bisections, sample_spans};

/// A control-point value that can be blended by basis weights.
pub trait Coefficient: Copy + PartialEq + Debug {
    const ZERO: Self;

    /// Returns `self + weight * other`.
    #[must_use]
    fn scaled_add(self, weight: f64, other: Self) -> Self;

    /// Euclidean distance, used to place fit parameters along the samples.
    fn distance(self, other: Self) -> f64;
}

impl Coefficient for f64 {
    const ZERO: Self = 0.0;

    fn scaled_add(self, weight: f64, other: Self) -> Self {
        self + weight * other
    }

    fn distance(self, other: Self) -> f64 {
        (self - other).abs()
    }
}

impl Coefficient for Point2 {
    const ZERO: Self = Point2::ORIGIN;

    fn scaled_add(self, weight: f64, other: Self) -> Self {
        Point2::new(self.x + weight * other.x, self.y + weight * other.y)
    }

    fn distance(self, other: Self) -> f64 {
        self.distance_to(other)
    }
}

impl Coefficient for Point3 {
    const ZERO: Self = Point3::ORIGIN;

    fn scaled_add(self, weight: f64, other: Self) -> Self {
        Point3::new(
            self.x + weight * other.x,
            self.y + weight * other.y,
            self.z + weight * other.z,
        )
    }

    fn distance(self, other: Self) -> f64 {
        self.distance_to(other)
    }
}

/// `Σ weights[k] · points[k]`.
pub(crate) fn blend<P: Coefficient>(weights: &[f64], points: &[P]) -> P {
    weights
        .iter()
        .zip(points)
        .fold(P::ZERO, |acc, (w, p)| acc.scaled_add(*w, *p))
}

/// Number of basis functions a knot vector carries at a given degree.
pub(crate) fn basis_count(knots: &KnotVector, degree: Degree) -> GeomResult<usize> {
    let p = degree.value();
    knots.knot_count().checked_sub(p + 1).filter(|n| *n > 0).ok_or_else(|| {
        GeomError::InvalidDegree(format!(
            "degree {p} needs at least {} knots, got {}",
            p + 2,
            knots.knot_count()
        ))
    })
}

/// Open (non-periodic) B-spline curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve<P> {
    knots: KnotVector,
    degree: Degree,
    coefficients: Vec<P>,
}

impl<P: Coefficient> Curve<P> {
    /// Fails with `InvalidCoefficientCount` unless there is exactly one
    /// coefficient per basis function, `|knots| - p - 1`.
    pub fn new(knots: KnotVector, degree: Degree, coefficients: Vec<P>) -> GeomResult<Self> {
        let expected = basis_count(&knots, degree)?;
        if coefficients.len() != expected {
            return Err(GeomError::InvalidCoefficientCount {
                expected,
                actual: coefficients.len(),
            });
        }
        Ok(Self {
            knots,
            degree,
            coefficients,
        })
    }

    /// Validates raw knots, a signed degree and the coefficients in one step.
    pub fn from_raw(knots: Vec<f64>, degree: i64, coefficients: Vec<P>) -> GeomResult<Self> {
        let knots = KnotVector::new(knots)?;
        let degree = Degree::new(degree)?;
        Self::new(knots, degree, coefficients)
    }

    #[must_use]
    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    #[must_use]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    #[must_use]
    pub fn coefficients(&self) -> &[P] {
        &self.coefficients
    }

    #[must_use]
    pub fn basis_count(&self) -> usize {
        self.coefficients.len()
    }

    pub fn basis(&self, k: usize) -> GeomResult<BasisFunction> {
        BasisFunction::new(self.knots.clone(), k, self.degree)
    }

    /// Parameter interval `[t_p, t_n]` on which the bases sum to one.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        let knots = self.knots.values();
        (knots[self.degree.value()], knots[self.basis_count()])
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> P {
        let p = self.degree.value();
        let knots = self.knots.values();
        self.coefficients
            .iter()
            .enumerate()
            .fold(P::ZERO, |acc, (k, c)| acc.scaled_add(cox_de_boor(knots, k, p, t), *c))
    }

    #[must_use]
    pub fn evaluate(&self, t: &[f64]) -> Vec<P> {
        let p = self.degree.value();
        let knots = self.knots.values();
        t.iter()
            .map(|t| blend(&basis_row(knots, p, *t), &self.coefficients))
            .collect()
    }

    /// Samples of the domain, `2^bisections` per non-degenerate span.
    pub fn evaluation_times(&self, bisections: u32) -> GeomResult<Vec<f64>> {
        check_bisections(bisections)?;
        Ok(sample_spans(
            self.knots.values(),
            self.degree.value()..self.basis_count(),
            bisections,
        ))
    }

    pub fn sample(&self, bisections: u32) -> GeomResult<(Vec<f64>, Vec<P>)> {
        let t = self.evaluation_times(bisections)?;
        let points = self.evaluate(&t);
        Ok((t, points))
    }
}

/// Closed B-spline loop over a uniform knot vector.
///
/// Segment `i` blends control points `i..=i + p` (wrapping modulo `n`), so
/// the curve has `n` segments and no seam. For `p = 2` the segment bases
/// are `(1 - t)^2 / 2`, `1/2 + t - t^2` and `t^2 / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicCurve<P> {
    control_points: Vec<P>,
    degree: Degree,
    knots: KnotVector,
}

impl<P: Coefficient> PeriodicCurve<P> {
    pub fn new(control_points: Vec<P>, degree: Degree) -> GeomResult<Self> {
        let p = degree.value();
        if p < 1 {
            return Err(GeomError::InvalidDegree(
                "periodic curves need degree at least one".to_owned(),
            ));
        }
        if control_points.len() <= p {
            return Err(GeomError::parameter(format!(
                "periodic curve of degree {p} needs more than {p} control points, got {}",
                control_points.len()
            )));
        }
        let knots = KnotVector::uniform(2 * p + 2)?;
        Ok(Self {
            control_points,
            degree,
            knots,
        })
    }

    #[must_use]
    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    #[must_use]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.control_points.len()
    }

    /// Weights of the `p + 1` control points of a segment at local `t ∈ [0, 1]`.
    fn segment_weights(&self, t: f64) -> Vec<f64> {
        let p = self.degree.value();
        basis_row(self.knots.values(), p, p as f64 + t)
    }

    fn segment_point(&self, segment: usize, weights: &[f64]) -> P {
        let n = self.control_points.len();
        weights.iter().enumerate().fold(P::ZERO, |acc, (k, w)| {
            acc.scaled_add(*w, self.control_points[(segment + k) % n])
        })
    }

    /// Point at `s ∈ [0, n]`; `s` is clamped, and `point_at(0)` coincides with
    /// `point_at(n)`.
    #[must_use]
    pub fn point_at(&self, s: f64) -> P {
        let n = self.control_points.len();
        let s = s.clamp(0.0, n as f64);
        let segment = (s.floor() as usize).min(n - 1);
        let weights = self.segment_weights(s - segment as f64);
        self.segment_point(segment, &weights)
    }

    fn local_times(bisections: u32, closed: bool) -> GeomResult<Vec<f64>> {
        check_bisections(bisections)?;
        let per_segment = 1usize << bisections;
        let end = if closed { per_segment + 1 } else { per_segment };
        Ok((0..end).map(|j| j as f64 / per_segment as f64).collect())
    }

    /// Closed polyline of `n · 2^bisections` points; the seam point is not
    /// repeated.
    pub fn evaluate(&self, bisections: u32) -> GeomResult<Vec<P>> {
        let weights: Vec<Vec<f64>> = Self::local_times(bisections, false)?
            .into_iter()
            .map(|t| self.segment_weights(t))
            .collect();
        Ok((0..self.segment_count())
            .flat_map(|i| weights.iter().map(move |w| (i, w)))
            .map(|(i, w)| self.segment_point(i, w))
            .collect())
    }

    /// One run of `2^bisections + 1` samples per segment, each run closed at
    /// its end point.
    pub fn segments(&self, bisections: u32) -> GeomResult<Vec<Vec<P>>> {
        let weights: Vec<Vec<f64>> = Self::local_times(bisections, true)?
            .into_iter()
            .map(|t| self.segment_weights(t))
            .collect();
        Ok((0..self.segment_count())
            .map(|i| weights.iter().map(|w| self.segment_point(i, w)).collect())
            .collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interpolating fit
// ─────────────────────────────────────────────────────────────────────────────

/// How sample points are assigned curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleTimes {
    /// Proportional to chord length.
    #[default]
    Chord,
    /// Proportional to the square root of chord length; follows sharp turns
    /// more closely.
    Centripetal,
}

/// How interior knots are placed from the sample times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KnotPlacement {
    /// Each interior knot averages `p` consecutive sample times.
    #[default]
    Average,
    /// Evenly spaced interior knots. Can make the system singular.
    Equal,
}

/// Options for [`Curve::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub degree: Degree,
    pub sample_times: SampleTimes,
    pub knots: KnotPlacement,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            degree: Degree::CUBIC,
            sample_times: SampleTimes::default(),
            knots: KnotPlacement::default(),
        }
    }
}

impl FitOptions {
    #[must_use]
    pub fn with_degree(mut self, degree: Degree) -> Self {
        self.degree = degree;
        self
    }

    #[must_use]
    pub fn with_sample_times(mut self, sample_times: SampleTimes) -> Self {
        self.sample_times = sample_times;
        self
    }

    #[must_use]
    pub fn with_knots(mut self, knots: KnotPlacement) -> Self {
        self.knots = knots;
        self
    }
}

/// A clamped curve through every sample, with the parameters it passes them at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFit<P> {
    curve: Curve<P>,
    sample_times: Vec<f64>,
    sample_basis_matrix: Vec<Vec<f64>>,
}

impl<P> CurveFit<P> {
    #[must_use]
    pub fn curve(&self) -> &Curve<P> {
        &self.curve
    }

    #[must_use]
    pub fn into_curve(self) -> Curve<P> {
        self.curve
    }

    /// Parameter of each sample on `[0, 1]`, first 0 and last 1.
    #[must_use]
    pub fn sample_times(&self) -> &[f64] {
        &self.sample_times
    }

    /// `N[i][j]`, basis `j` at sample time `i`.
    #[must_use]
    pub fn sample_basis_matrix(&self) -> &[Vec<f64>] {
        &self.sample_basis_matrix
    }
}

fn fit_sample_times<P: Coefficient>(samples: &[P], method: SampleTimes) -> GeomResult<Vec<f64>> {
    let lengths: Vec<f64> = samples
        .windows(2)
        .map(|pair| {
            let chord = pair[0].distance(pair[1]);
            match method {
                SampleTimes::Chord => chord,
                SampleTimes::Centripetal => chord.sqrt(),
            }
        })
        .collect();
    let total: f64 = lengths.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(GeomError::parameter(format!(
            "samples need a finite, nonzero polyline length, got {total}"
        )));
    }

    let mut times = Vec::with_capacity(samples.len());
    times.push(0.0);
    let mut acc = 0.0;
    for length in &lengths {
        acc += length / total;
        times.push(acc);
    }
    if let Some(last) = times.last_mut() {
        *last = 1.0;
    }
    Ok(times)
}

/// Clamped knots for `times.len()` control points of degree `p >= 1`.
fn fit_knots(times: &[f64], p: usize, placement: KnotPlacement) -> GeomResult<KnotVector> {
    let m = times.len() - 1;
    let mut knots = vec![0.0; p + 1];
    for j in 1..=(m - p) {
        let knot = match placement {
            KnotPlacement::Average => times[j..j + p].iter().sum::<f64>() / p as f64,
            KnotPlacement::Equal => j as f64 / (m - p + 1) as f64,
        };
        knots.push(knot);
    }
    knots.extend(std::iter::repeat_n(1.0, p + 1));
    KnotVector::new(knots)
}

/// Solves `matrix · x = rhs` by Gaussian elimination with partial pivoting,
/// one solve shared by every coordinate of `P`.
fn solve_linear_system<P: Coefficient>(
    mut matrix: Vec<Vec<f64>>,
    mut rhs: Vec<P>,
) -> GeomResult<Vec<P>> {
    const PIVOT_EPS: f64 = 1e-14;

    let n = matrix.len();
    if n == 0 || rhs.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(GeomError::parameter("invalid linear system dimensions"));
    }

    for k in 0..n {
        let (max_row, max_val) = (k..n)
            .map(|i| (i, matrix[i][k].abs()))
            .fold((k, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if max_val < PIVOT_EPS {
            return Err(GeomError::parameter(format!("singular fit system at column {k}")));
        }
        matrix.swap(k, max_row);
        rhs.swap(k, max_row);

        let pivot = matrix[k][k];
        for i in (k + 1)..n {
            let factor = matrix[i][k] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                matrix[i][j] -= factor * matrix[k][j];
            }
            rhs[i] = rhs[i].scaled_add(-factor, rhs[k]);
        }
    }

    let mut result = vec![P::ZERO; n];
    for i in (0..n).rev() {
        let sum = ((i + 1)..n).fold(rhs[i], |acc, j| acc.scaled_add(-matrix[i][j], result[j]));
        result[i] = P::ZERO.scaled_add(1.0 / matrix[i][i], sum);
    }
    Ok(result)
}

impl<P: Coefficient> Curve<P> {
    /// Interpolating fit: a clamped curve with one control point per sample
    /// that passes through `samples[i]` at `sample_times()[i]`.
    ///
    /// Needs degree at least one, more samples than the degree, and samples
    /// that are not all coincident.
    pub fn fit(samples: &[P], options: FitOptions) -> GeomResult<CurveFit<P>> {
        let p = options.degree.value();
        if p < 1 {
            return Err(GeomError::InvalidDegree(
                "curve fitting needs degree at least one".to_owned(),
            ));
        }
        if samples.len() <= p {
            return Err(GeomError::parameter(format!(
                "fit of degree {p} needs more than {p} samples, got {}",
                samples.len()
            )));
        }

        let sample_times = fit_sample_times(samples, options.sample_times)?;
        let knots = fit_knots(&sample_times, p, options.knots)?;
        let sample_basis_matrix: Vec<Vec<f64>> = sample_times
            .iter()
            .map(|t| basis_row(knots.values(), p, *t))
            .collect();
        let coefficients = solve_linear_system(sample_basis_matrix.clone(), samples.to_vec())?;

        log::debug!(
            "fitted degree {p} curve through {} samples ({:?} times, {:?} knots)",
            samples.len(),
            options.sample_times,
            options.knots
        );
        Ok(CurveFit {
            curve: Self::new(knots, options.degree, coefficients)?,
            sample_times,
            sample_basis_matrix,
        })
    }
}
