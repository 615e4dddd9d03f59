use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::core::Tolerance;
use super::error::{GeomError, GeomResult};

/// Upper bound on the bisection count accepted by the samplers; each span is
/// split into `2^bisections` sub-intervals.
pub const MAX_BISECTIONS: u32 = 20;

/// A validated, non-decreasing knot vector with at least two entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct KnotVector {
    knots: Vec<f64>,
}

impl KnotVector {
    pub fn new(knots: Vec<f64>) -> GeomResult<Self> {
        if knots.len() < 2 {
            return Err(GeomError::InvalidKnotVector("minimum length is two".to_owned()));
        }
        if knots.iter().any(|k| !k.is_finite()) {
            return Err(GeomError::InvalidKnotVector("values must be finite".to_owned()));
        }
        if let Some(index) = knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(GeomError::InvalidKnotVector(format!(
                "values must be non-decreasing, decrease at index {}",
                index + 1
            )));
        }
        Ok(Self { knots })
    }

    /// Knots `0, 1, 2, ... count - 1`.
    pub fn uniform(count: usize) -> GeomResult<Self> {
        Self::new((0..count).map(|k| k as f64).collect())
    }

    /// Clamped knot vector `[0; p + 1] ++ [1; p + 1]` whose bases are the
    /// Bernstein polynomials of degree `p`.
    #[must_use]
    pub fn bezier(degree: Degree) -> Self {
        let p = degree.value();
        let mut knots = vec![0.0; p + 1];
        knots.extend(std::iter::repeat_n(1.0, p + 1));
        Self { knots }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn knot_count(&self) -> usize {
        self.knots.len()
    }

    #[must_use]
    pub fn span_count(&self) -> usize {
        self.knots.len() - 1
    }

    #[must_use]
    pub fn first(&self) -> f64 {
        self.knots[0]
    }

    #[must_use]
    pub fn last(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// Number of knots equal to `value` within `tol`.
    #[must_use]
    pub fn multiplicity(&self, value: f64, tol: Tolerance) -> usize {
        self.knots.iter().filter(|k| tol.approx_eq_f64(**k, value)).count()
    }

    /// True when the first and last `p + 1` knots are repeated.
    #[must_use]
    pub fn is_clamped(&self, degree: Degree) -> bool {
        let p = degree.value();
        let n = self.knots.len();
        if n < 2 * (p + 1) {
            return false;
        }
        self.knots[..=p].iter().all(|k| *k == self.knots[0])
            && self.knots[n - p - 1..].iter().all(|k| *k == self.knots[n - 1])
    }
}

impl TryFrom<Vec<f64>> for KnotVector {
    type Error = GeomError;

    fn try_from(knots: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(knots)
    }
}

impl From<KnotVector> for Vec<f64> {
    fn from(kv: KnotVector) -> Self {
        kv.knots
    }
}

/// Polynomial degree of a B-spline basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Degree(usize);

impl Degree {
    pub const CONSTANT: Self = Self(0);
    pub const LINEAR: Self = Self(1);
    pub const QUADRATIC: Self = Self(2);
    pub const CUBIC: Self = Self(3);

    pub fn new(p: i64) -> GeomResult<Self> {
        usize::try_from(p)
            .map(Self)
            .map_err(|_| GeomError::InvalidDegree("must be non-negative".to_owned()))
    }

    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl From<usize> for Degree {
    fn from(p: usize) -> Self {
        Self(p)
    }
}

impl TryFrom<i64> for Degree {
    type Error = GeomError;

    fn try_from(p: i64) -> Result<Self, Self::Error> {
        Self::new(p)
    }
}

impl From<Degree> for i64 {
    fn from(degree: Degree) -> Self {
        i64::try_from(degree.0).unwrap_or(i64::MAX)
    }
}

pub(crate) fn check_bisections(bisections: u32) -> GeomResult<()> {
    if bisections > MAX_BISECTIONS {
        return Err(GeomError::parameter(format!(
            "bisections must be at most {MAX_BISECTIONS}, got {bisections}"
        )));
    }
    Ok(())
}

/// Parameter samples spanning the whole knot vector.
///
/// Every non-degenerate span `[t_i, t_{i+1})` contributes `2^bisections`
/// equally spaced samples; the last knot closes the sequence. Repeated knots
/// never produce repeated samples.
pub fn evaluation_times(knots: &KnotVector, bisections: u32) -> GeomResult<Vec<f64>> {
    check_bisections(bisections)?;
    Ok(sample_spans(knots.values(), 0..knots.span_count(), bisections))
}

/// Samples the spans `spans` of `knots`, closing with the knot at
/// `spans.end`.
pub(crate) fn sample_spans(knots: &[f64], spans: Range<usize>, bisections: u32) -> Vec<f64> {
    let per_span = 1usize << bisections;
    let start = knots[spans.start];
    let end = knots[spans.end];
    let mut times = Vec::with_capacity(spans.len() * per_span + 1);

    for i in spans {
        let (a, b) = (knots[i], knots[i + 1]);
        if b <= a {
            continue;
        }
        let dt = (b - a) / per_span as f64;
        times.extend((0..per_span).map(|j| a + j as f64 * dt));
    }

    if times.is_empty() {
        times.push(start);
    }
    if times.last().is_some_and(|t| *t < end) {
        times.push(end);
    }
    times
}
