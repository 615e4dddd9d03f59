use serde::{Deserialize, Serialize};

use super::error::{GeomError, GeomResult};
use super::knot::{Degree, KnotVector, evaluation_times};

/// Sampled basis function: parameter values and matching basis values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasisSamples {
    pub t: Vec<f64>,
    pub y: Vec<f64>,
}

/// The `k`-th B-spline basis function of a given degree over a knot vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    knots: KnotVector,
    index: usize,
    degree: Degree,
}

impl BasisFunction {
    /// Fails with `InvalidParameter` when the knot vector is too short to
    /// hold the local support `[t_k, t_{k+p+1}]`.
    pub fn new(knots: KnotVector, index: usize, degree: Degree) -> GeomResult<Self> {
        check_support(&knots, index, degree)?;
        Ok(Self { knots, index, degree })
    }

    #[must_use]
    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Local support `[t_k, t_{k+p+1}]`.
    #[must_use]
    pub fn support(&self) -> (f64, f64) {
        let knots = self.knots.values();
        (knots[self.index], knots[self.index + self.degree.value() + 1])
    }

    #[must_use]
    pub fn value(&self, t: f64) -> f64 {
        cox_de_boor(self.knots.values(), self.index, self.degree.value(), t)
    }

    #[must_use]
    pub fn evaluate(&self, t: &[f64]) -> Vec<f64> {
        t.iter().map(|t| self.value(*t)).collect()
    }

    /// Samples the basis over the whole knot vector, see
    /// [`evaluation_times`].
    pub fn sample(&self, bisections: u32) -> GeomResult<BasisSamples> {
        let t = evaluation_times(&self.knots, bisections)?;
        let y = self.evaluate(&t);
        Ok(BasisSamples { t, y })
    }
}

fn check_support(knots: &KnotVector, index: usize, degree: Degree) -> GeomResult<()> {
    let p = degree.value();
    index
        .checked_add(p)
        .and_then(|n| n.checked_add(1))
        .filter(|needed| *needed <= knots.span_count())
        .map(|_| ())
        .ok_or_else(|| {
            GeomError::parameter(format!(
                "basis {index} of degree {p} needs knot index {index} + {p} + 1, knot vector has {} knots",
                knots.knot_count()
            ))
        })
}

/// Value of the `k`-th basis of degree `p` at `t`.
pub fn basis_value(knots: &KnotVector, k: usize, degree: Degree, t: f64) -> GeomResult<f64> {
    check_support(knots, k, degree)?;
    Ok(cox_de_boor(knots.values(), k, degree.value(), t))
}

/// Values of every basis `0..|knots| - p - 1` at `t`.
pub(crate) fn basis_row(knots: &[f64], p: usize, t: f64) -> Vec<f64> {
    let count = knots.len() - p - 1;
    (0..count).map(|k| cox_de_boor(knots, k, p, t)).collect()
}

/// Degree-0 indicator of span `i`, half-open except for the last
/// non-degenerate span, which also contains the final knot.
fn indicator(knots: &[f64], i: usize, t: f64) -> f64 {
    let (a, b) = (knots[i], knots[i + 1]);
    let last = knots[knots.len() - 1];
    if (a <= t && t < b) || (t == last && a < b && b == last) {
        1.0
    } else {
        0.0
    }
}

fn ratio(numerator: f64, span: f64) -> f64 {
    if span > 0.0 { numerator / span } else { 0.0 }
}

/// Cox-de Boor recurrence evaluated bottom-up.
///
/// `row[j]` holds `N_{k+j, d}(t)` after pass `d`; each pass consumes one
/// entry, leaving `N_{k, p}(t)` in `row[0]`. Caller guarantees
/// `k + p + 1 < knots.len()`.
pub(crate) fn cox_de_boor(knots: &[f64], k: usize, p: usize, t: f64) -> f64 {
    if t < knots[k] || t > knots[k + p + 1] {
        return 0.0;
    }

    let mut row: Vec<f64> = (0..=p).map(|j| indicator(knots, k + j, t)).collect();
    for d in 1..=p {
        for j in 0..=(p - d) {
            let i = k + j;
            let left = ratio(t - knots[i], knots[i + d] - knots[i]) * row[j];
            let right = ratio(knots[i + d + 1] - t, knots[i + d + 1] - knots[i + 1]) * row[j + 1];
            row[j] = left + right;
        }
    }
    row[0]
}

/// Bernstein polynomial `C(p, i) t^i (1 - t)^(p - i)` on `[0, 1]`.
pub fn bernstein_polynomial(i: usize, degree: Degree, t: f64) -> GeomResult<f64> {
    let p = degree.value();
    if p < 1 || i > p {
        return Err(GeomError::parameter(format!(
            "bernstein index {i} requires 0 <= i <= p and p >= 1, got p = {p}"
        )));
    }
    Ok(binomial(p, i) * t.powi(exponent(i)) * (1.0 - t).powi(exponent(p - i)))
}

/// Samples a Bernstein polynomial at `intervals + 1` evenly spaced points of
/// `[0, 1]`; `intervals` must be at least two.
pub fn bernstein_samples(i: usize, degree: Degree, intervals: usize) -> GeomResult<BasisSamples> {
    if intervals < 2 {
        return Err(GeomError::parameter(format!(
            "bernstein sampling needs at least two intervals, got {intervals}"
        )));
    }
    let t: Vec<f64> = (0..=intervals).map(|j| j as f64 / intervals as f64).collect();
    let y = t
        .iter()
        .map(|t| bernstein_polynomial(i, degree, *t))
        .collect::<GeomResult<Vec<_>>>()?;
    Ok(BasisSamples { t, y })
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, j| acc * (n - j) as f64 / (j + 1) as f64)
}

fn exponent(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knots(values: &[f64]) -> KnotVector {
        KnotVector::new(values.to_vec()).unwrap()
    }

    #[test]
    fn support_check_rejects_short_knot_vector() {
        let kv = knots(&[0.0, 1.0, 2.0]);
        assert!(BasisFunction::new(kv.clone(), 0, Degree::LINEAR).is_ok());
        assert!(matches!(
            BasisFunction::new(kv, 1, Degree::LINEAR),
            Err(GeomError::InvalidParameter(_))
        ));
    }

    #[test]
    fn outside_support_is_exactly_zero() {
        let kv = knots(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = BasisFunction::new(kv, 1, Degree::QUADRATIC).unwrap();
        assert_eq!(b.support(), (1.0, 4.0));
        assert_eq!(b.value(0.5), 0.0);
        assert_eq!(b.value(4.5), 0.0);
        assert_eq!(b.value(-10.0), 0.0);
    }

    #[test]
    fn uniform_quadratic_peak() {
        let kv = knots(&[0.0, 1.0, 2.0, 3.0]);
        let b = BasisFunction::new(kv, 0, Degree::QUADRATIC).unwrap();
        assert!((b.value(1.5) - 0.75).abs() < 1e-12);
        assert!((b.value(1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degree_zero_closed_at_last_knot() {
        let kv = knots(&[0.0, 1.0, 2.0, 2.0]);
        assert_eq!(cox_de_boor(kv.values(), 1, 0, 2.0), 1.0);
        assert_eq!(cox_de_boor(kv.values(), 2, 0, 2.0), 0.0);
        assert_eq!(cox_de_boor(kv.values(), 0, 0, 1.0), 0.0);
    }

    #[test]
    fn bernstein_values() {
        let v = bernstein_polynomial(1, Degree::QUADRATIC, 0.5).unwrap();
        assert!((v - 0.5).abs() < 1e-12);
        assert!(bernstein_polynomial(3, Degree::QUADRATIC, 0.5).is_err());
        assert!(bernstein_polynomial(0, Degree::CONSTANT, 0.5).is_err());

        let s = bernstein_samples(0, Degree::LINEAR, 4).unwrap();
        assert_eq!(s.t, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(s.y, vec![1.0, 0.75, 0.5, 0.25, 0.0]);
        assert!(bernstein_samples(0, Degree::LINEAR, 1).is_err());
    }

    #[test]
    fn bernstein_matches_clamped_bspline() {
        let p = Degree::CUBIC;
        let kv = KnotVector::bezier(p);
        for i in 0..=3 {
            for j in 0..=10 {
                let t = f64::from(j) / 10.0;
                let b = basis_value(&kv, i, p, t).unwrap();
                let bern = bernstein_polynomial(i, p, t).unwrap();
                assert!((b - bern).abs() < 1e-12, "i={i} t={t}");
            }
        }
    }
}
