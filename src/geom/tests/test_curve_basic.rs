use crate::geom::{Curve, Degree, GeomError, KnotVector, PeriodicCurve, Point2, Point3, Tolerance};

#[test]
fn linear_bezier_recovers_segment() {
    let a = Point2::new(0.0, 0.0);
    let b = Point2::new(2.0, 4.0);
    let curve = Curve::new(KnotVector::bezier(Degree::LINEAR), Degree::LINEAR, vec![a, b]).unwrap();

    let (t, points) = curve.sample(2).unwrap();
    assert_eq!(t, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    for (t, p) in t.iter().zip(&points) {
        assert!(Tolerance::DEFAULT.approx_eq_point2(*p, Point2::new(2.0 * t, 4.0 * t)));
    }
    assert_eq!(points.first().copied(), Some(a));
    assert_eq!(points.last().copied(), Some(b));
}

#[test]
fn clamped_curve_interpolates_end_points() {
    let cps = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
        Point3::new(3.0, 2.0, 1.0),
        Point3::new(4.0, 0.0, 1.0),
        Point3::new(5.0, -1.0, 0.0),
    ];
    let curve = Curve::from_raw(vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0], 2, cps.clone()).unwrap();
    assert_eq!(curve.domain(), (0.0, 3.0));
    assert_eq!(curve.basis_count(), 5);

    let (_, points) = curve.sample(3).unwrap();
    assert!(Tolerance::DEFAULT.approx_eq_point3(points[0], cps[0]));
    assert!(Tolerance::DEFAULT.approx_eq_point3(*points.last().unwrap(), cps[4]));
    assert!(points.iter().all(|p| p.is_finite()));
}

#[test]
fn scalar_curve_is_weighted_sum_of_bases() {
    let curve = Curve::from_raw(vec![0.0, 1.0, 2.0, 3.0, 4.0], 1, vec![1.0, 3.0, 5.0]).unwrap();
    assert!((curve.point_at(2.0) - 3.0).abs() < 1e-12);
    assert!((curve.point_at(1.5) - 2.0).abs() < 1e-12);
}

#[test]
fn construction_errors() {
    assert!(matches!(
        Curve::from_raw(vec![0.0], 1, vec![0.0]),
        Err(GeomError::InvalidKnotVector(_))
    ));
    assert!(matches!(
        Curve::from_raw(vec![0.0, 1.0], -1, vec![0.0]),
        Err(GeomError::InvalidDegree(_))
    ));
    assert!(matches!(
        Curve::from_raw(vec![0.0, 0.0, 1.0, 1.0], 1, vec![0.0]),
        Err(GeomError::InvalidCoefficientCount { expected: 2, actual: 1 })
    ));
}

fn square() -> Vec<Point2> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ]
}

#[test]
fn periodic_quadratic_starts_at_edge_midpoints() {
    let curve = PeriodicCurve::new(square(), Degree::QUADRATIC).unwrap();
    assert_eq!(curve.segment_count(), 4);
    let tol = Tolerance::DEFAULT;
    assert!(tol.approx_eq_point2(curve.point_at(0.0), Point2::new(0.5, 0.0)));
    assert!(tol.approx_eq_point2(curve.point_at(1.0), Point2::new(1.0, 0.5)));
    assert!(tol.approx_eq_point2(curve.point_at(0.0), curve.point_at(4.0)));
}

#[test]
fn periodic_sampling_is_closed() {
    let curve = PeriodicCurve::new(square(), Degree::QUADRATIC).unwrap();
    let points = curve.evaluate(2).unwrap();
    assert_eq!(points.len(), 16);

    let segments = curve.segments(2).unwrap();
    assert_eq!(segments.len(), 4);
    let tol = Tolerance::DEFAULT;
    for (i, run) in segments.iter().enumerate() {
        assert_eq!(run.len(), 5);
        let next = &segments[(i + 1) % segments.len()];
        assert!(tol.approx_eq_point2(run[4], next[0]));
    }
}

#[test]
fn periodic_construction_errors() {
    assert!(matches!(
        PeriodicCurve::new(square(), Degree::CONSTANT),
        Err(GeomError::InvalidDegree(_))
    ));
    assert!(matches!(
        PeriodicCurve::new(square()[..2].to_vec(), Degree::QUADRATIC),
        Err(GeomError::InvalidParameter(_))
    ));
}
