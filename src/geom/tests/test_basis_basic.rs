use crate::geom::{
    BasisFunction, Degree, GeomError, KnotVector, basis_value, bernstein_polynomial,
    bernstein_samples, evaluation_times,
};

fn clamped_cubic() -> KnotVector {
    KnotVector::new(vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0]).unwrap()
}

#[test]
fn degree_zero_indicator_on_uniform_knots() {
    let knots = KnotVector::uniform(7).unwrap();
    let basis = BasisFunction::new(knots, 1, Degree::CONSTANT).unwrap();
    let samples = basis.sample(1).unwrap();

    assert_eq!(samples.t.len(), 13);
    let mut expected = vec![0.0; 13];
    expected[2] = 1.0;
    expected[3] = 1.0;
    assert_eq!(samples.y, expected);
}

#[test]
fn degree_one_hat_function() {
    let knots = KnotVector::uniform(7).unwrap();
    let basis = BasisFunction::new(knots, 1, Degree::LINEAR).unwrap();
    assert_eq!(basis.support(), (1.0, 3.0));
    assert_eq!(basis.evaluate(&[0.5, 1.0, 1.5, 2.0, 2.5, 3.0]), vec![0.0, 0.0, 0.5, 1.0, 0.5, 0.0]);
}

#[test]
fn partition_of_unity_inside_domain() {
    let knots = clamped_cubic();
    let times = evaluation_times(&knots, 3).unwrap();
    for t in times {
        let sum: f64 = (0..6)
            .map(|k| basis_value(&knots, k, Degree::CUBIC, t).unwrap())
            .sum();
        assert!((sum - 1.0).abs() < 1e-12, "sum {sum} at t = {t}");
    }
}

#[test]
fn last_basis_is_one_at_domain_end() {
    let knots = clamped_cubic();
    assert_eq!(basis_value(&knots, 5, Degree::CUBIC, 3.0).unwrap(), 1.0);
    assert_eq!(basis_value(&knots, 4, Degree::CUBIC, 3.0).unwrap(), 0.0);
}

#[test]
fn basis_is_zero_outside_support() {
    let knots = KnotVector::uniform(8).unwrap();
    let basis = BasisFunction::new(knots, 2, Degree::QUADRATIC).unwrap();
    assert_eq!(basis.value(1.5), 0.0);
    assert_eq!(basis.value(5.5), 0.0);
    assert!(basis.value(3.5) > 0.0);
}

#[test]
fn invalid_inputs_are_typed() {
    assert!(matches!(KnotVector::new(vec![0.0]), Err(GeomError::InvalidKnotVector(_))));
    assert!(matches!(KnotVector::new(vec![1.0, 0.0]), Err(GeomError::InvalidKnotVector(_))));
    assert!(matches!(Degree::new(-1), Err(GeomError::InvalidDegree(_))));

    let short = KnotVector::uniform(3).unwrap();
    assert!(matches!(
        BasisFunction::new(short, 1, Degree::LINEAR),
        Err(GeomError::InvalidParameter(_))
    ));
    assert!(matches!(
        evaluation_times(&KnotVector::uniform(3).unwrap(), 21),
        Err(GeomError::InvalidParameter(_))
    ));
}

#[test]
fn bernstein_matches_clamped_spline() {
    let knots = KnotVector::bezier(Degree::CUBIC);
    for i in 0..=3 {
        for t in [0.0, 0.2, 0.5, 0.9] {
            let b = bernstein_polynomial(i, Degree::CUBIC, t).unwrap();
            let n = basis_value(&knots, i, Degree::CUBIC, t).unwrap();
            assert!((b - n).abs() < 1e-12);
        }
    }
    assert!((bernstein_polynomial(1, Degree::QUADRATIC, 0.5).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn bernstein_rejects_bad_arguments() {
    assert!(bernstein_polynomial(0, Degree::CONSTANT, 0.5).is_err());
    assert!(bernstein_polynomial(3, Degree::QUADRATIC, 0.5).is_err());
    assert!(bernstein_samples(0, Degree::LINEAR, 1).is_err());

    let samples = bernstein_samples(0, Degree::LINEAR, 4).unwrap();
    assert_eq!(samples.t.len(), samples.y.len());
    assert_eq!(samples.y.first().copied(), Some(1.0));
}

#[test]
fn linear_bezier_bases_are_ramps() {
    let knots = KnotVector::new(vec![0.0, 0.0, 1.0, 1.0]).unwrap();
    let falling = BasisFunction::new(knots.clone(), 0, Degree::LINEAR).unwrap().sample(2).unwrap();
    let rising = BasisFunction::new(knots, 1, Degree::LINEAR).unwrap().sample(2).unwrap();

    assert_eq!(falling.t, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(falling.y, vec![1.0, 0.75, 0.5, 0.25, 0.0]);
    assert_eq!(rising.y, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn huge_basis_index_is_an_error() {
    let knots = KnotVector::uniform(4).unwrap();
    assert!(matches!(
        BasisFunction::new(knots.clone(), usize::MAX, Degree::LINEAR),
        Err(GeomError::InvalidParameter(_))
    ));
    assert!(matches!(
        basis_value(&knots, usize::MAX - 1, Degree::QUADRATIC, 0.5),
        Err(GeomError::InvalidParameter(_))
    ));
}
