use std::collections::BTreeSet;

use crate::geom::{
    BoundaryFixity, BoundaryLoops, DualMesher, Point2, QuadTreeMesher, SmoothOptions,
    smooth_iterations,
};

fn annulus(segments: usize) -> BoundaryLoops {
    let ring = |radius: f64| -> Vec<Point2> {
        (0..segments)
            .map(|k| {
                let a = std::f64::consts::TAU * k as f64 / segments as f64;
                Point2::new(radius * a.cos(), radius * a.sin())
            })
            .collect()
    };
    BoundaryLoops::new(vec![ring(2.0), ring(1.0)]).unwrap()
}

#[test]
fn separated_form_has_one_break_per_inner_loop() {
    let loops = annulus(12);
    let (xs, ys) = loops.to_separated();
    assert_eq!(xs.len(), 25);
    assert_eq!(xs.iter().filter(|x| x.is_nan()).count(), 1);
    assert_eq!(BoundaryLoops::from_separated(&xs, &ys).unwrap(), loops);
}

#[test]
fn leading_and_repeated_separators_are_skipped() {
    let nan = f64::NAN;
    let xs = [nan, 0.0, 1.0, 1.0, nan, nan, 5.0, 6.0, 6.0, nan];
    let ys = [nan, 0.0, 0.0, 1.0, nan, nan, 5.0, 5.0, 6.0, nan];
    let loops = BoundaryLoops::from_separated(&xs, &ys).unwrap();
    assert_eq!(loops.loops().len(), 2);
    assert_eq!(loops.loops()[1][0], Point2::new(5.0, 5.0));
}

#[test]
fn quadtree_mesher_numbers_from_one() {
    let loops = annulus(16);
    let bounds = loops.bounding_cell(0.25).unwrap();
    let output = QuadTreeMesher::new(bounds, 4).mesh(&loops).unwrap();

    let ids: Vec<u32> = output.nodes.keys().copied().collect();
    assert_eq!(ids.first().copied(), Some(1));
    assert_eq!(ids.last().copied(), Some(ids.len() as u32));

    let element_ids: Vec<u32> = output.elements.iter().map(|e| e.id).collect();
    assert_eq!(element_ids, (1..=output.elements.len() as u32).collect::<Vec<_>>());

    let referenced: BTreeSet<u32> = output.elements.iter().flat_map(|e| e.nodes.clone()).collect();
    assert!(referenced.iter().all(|id| output.nodes.contains_key(id)));
    assert!(!output.edges().is_empty());
}

#[test]
fn mesher_output_can_be_smoothed() {
    let loops = annulus(8);
    let bounds = loops.bounding_cell(0.5).unwrap();
    let output = QuadTreeMesher::new(bounds, 3).mesh(&loops).unwrap();

    let nodes = output.planar_nodes();
    let options = SmoothOptions::default().with_iterations(5);
    let smoothed = smooth_iterations(&nodes, &output.elements, &BoundaryFixity::new(), &options).unwrap();
    assert_eq!(smoothed.len(), nodes.len());
    assert!(smoothed.values().all(|p| p.iter().all(|c| c.is_finite())));
}
