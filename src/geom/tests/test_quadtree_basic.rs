use crate::geom::{GeomError, Point2, QuadTree, SpatialCell, Tolerance};

fn unit() -> SpatialCell {
    SpatialCell::new(Point2::new(0.5, 0.5), 1.0).unwrap()
}

#[test]
fn refines_only_around_points() {
    let tree = QuadTree::new(unit(), 0, 2, &[Point2::new(0.1, 0.1)]).unwrap();
    assert_eq!(tree.leaf_count(), 7);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.quad_levels(), vec![2, 2, 2, 2, 1, 1, 1]);

    let first = tree.quads()[0];
    assert_eq!(first.sw, Point2::new(0.0, 0.0));
    assert_eq!(first.ne, Point2::new(0.25, 0.25));
}

#[test]
fn boundary_point_refines_every_touching_cell() {
    let tree = QuadTree::new(unit(), 0, 2, &[Point2::new(0.5, 0.5)]).unwrap();
    assert_eq!(tree.leaf_count(), 16);
    assert!(tree.quad_levels().iter().all(|level| *level == 2));
}

#[test]
fn no_points_means_single_leaf() {
    let tree = QuadTree::new(unit(), 0, 4, &[Point2::new(3.0, 3.0)]).unwrap();
    assert!(tree.is_leaf());
    assert_eq!(tree.quads().len(), 1);
}

#[test]
fn level_max_must_be_positive() {
    assert!(matches!(
        QuadTree::new(unit(), 0, 0, &[]),
        Err(GeomError::InvalidParameter(_))
    ));
}

#[test]
fn mesh_welds_shared_corners() {
    let tree = QuadTree::new(unit(), 0, 2, &[Point2::new(0.1, 0.1)]).unwrap();
    let mesh = tree.mesh(Tolerance::WELD).unwrap();

    // 3x3 coarse corners plus 5 new corners inside the refined quadrant
    assert_eq!(mesh.coordinates.len(), 14);
    assert_eq!(mesh.connectivity.len(), 7);
    for quad in &mesh.connectivity {
        let mut ids = quad.to_vec();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    // every quad is counter-clockwise
    for quad in &mesh.connectivity {
        let c: Vec<Point2> = quad.iter().map(|n| mesh.coordinates[*n as usize]).collect();
        let twice_area: f64 = (0..4)
            .map(|i| {
                let (a, b) = (c[i], c[(i + 1) % 4]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(twice_area > 0.0);
    }
}

#[test]
fn far_away_cell_meshes_without_overflow() {
    let center = Point2::new(1e10, 1e10);
    let cell = SpatialCell::new(center, 1.0).unwrap();
    let tree = QuadTree::new(cell, 0, 1, &[center]).unwrap();
    let mesh = tree.mesh(Tolerance::WELD).unwrap();

    assert_eq!(mesh.connectivity.len(), 4);
    assert_eq!(mesh.coordinates.len(), 9);
}
