use crate::geom::{Point2, ROOT_HASH, SpatialCell, ZellTree};

#[test]
fn root_children_hashes() {
    let mut tree = ZellTree::new();
    let children = tree.subdivide(ROOT_HASH).unwrap();
    assert_eq!(children, ["00", "01", "10", "11"].map(String::from));
    assert_eq!(tree.len(), 5);
    assert!(!tree.root().unwrap().is_leaf());
}

#[test]
fn grandchildren_extend_parent_hash() {
    let mut tree = ZellTree::new();
    tree.subdivide(ROOT_HASH).unwrap();
    let children = tree.subdivide("11").unwrap();
    assert_eq!(children, ["1100", "1101", "1110", "1111"].map(String::from));

    let cell = tree.get("1110").unwrap();
    assert_eq!(cell.level, 2);
    assert_eq!(tree.parent("1110").unwrap().hash, "11");
    let ancestors: Vec<&str> = tree.ancestors("1110").iter().map(|c| c.hash.as_str()).collect();
    assert_eq!(ancestors, ["11", "0"]);
    assert_eq!(tree.leaves().count(), 7);
}

#[test]
fn subdividing_twice_or_unknown_fails() {
    let mut tree = ZellTree::new();
    tree.subdivide(ROOT_HASH).unwrap();
    assert!(tree.subdivide(ROOT_HASH).is_err());
    assert!(tree.subdivide("0101").is_err());
}

#[test]
fn uniform_refinement() {
    let mut tree = ZellTree::new();
    assert_eq!(tree.subdivide_leaves().unwrap(), 1);
    assert_eq!(tree.subdivide_leaves().unwrap(), 4);
    assert_eq!(tree.leaves().count(), 16);
    assert!(tree.leaves().all(|c| c.level == 2 && c.hash.len() == 4));
}

#[test]
fn bounds_follow_divide_order() {
    let mut tree = ZellTree::new();
    tree.subdivide(ROOT_HASH).unwrap();
    tree.subdivide("01").unwrap();
    let root = SpatialCell::new(Point2::new(0.0, 0.0), 4.0).unwrap();

    let north_west = tree.cell_bounds("01", root).unwrap();
    assert_eq!(north_west.center(), Point2::new(-1.0, 1.0));
    assert_eq!(north_west.size(), 2.0);

    let north_east_of_north_west = tree.cell_bounds("0111", root).unwrap();
    assert_eq!(north_east_of_north_west.center(), Point2::new(-0.5, 1.5));
    assert!(tree.cell_bounds("1111", root).is_none());
}

#[test]
fn bounds_match_quadtree_children() {
    let mut tree = ZellTree::new();
    let children = tree.subdivide(ROOT_HASH).unwrap();
    let root = SpatialCell::new(Point2::new(3.0, -2.0), 8.0).unwrap();

    let from_hashes: Vec<SpatialCell> = children
        .iter()
        .map(|hash| tree.cell_bounds(hash, root).unwrap())
        .collect();
    assert_eq!(from_hashes, root.divide().to_vec());
}
