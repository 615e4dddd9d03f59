mod test_basis_basic;
mod test_curve_basic;
mod test_dual_basic;
mod test_quadtree_basic;
mod test_zell_basic;
