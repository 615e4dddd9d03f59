//! Parametric geometry kernels: B-spline bases, curves, surfaces and
//! volumes, quadtree refinement with hash-addressed cells, dual quad meshes
//! and Laplacian smoothing.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod parse;
