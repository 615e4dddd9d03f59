//! Opt-in timing hooks for the geometry kernels.
//!
//! Timing is only collected when the `engine_metrics` feature is enabled and
//! the target is not `wasm32` (no `std::time::Instant` there). Otherwise every
//! call is a no-op and [`GeomMetrics::end`] returns `None`.
//!
//! ```ignore
//! use ptg_engine::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let mesh = surface.to_mesh_with_metrics(&mut metrics);
//! if let Some(report) = metrics.end() {
//!     println!("evaluation: {} ns", report.surface_evaluation_ns);
//! }
//! ```

/// Categories of kernel work; each accumulates across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Tensor-product basis sampling and control-net blending.
    SurfaceEvaluation,
    /// Delaunay or grid triangulation of parametric samples.
    Triangulation,
    /// Corner welding of quadtree leaves.
    Welding,
    /// Edge extraction from element connectivity.
    Adjacency,
    /// Laplacian smoothing passes.
    Smoothing,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub surface_evaluation_ns: u64,
    pub triangulation_ns: u64,
    pub welding_ns: u64,
    pub adjacency_ns: u64,
    pub smoothing_ns: u64,
}

impl GeomTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.surface_evaluation_ns
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.welding_ns)
            .saturating_add(self.adjacency_ns)
            .saturating_add(self.smoothing_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    #[cfg_attr(
        not(all(feature = "engine_metrics", not(target_arch = "wasm32"))),
        allow(dead_code)
    )]
    fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::SurfaceEvaluation => &mut self.surface_evaluation_ns,
            TimingBucket::Triangulation => &mut self.triangulation_ns,
            TimingBucket::Welding => &mut self.welding_ns,
            TimingBucket::Adjacency => &mut self.adjacency_ns,
            TimingBucket::Smoothing => &mut self.smoothing_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator for timing kernel calls.
///
/// Call [`begin`](Self::begin) to reset, wrap work with [`time`](Self::time)
/// and read the report with [`end`](Self::end).
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated report, or `None` when metrics are compiled out.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
