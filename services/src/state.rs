//! Process-wide, read-only application state: the catalog handle, opened
//! once at startup and treated as read-only and thread-safe by contract; the
//! color-ramp registry, a read-only map initialized at startup; and the
//! worker pool. No per-request global mutable state.

use crate::config::Pipeline;
use gt_datatypes::color::{builtin_ramps, ColorRamp};
use gt_operators::catalog::Catalog;
use gt_operators::concurrency::WorkerPool;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub color_ramps: Arc<HashMap<String, ColorRamp>>,
    pub worker_pool: Arc<WorkerPool>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        worker_pool: WorkerPool,
        pipeline: Pipeline,
    ) -> Self {
        let color_ramps = builtin_ramps()
            .into_iter()
            .map(|ramp| (ramp.name.clone(), ramp))
            .collect();

        Self {
            catalog,
            color_ramps: Arc::new(color_ramps),
            worker_pool: Arc::new(worker_pool),
            pipeline: Arc::new(pipeline),
        }
    }

    /// Looks up a color ramp by name, falling back to the built-in default
    /// blue-to-red ramp when the name is unregistered.
    pub fn color_ramp(&self, name: &str) -> ColorRamp {
        self.color_ramps
            .get(name)
            .cloned()
            .unwrap_or_else(gt_datatypes::color::default_ramp)
    }
}
