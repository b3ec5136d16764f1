//! Shared geometry handles keyed by shape and parameters

use std::collections::HashMap;
use std::sync::Arc;

use super::{Geometry, GeometryParams, GeometryType};

/// Hands out one `Arc<Geometry>` per distinct (type, parameters) pair
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<(GeometryType, [u32; 8]), Arc<Geometry>>,
}

impl GeometryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or generate the geometry for a shape
    pub fn get_or_generate(&mut self, geometry_type: GeometryType, params: GeometryParams) -> Arc<Geometry> {
        Arc::clone(
            self.entries
                .entry((geometry_type, params.key()))
                .or_insert_with(|| {
                    log::debug!("Generating {} geometry", geometry_type.name());
                    Arc::new(Geometry::generate(geometry_type, params))
                }),
        )
    }

    /// Number of distinct buffers held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been generated yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop buffers no mesh references any more
    pub fn purge_unused(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, geometry| Arc::strong_count(geometry) > 1);
        before - self.entries.len()
    }
}
