//! Formality graph lists.

use tracing::debug;

use super::{GraphCaches, GraphList};
use crate::Result;
use crate::generate::FormalityOptions;
use crate::model::FormalityGraph;

impl GraphCaches {
    /// Canonical formality graphs of shape `(num_ground, num_aerial,
    /// num_edges)` passing `options`, in a fixed order.
    pub fn formality_graphs(
        &self,
        num_ground: usize,
        num_aerial: usize,
        num_edges: usize,
        options: &FormalityOptions,
    ) -> Result<GraphList<FormalityGraph>> {
        let key = (num_ground, num_aerial, num_edges, options.clone());
        self.inner.formality.get_or_compute(key, || {
            let name = options.entry_name(num_ground, num_aerial, num_edges);
            debug!(entry = %name, "formality cache miss");
            let graphs = self.load_or_generate(&name, || {
                self.generator().formality_graphs(num_ground, num_aerial, num_edges, options)
            })?;
            Ok(GraphList::new(graphs))
        })
    }
}
