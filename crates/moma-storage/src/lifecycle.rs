//! Lifecycle operations: batched property overlay and cascading delete.

use indexmap::IndexSet;
use moma_core::{Label, LabelFamily, PgGraph};

use crate::adapter::{normalize_properties, GraphAdapter};
use crate::error::StorageError;
use crate::traits::GraphStore;
use crate::traverse::{walk, MAX_HOPS};
use crate::types::{DeleteStatus, OverlayStatus, PropertyOverlay};

fn is_dataset(labels: &[String]) -> bool {
    labels.iter().any(|l| l == Label::Dataset.as_str())
}

impl<S: GraphStore> GraphAdapter<S> {
    /// Overlays the properties of each node in `updates` onto the stored
    /// node with the same id. Labels and edges in `updates` are ignored,
    /// unknown ids are skipped, a `null` value removes the property.
    pub fn apply_property_overlay(&mut self, updates: &PgGraph) -> Result<OverlayStatus, StorageError> {
        let overlays: Vec<PropertyOverlay> = updates
            .nodes
            .iter()
            .filter(|n| !n.id.is_empty())
            .map(|n| PropertyOverlay {
                id: n.id.clone(),
                properties: normalize_properties(&n.properties),
            })
            .collect();
        let updated_count = self.store_mut().overlay_properties(&overlays)?;
        tracing::debug!(requested = overlays.len(), updated_count, "applied property overlay");
        Ok(OverlayStatus { updated_count })
    }

    /// Deletes the given Dataset roots (all roots when `ids` is empty) and
    /// every dependent-family node within [`MAX_HOPS`] of them.
    ///
    /// The walk may pass through non-dependent nodes but never through
    /// another Dataset root. Only the roots and dependent-family nodes are
    /// removed; everything else the walk touches stays. Ids that are not
    /// Dataset roots are ignored.
    pub fn cascade_delete(&mut self, ids: &[String]) -> Result<DeleteStatus, StorageError> {
        let roots: Vec<String> = if ids.is_empty() {
            self.dataset_roots()?.into_iter().map(|n| n.id).collect()
        } else {
            self.read_nodes(ids)?
                .into_iter()
                .filter(|n| is_dataset(&n.labels))
                .map(|n| n.id)
                .collect()
        };

        let mut doomed: IndexSet<String> = IndexSet::new();
        for root in &roots {
            let Some(hood) = walk(self, root, MAX_HOPS, |n| !is_dataset(&n.labels))? else {
                continue;
            };
            doomed.insert(root.clone());
            for (node, _) in &hood.nodes {
                if LabelFamily::is_dependent(node.labels.as_slice()) {
                    doomed.insert(node.id.clone());
                }
            }
        }

        let doomed: Vec<String> = doomed.into_iter().collect();
        let deleted_count = self.store_mut().delete_nodes(&doomed)?;
        tracing::debug!(roots = roots.len(), deleted_count, "cascade delete");
        Ok(DeleteStatus { deleted_count, roots })
    }
}
