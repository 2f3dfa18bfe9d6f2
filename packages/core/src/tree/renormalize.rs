//! Renormalization of drifted positions
//!
//! Repeated midpoint insertion into the same slot halves the gap each time,
//! so `pos` values grow long fractional tails. A pass flags every parent with
//! a child whose `pos` has `precision_digits` or more fraction digits and
//! rewrites that parent's children to `1, 2, 3, ...` in their current order.
//! Only children whose value actually changes are written (and so marked
//! dirty). The pinned view gets the same treatment for `pinned_pos`.

use std::collections::BTreeSet;

use crate::db::{FractionalOrderCalculator, NodeStore};
use crate::tree::OutlineTree;

/// Outcome of one renormalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenormalizationReport {
    /// Parents whose children were re-ranked
    pub parents: Vec<String>,
    /// Nodes whose `pos` changed
    pub rewritten: Vec<String>,
    /// Nodes whose `pinned_pos` changed
    pub pinned_rewritten: Vec<String>,
}

impl RenormalizationReport {
    pub fn is_empty(&self) -> bool {
        self.rewritten.is_empty() && self.pinned_rewritten.is_empty()
    }
}

impl<S: NodeStore> OutlineTree<S> {
    /// Parents with at least one drifted child, in id order
    pub fn parents_needing_renormalization(&self) -> Vec<String> {
        let digits = self.limits.precision_digits;
        let flagged: BTreeSet<&str> = self
            .store
            .all()
            .filter(|node| !node.is_deleted())
            .filter(|node| FractionalOrderCalculator::needs_renormalization(node.pos, digits))
            .map(|node| node.parent_id.as_str())
            .collect();

        flagged.into_iter().map(str::to_string).collect()
    }

    fn pinned_needs_renormalization(&self) -> bool {
        let digits = self.limits.precision_digits;
        self.store.all().filter(|node| !node.is_deleted()).any(|node| {
            node.pinned_pos
                .is_some_and(|p| FractionalOrderCalculator::needs_renormalization(p, digits))
        })
    }

    /// Run one pass over the whole store
    pub fn renormalize(&mut self) -> RenormalizationReport {
        let mut report = RenormalizationReport {
            parents: self.parents_needing_renormalization(),
            ..Default::default()
        };

        for parent_id in &report.parents {
            let children = self.index.children(parent_id).to_vec();
            let ranks = FractionalOrderCalculator::rebalance(children.len());
            for (child_id, rank) in children.iter().zip(ranks) {
                let Some(node) = self.store.get(child_id) else {
                    continue;
                };
                if node.pos == rank {
                    continue;
                }
                let mut node = node.clone();
                node.pos = rank;
                self.write(node);
                report.rewritten.push(child_id.clone());
            }
        }

        if self.limits.renormalize_pinned && self.pinned_needs_renormalization() {
            let pinned = self.pinned_ids();
            let ranks = FractionalOrderCalculator::rebalance(pinned.len());
            for (id, rank) in pinned.iter().zip(ranks) {
                let Some(node) = self.store.get(id) else {
                    continue;
                };
                if node.pinned_pos == Some(rank) {
                    continue;
                }
                let mut node = node.clone();
                node.pinned_pos = Some(rank);
                self.write(node);
                report.pinned_rewritten.push(id.clone());
            }
        }

        if report.is_empty() {
            tracing::debug!("Renormalization pass found no drifted positions");
        } else {
            tracing::info!(
                "Renormalized {} positions under {} parents ({} pinned)",
                report.rewritten.len(),
                report.parents.len(),
                report.pinned_rewritten.len()
            );
        }

        report
    }
}
