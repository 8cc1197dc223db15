//! Cross-subgraph reconciliation of filtered documents.
//!
//! A type must only be hidden at the type level if *every* subgraph defining
//! it ended up with all of its members hidden: as long as one subgraph still
//! exposes an accessible member, the type stays visible overall, and the
//! member-level `@inaccessible` markers from the first pass are enough.

use itertools::Itertools;

use crate::filter::FilteredDocument;
use crate::filter::TagFilter;
use crate::filter::filter_subgraph_document;
use crate::sets::intersect_all;
use crate::subgraph::Subgraph;

/// Filters every subgraph document against `filter`, then reconciles
/// "fully inaccessible" types across subgraphs and force-marks only those
/// hidden everywhere.
///
/// Subgraph identity and order are preserved. The input documents are not
/// mutated; each returned subgraph carries a rewritten document.
pub fn filter_subgraphs(subgraphs: &[Subgraph], filter: &TagFilter) -> Vec<Subgraph> {
    // Each per-document pass only reads its own document and the shared
    // filter; the intersection below is the single cross-subgraph barrier.
    let filtered: Vec<(&Subgraph, FilteredDocument)> = subgraphs
        .iter()
        .map(|subgraph| (subgraph, filter_subgraph_document(&subgraph.document, filter)))
        .collect();
    let hidden_everywhere = intersect_all(
        filtered
            .iter()
            .map(|(_, outcome)| &outcome.fully_inaccessible_types),
    );
    tracing::debug!(
        types = %hidden_everywhere.iter().join(", "),
        "types fully inaccessible in every subgraph"
    );
    filtered
        .into_iter()
        .map(|(subgraph, outcome)| {
            Subgraph::new(
                subgraph.name.clone(),
                outcome
                    .context
                    .hide_types(&outcome.document, &hidden_everywhere),
            )
        })
        .collect()
}
