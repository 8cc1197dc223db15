//! Tag-based schema visibility filtering for Apollo Federation contracts.
//!
//! Given subgraph documents annotated with `@tag`, this crate rewrites each
//! document so that fields, arguments, enum values, and whole types excluded
//! by an include/exclude tag filter are marked `@inaccessible`, reconciling
//! "every member of this type is hidden" across subgraphs so a type only
//! disappears at the type level when no subgraph still exposes it. It also
//! extracts the set of tags declared in a composed supergraph document.
//!
//! Inputs and outputs are `apollo_compiler::ast` trees: parsing SDL and
//! printing it back is the caller's business, as is any validation of the
//! resulting schema. Filtering is a best-effort structural rewrite: nodes
//! with unexpected shapes pass through unchanged.

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod contract;
pub mod filter;
pub mod link;
mod sets;
pub mod subgraph;
pub mod supergraph;
pub mod tags;

pub use crate::contract::filter_subgraphs;
pub use crate::filter::FilterContext;
pub use crate::filter::FilteredDocument;
pub use crate::filter::TagFilter;
pub use crate::filter::filter_subgraph_document;
pub use crate::subgraph::Subgraph;
pub use crate::supergraph::extract_tags;
