use std::fmt;

use apollo_compiler::ast;

/// One subgraph's contribution to a federated graph: an opaque name paired
/// with its schema document. Contract filtering needs nothing else about the
/// subgraph (routing URL and the like stay with the caller).
pub struct Subgraph {
    pub name: String,
    pub document: ast::Document,
}

impl Subgraph {
    pub fn new(name: impl Into<String>, document: ast::Document) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

impl fmt::Debug for Subgraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subgraph")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
