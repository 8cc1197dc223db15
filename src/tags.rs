//! Extraction of `@tag` values from a directive list.

use apollo_compiler::Name;
use apollo_compiler::ast;
use indexmap::IndexSet;

/// Collects the tag values attached to a node through `tag_name` directives.
///
/// A conforming application has `name: "<tag>"` as its first argument;
/// applications with the right directive name but the wrong shape are skipped
/// rather than treated as errors, since filtering is best-effort over trees
/// this crate does not validate.
pub fn tags_in(directives: &ast::DirectiveList, tag_name: &Name) -> IndexSet<String> {
    let mut tags = IndexSet::new();
    for directive in directives.iter().filter(|d| d.name == *tag_name) {
        let Some(argument) = directive.arguments.first() else {
            continue;
        };
        if argument.name != "name" {
            continue;
        }
        if let Some(tag) = argument.value.as_str() {
            tags.insert(tag.to_string());
        }
    }
    tags
}
