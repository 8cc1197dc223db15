//! Tag-based visibility filtering of a single subgraph document.
//!
//! The transform walks every taggable node (types, fields, field arguments,
//! input fields, enum values), strips `@tag` applications under the
//! document's resolved name, and appends `@inaccessible` to nodes the filter
//! hides. Member-bearing types are additionally tallied so callers can tell
//! which types ended up with *every* member hidden; that determination is
//! per-document here and only becomes authoritative after cross-subgraph
//! reconciliation (see [`crate::contract`]).

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::link;
use crate::tags::tags_in;

/// An include/exclude filter over tag names, as configured for one contract
/// variant.
///
/// An absent list means "no constraint of that kind". A *present but empty*
/// `include` list hides everything, since no tag set can intersect it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagFilter {
    /// Tags that keep a node visible: nodes whose tag set misses this list
    /// entirely are hidden.
    #[serde(default)]
    pub include: Option<IndexSet<String>>,
    /// Tags that hide a node: nodes whose tag set intersects this list are
    /// hidden, even when they also match `include`.
    #[serde(default)]
    pub exclude: Option<IndexSet<String>>,
}

impl TagFilter {
    /// Whether a node carrying `tags` is hidden by this filter.
    pub fn hides(&self, tags: &IndexSet<String>) -> bool {
        let missed_include = self
            .include
            .as_ref()
            .is_some_and(|include| include.is_disjoint(tags));
        let hit_exclude = self
            .exclude
            .as_ref()
            .is_some_and(|exclude| !exclude.is_disjoint(tags));
        missed_include || hit_exclude
    }

    /// Whether a member-bearing type node carrying `tags` is hidden.
    ///
    /// Only the exclude list applies at type level: the include list is
    /// enforced member by member, and excluding a type hides it even when
    /// individual members would have passed.
    fn hides_type(&self, tags: &IndexSet<String>) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|exclude| !exclude.is_disjoint(tags))
    }
}

/// Per-document rewrite context: the resolved local names of `@tag` and
/// `@inaccessible` plus the active filter.
///
/// Built once per subgraph document and carried into the cross-subgraph pass,
/// so every rewrite of one document agrees on which names are in effect.
#[derive(Debug, Clone)]
pub struct FilterContext {
    tag_name: Name,
    inaccessible_name: Name,
    filter: TagFilter,
}

impl FilterContext {
    pub fn for_subgraph_document(document: &ast::Document, filter: &TagFilter) -> Self {
        let tag_name = link::subgraph_directive_name(document, &link::DEFAULT_TAG_NAME);
        let inaccessible_name =
            link::subgraph_directive_name(document, &link::DEFAULT_INACCESSIBLE_NAME);
        tracing::debug!(%tag_name, %inaccessible_name, "resolved contract directive names");
        Self {
            tag_name,
            inaccessible_name,
            filter: filter.clone(),
        }
    }

    pub fn tag_name(&self) -> &Name {
        &self.tag_name
    }

    pub fn inaccessible_name(&self) -> &Name {
        &self.inaccessible_name
    }

    fn hides(&self, directives: &ast::DirectiveList) -> bool {
        self.filter.hides(&tags_in(directives, &self.tag_name))
    }

    fn hides_type(&self, directives: &ast::DirectiveList) -> bool {
        self.filter.hides_type(&tags_in(directives, &self.tag_name))
    }

    /// Strips every `@tag` application, then appends `@inaccessible` when the
    /// node is hidden. Other directives keep their order.
    fn rewrite_directives(&self, directives: &mut ast::DirectiveList, hidden: bool) {
        directives.0.retain(|d| d.name != self.tag_name);
        if hidden {
            self.insert_inaccessible(directives);
        }
    }

    /// Appends `@inaccessible` unless the node already carries one.
    fn insert_inaccessible(&self, directives: &mut ast::DirectiveList) {
        if !directives.iter().any(|d| d.name == self.inaccessible_name) {
            directives.push(Node::new(ast::Directive {
                name: self.inaccessible_name.clone(),
                arguments: Vec::new(),
            }));
        }
    }

    /// Returns true when every field ended up hidden (vacuously true for a
    /// fieldless occurrence). Field arguments are evaluated independently of
    /// their field.
    fn filter_fields(&self, fields: &mut Vec<Node<ast::FieldDefinition>>) -> bool {
        let mut all_members_hidden = true;
        for field in fields.iter_mut() {
            let field = field.make_mut();
            for argument in field.arguments.iter_mut() {
                let argument = argument.make_mut();
                let hidden = self.hides(&argument.directives);
                self.rewrite_directives(&mut argument.directives, hidden);
            }
            let hidden = self.hides(&field.directives);
            self.rewrite_directives(&mut field.directives, hidden);
            if !hidden {
                all_members_hidden = false;
            }
        }
        all_members_hidden
    }

    fn filter_input_fields(&self, fields: &mut Vec<Node<ast::InputValueDefinition>>) -> bool {
        let mut all_members_hidden = true;
        for field in fields.iter_mut() {
            let field = field.make_mut();
            let hidden = self.hides(&field.directives);
            self.rewrite_directives(&mut field.directives, hidden);
            if !hidden {
                all_members_hidden = false;
            }
        }
        all_members_hidden
    }

    fn filter_enum_values(&self, values: &mut Vec<Node<ast::EnumValueDefinition>>) -> bool {
        let mut all_members_hidden = true;
        for value in values.iter_mut() {
            let value = value.make_mut();
            let hidden = self.hides(&value.directives);
            self.rewrite_directives(&mut value.directives, hidden);
            if !hidden {
                all_members_hidden = false;
            }
        }
        all_members_hidden
    }

    /// Scalars and unions have no members: the type node itself is evaluated
    /// against the full filter.
    fn filter_leaf_type(&self, directives: &mut ast::DirectiveList) {
        let hidden = self.hides(directives);
        self.rewrite_directives(directives, hidden);
    }

    /// Second-pass rewriter used after reconciliation: forces the type-level
    /// `@inaccessible` marker (same dedup rule as the first pass) on every
    /// listed type, leaving everything else exactly as filtered.
    pub fn hide_types(
        &self,
        document: &ast::Document,
        type_names: &IndexSet<Name>,
    ) -> ast::Document {
        let mut hidden = document.clone();
        if type_names.is_empty() {
            return hidden;
        }
        for definition in hidden.definitions.iter_mut() {
            macro_rules! hide_if_listed {
                ($node:expr) => {
                    if type_names.contains(&$node.name) {
                        self.insert_inaccessible(&mut $node.make_mut().directives);
                    }
                };
            }
            match definition {
                ast::Definition::ObjectTypeDefinition(ty) => hide_if_listed!(ty),
                ast::Definition::ObjectTypeExtension(ty) => hide_if_listed!(ty),
                ast::Definition::InterfaceTypeDefinition(ty) => hide_if_listed!(ty),
                ast::Definition::InterfaceTypeExtension(ty) => hide_if_listed!(ty),
                ast::Definition::InputObjectTypeDefinition(ty) => hide_if_listed!(ty),
                ast::Definition::InputObjectTypeExtension(ty) => hide_if_listed!(ty),
                ast::Definition::EnumTypeDefinition(ty) => hide_if_listed!(ty),
                ast::Definition::EnumTypeExtension(ty) => hide_if_listed!(ty),
                _ => {}
            }
        }
        hidden
    }
}

/// The outcome of filtering one subgraph document.
#[derive(Debug)]
pub struct FilteredDocument {
    /// The rewritten document; the input is left untouched.
    pub document: ast::Document,
    /// Type names for which every syntactic occurrence (base definition and
    /// extensions alike) had all of its members hidden.
    pub fully_inaccessible_types: IndexSet<Name>,
    /// The rewrite context bound to this document's resolved directive names.
    pub context: FilterContext,
}

/// Tracks, per syntactic type occurrence, whether every member was hidden.
#[derive(Debug, Default)]
struct VisibilityTally {
    all_members_hidden: IndexSet<Name>,
    some_member_visible: IndexSet<Name>,
}

impl VisibilityTally {
    fn record(&mut self, type_name: &Name, all_members_hidden: bool) {
        if all_members_hidden {
            self.all_members_hidden.insert(type_name.clone());
        } else {
            self.some_member_visible.insert(type_name.clone());
        }
    }

    /// A type is fully inaccessible only if no occurrence of its name kept a
    /// visible member; evidence from any extension retracts the rest.
    fn fully_inaccessible(self) -> IndexSet<Name> {
        self.all_members_hidden
            .difference(&self.some_member_visible)
            .cloned()
            .collect()
    }
}

/// Applies `filter` to one subgraph document, returning the rewritten
/// document, the per-document fully-inaccessible type set, and the bound
/// rewrite context.
///
/// Nodes that are not taggable (schema definitions, directive definitions,
/// executable definitions) pass through unchanged. Nothing here raises:
/// malformed annotation shapes are treated as non-matches.
pub fn filter_subgraph_document(document: &ast::Document, filter: &TagFilter) -> FilteredDocument {
    let context = FilterContext::for_subgraph_document(document, filter);
    let mut tally = VisibilityTally::default();
    let mut filtered = document.clone();
    for definition in filtered.definitions.iter_mut() {
        macro_rules! filter_fields_type {
            ($node:expr) => {{
                let ty = $node.make_mut();
                let all_members_hidden = context.filter_fields(&mut ty.fields);
                let hidden = context.hides_type(&ty.directives);
                context.rewrite_directives(&mut ty.directives, hidden);
                tally.record(&ty.name, all_members_hidden);
            }};
        }
        macro_rules! filter_input_type {
            ($node:expr) => {{
                let ty = $node.make_mut();
                let all_members_hidden = context.filter_input_fields(&mut ty.fields);
                let hidden = context.hides_type(&ty.directives);
                context.rewrite_directives(&mut ty.directives, hidden);
                tally.record(&ty.name, all_members_hidden);
            }};
        }
        macro_rules! filter_enum_type {
            ($node:expr) => {{
                let ty = $node.make_mut();
                let all_members_hidden = context.filter_enum_values(&mut ty.values);
                let hidden = context.hides_type(&ty.directives);
                context.rewrite_directives(&mut ty.directives, hidden);
                tally.record(&ty.name, all_members_hidden);
            }};
        }
        match definition {
            ast::Definition::ObjectTypeDefinition(ty) => filter_fields_type!(ty),
            ast::Definition::ObjectTypeExtension(ty) => filter_fields_type!(ty),
            ast::Definition::InterfaceTypeDefinition(ty) => filter_fields_type!(ty),
            ast::Definition::InterfaceTypeExtension(ty) => filter_fields_type!(ty),
            ast::Definition::InputObjectTypeDefinition(ty) => filter_input_type!(ty),
            ast::Definition::InputObjectTypeExtension(ty) => filter_input_type!(ty),
            ast::Definition::EnumTypeDefinition(ty) => filter_enum_type!(ty),
            ast::Definition::EnumTypeExtension(ty) => filter_enum_type!(ty),
            ast::Definition::ScalarTypeDefinition(ty) => {
                context.filter_leaf_type(&mut ty.make_mut().directives)
            }
            ast::Definition::ScalarTypeExtension(ty) => {
                context.filter_leaf_type(&mut ty.make_mut().directives)
            }
            ast::Definition::UnionTypeDefinition(ty) => {
                context.filter_leaf_type(&mut ty.make_mut().directives)
            }
            ast::Definition::UnionTypeExtension(ty) => {
                context.filter_leaf_type(&mut ty.make_mut().directives)
            }
            _ => {}
        }
    }
    FilteredDocument {
        document: filtered,
        fully_inaccessible_types: tally.fully_inaccessible(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(sdl: &str) -> ast::Document {
        ast::Document::parse(sdl, "filter.graphql").unwrap()
    }

    fn include(tags: &[&str]) -> TagFilter {
        TagFilter {
            include: Some(tags.iter().map(|t| t.to_string()).collect()),
            exclude: None,
        }
    }

    fn exclude(tags: &[&str]) -> TagFilter {
        TagFilter {
            include: None,
            exclude: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    fn tag_set(tags: &[&str]) -> IndexSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn include_hides_nodes_missing_every_tag() {
        let filter = include(&["public"]);
        assert!(filter.hides(&tag_set(&[])));
        assert!(filter.hides(&tag_set(&["internal"])));
        assert!(!filter.hides(&tag_set(&["public"])));
        assert!(!filter.hides(&tag_set(&["internal", "public"])));
    }

    #[test]
    fn exclude_hides_nodes_carrying_any_tag() {
        let filter = exclude(&["internal"]);
        assert!(!filter.hides(&tag_set(&[])));
        assert!(!filter.hides(&tag_set(&["public"])));
        assert!(filter.hides(&tag_set(&["internal"])));
        assert!(filter.hides(&tag_set(&["public", "internal"])));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = TagFilter {
            include: Some(tag_set(&["public"])),
            exclude: Some(tag_set(&["internal"])),
        };
        assert!(!filter.hides(&tag_set(&["public"])));
        assert!(filter.hides(&tag_set(&["public", "internal"])));
        assert!(filter.hides(&tag_set(&["other"])));
    }

    #[test]
    fn empty_include_list_hides_everything() {
        let filter = include(&[]);
        assert!(filter.hides(&tag_set(&[])));
        assert!(filter.hides(&tag_set(&["public"])));
    }

    #[test]
    fn absent_lists_hide_nothing() {
        let filter = TagFilter::default();
        assert!(!filter.hides(&tag_set(&[])));
        assert!(!filter.hides(&tag_set(&["anything"])));
    }

    #[test]
    fn filter_deserializes_from_config() {
        let filter: TagFilter =
            serde_json::from_str(r#"{ "include": ["public"], "exclude": ["internal"] }"#).unwrap();
        assert_eq!(
            filter,
            TagFilter {
                include: Some(tag_set(&["public"])),
                exclude: Some(tag_set(&["internal"])),
            }
        );
        let filter: TagFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter, TagFilter::default());
        assert!(serde_json::from_str::<TagFilter>(r#"{ "includes": [] }"#).is_err());
    }

    #[test]
    fn strips_tags_and_marks_hidden_fields() {
        let input = parse(
            r#"
            type Query {
              a: Int @tag(name: "public")
              b(arg: Int @tag(name: "internal")): Int @tag(name: "internal") @deprecated
            }
            "#,
        );
        let expected = parse(
            r#"
            type Query {
              a: Int
              b(arg: Int @inaccessible): Int @deprecated @inaccessible
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
        assert!(filtered.fully_inaccessible_types.is_empty());
    }

    #[test]
    fn input_is_left_untouched() {
        let input = parse(r#"type Query { a: Int @tag(name: "internal") }"#);
        let before = input.to_string();
        let _ = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(input.to_string(), before);
    }

    #[test]
    fn marking_is_idempotent() {
        let input = parse(r#"type Query { a: Int @inaccessible @tag(name: "internal") }"#);
        let expected = parse("type Query { a: Int @inaccessible }");
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
    }

    #[test]
    fn type_level_exclude_overrides_visible_fields() {
        let input = parse(
            r#"
            type Private @tag(name: "internal") {
              a: Int @tag(name: "public")
            }
            "#,
        );
        let expected = parse(
            r#"
            type Private @inaccessible {
              a: Int
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
        // The field stayed visible, so the type is not fully inaccessible.
        assert!(filtered.fully_inaccessible_types.is_empty());
    }

    #[test]
    fn include_does_not_hide_types_at_type_level() {
        let input = parse(
            r#"
            type Query @tag(name: "internal") {
              a: Int @tag(name: "public")
            }
            "#,
        );
        let expected = parse(
            r#"
            type Query {
              a: Int
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &include(&["public"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
    }

    #[test]
    fn fully_hidden_type_is_tallied() {
        let input = parse(
            r#"
            type Hidden {
              a: Int @tag(name: "internal")
              b: Int @tag(name: "internal")
            }
            type Kept {
              a: Int @tag(name: "internal")
              b: Int
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(
            filtered.fully_inaccessible_types,
            IndexSet::from([name!("Hidden")])
        );
    }

    #[test]
    fn extension_with_visible_field_retracts_fully_hidden_base() {
        let input = parse(
            r#"
            type Product {
              a: Int @tag(name: "internal")
            }
            extend type Product {
              b: Int
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert!(filtered.fully_inaccessible_types.is_empty());
    }

    #[test]
    fn enums_tally_like_field_types() {
        let input = parse(
            r#"
            enum Color {
              RED @tag(name: "internal")
              BLUE @tag(name: "internal")
            }
            "#,
        );
        let expected = parse(
            r#"
            enum Color {
              RED @inaccessible
              BLUE @inaccessible
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
        assert_eq!(
            filtered.fully_inaccessible_types,
            IndexSet::from([name!("Color")])
        );
    }

    #[test]
    fn input_objects_tally_their_fields() {
        let input = parse(
            r#"
            input Options {
              a: Int @tag(name: "internal")
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(
            filtered.fully_inaccessible_types,
            IndexSet::from([name!("Options")])
        );
    }

    #[test]
    fn scalars_and_unions_are_hidden_but_never_tallied() {
        let input = parse(
            r#"
            scalar Secret @tag(name: "internal")
            union Anything @tag(name: "internal") = Query
            type Query { a: Int }
            "#,
        );
        let expected = parse(
            r#"
            scalar Secret @inaccessible
            union Anything @inaccessible = Query
            type Query { a: Int }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
        assert!(filtered.fully_inaccessible_types.is_empty());
    }

    #[test]
    fn directive_definitions_and_executables_pass_through() {
        // Filtering targets types and their members; a `@tag` sitting on a
        // directive definition's argument is part of that definition and must
        // survive, as must operations and fragments.
        let input = parse(
            r#"
            directive @audit(reason: String @tag(name: "internal")) on FIELD

            query Fetch {
              a @audit(reason: "why")
            }

            fragment Fields on Query {
              a
            }

            type Query {
              a: Int @tag(name: "internal")
            }
            "#,
        );
        let expected = parse(
            r#"
            directive @audit(reason: String @tag(name: "internal")) on FIELD

            query Fetch {
              a @audit(reason: "why")
            }

            fragment Fields on Query {
              a
            }

            type Query {
              a: Int @inaccessible
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        assert_eq!(filtered.document.to_string(), expected.to_string());
        assert_eq!(
            filtered.fully_inaccessible_types,
            IndexSet::from([name!("Query")])
        );
    }

    #[test]
    fn renamed_directives_are_honored() {
        let input = parse(
            r#"
            extend schema
              @link(
                url: "https://specs.apollo.dev/federation/v2.3",
                import: [{ name: "@tag", as: "@label" }, "@inaccessible"]
              )
            type Query {
              a: Int @label(name: "internal")
              b: Int @tag(name: "internal")
            }
            "#,
        );
        let filtered = filter_subgraph_document(&input, &exclude(&["internal"]));
        let query_fields = filtered
            .document
            .definitions
            .iter()
            .find_map(|def| match def {
                ast::Definition::ObjectTypeDefinition(ty) => Some(&ty.fields),
                _ => None,
            })
            .unwrap();
        // `a` was tagged under the renamed directive and gets hidden; `b`'s
        // `@tag` is some unrelated directive here and survives untouched.
        assert!(query_fields[0].directives.iter().any(|d| d.name == "inaccessible"));
        assert!(query_fields[1].directives.iter().any(|d| d.name == "tag"));
    }

    #[test]
    fn hide_types_forces_type_level_marker_once() {
        let input = parse(
            r#"
            type Hidden @inaccessible { a: Int }
            type Other { a: Int }
            enum Color { RED }
            "#,
        );
        let expected = parse(
            r#"
            type Hidden @inaccessible { a: Int }
            type Other { a: Int }
            enum Color @inaccessible { RED }
            "#,
        );
        let context = FilterContext::for_subgraph_document(&input, &TagFilter::default());
        let hidden = context.hide_types(
            &input,
            &IndexSet::from([name!("Hidden"), name!("Color")]),
        );
        assert_eq!(hidden.to_string(), expected.to_string());
    }
}
