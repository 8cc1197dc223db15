//! Tag extraction from a composed supergraph document.

use apollo_compiler::Name;
use apollo_compiler::ast;
use indexmap::IndexSet;

use crate::link;

/// Collects every distinct tag value used anywhere in a composed document.
///
/// Returns `None` when the document does not `@link` the tag specification at
/// all; callers must treat that as "no tag spec declared", which is not the
/// same thing as a declared spec with no applications (`Some` of an empty
/// list). Order is insertion order over a full-tree walk, so repeated calls
/// on the same document are deterministic.
pub fn extract_tags(document: &ast::Document) -> Option<Vec<String>> {
    let tag_name = link::supergraph_directive_name(
        document,
        link::TAG_SPEC_URL_PREFIX,
        &link::DEFAULT_TAG_NAME,
    )?;
    tracing::debug!(%tag_name, "resolved supergraph tag directive name");
    let mut tags: IndexSet<String> = IndexSet::new();
    for definition in &document.definitions {
        match definition {
            ast::Definition::SchemaDefinition(schema) => {
                collect(&schema.directives, &tag_name, &mut tags);
            }
            ast::Definition::SchemaExtension(schema) => {
                collect(&schema.directives, &tag_name, &mut tags);
            }
            ast::Definition::ObjectTypeDefinition(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                collect_fields(&ty.fields, &tag_name, &mut tags);
            }
            ast::Definition::ObjectTypeExtension(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                collect_fields(&ty.fields, &tag_name, &mut tags);
            }
            ast::Definition::InterfaceTypeDefinition(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                collect_fields(&ty.fields, &tag_name, &mut tags);
            }
            ast::Definition::InterfaceTypeExtension(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                collect_fields(&ty.fields, &tag_name, &mut tags);
            }
            ast::Definition::InputObjectTypeDefinition(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                collect_input_values(&ty.fields, &tag_name, &mut tags);
            }
            ast::Definition::InputObjectTypeExtension(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                collect_input_values(&ty.fields, &tag_name, &mut tags);
            }
            ast::Definition::EnumTypeDefinition(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                for value in &ty.values {
                    collect(&value.directives, &tag_name, &mut tags);
                }
            }
            ast::Definition::EnumTypeExtension(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
                for value in &ty.values {
                    collect(&value.directives, &tag_name, &mut tags);
                }
            }
            ast::Definition::ScalarTypeDefinition(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
            }
            ast::Definition::ScalarTypeExtension(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
            }
            ast::Definition::UnionTypeDefinition(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
            }
            ast::Definition::UnionTypeExtension(ty) => {
                collect(&ty.directives, &tag_name, &mut tags);
            }
            ast::Definition::DirectiveDefinition(def) => {
                collect_input_values(&def.arguments, &tag_name, &mut tags);
            }
            ast::Definition::OperationDefinition(_) | ast::Definition::FragmentDefinition(_) => {}
        }
    }
    Some(tags.into_iter().collect())
}

fn collect(directives: &ast::DirectiveList, tag_name: &Name, tags: &mut IndexSet<String>) {
    tags.extend(crate::tags::tags_in(directives, tag_name));
}

fn collect_fields(
    fields: &[apollo_compiler::Node<ast::FieldDefinition>],
    tag_name: &Name,
    tags: &mut IndexSet<String>,
) {
    // Arguments first, matching the filtering pass's traversal order.
    for field in fields {
        collect_input_values(&field.arguments, tag_name, tags);
        collect(&field.directives, tag_name, tags);
    }
}

fn collect_input_values(
    values: &[apollo_compiler::Node<ast::InputValueDefinition>],
    tag_name: &Name,
    tags: &mut IndexSet<String>,
) {
    for value in values {
        collect(&value.directives, tag_name, tags);
    }
}
