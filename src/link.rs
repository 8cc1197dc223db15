//! Resolution of `@link`-imported directive names.
//!
//! Subgraphs and supergraphs may rename the directives this crate cares about
//! (`@tag` and `@inaccessible`) through the `@link` import mechanism, so every
//! pass starts by resolving the *local* name of each directive in the document
//! it is about to walk. Two conventions exist:
//!
//! * subgraph documents follow the federation spec convention: no `@link` at
//!   all means a legacy (pre-import) schema using the canonical names, a
//!   federation `@link` without a matching import means the namespace-prefixed
//!   form (`federation__tag`), and an import entry may alias the name;
//! * supergraph documents link each spec individually (`@link(url:
//!   "https://specs.apollo.dev/tag/v0.2")`), where only an `as:` argument on
//!   the link itself renames the directive, and the absence of a qualifying
//!   link means the spec is not declared at all.

use std::fmt;

use apollo_compiler::InvalidNameError;
use apollo_compiler::Name;
use apollo_compiler::ast;
use apollo_compiler::ast::Value;
use apollo_compiler::name;
use thiserror::Error;

pub const DEFAULT_LINK_NAME: Name = name!("link");
pub const DEFAULT_TAG_NAME: Name = name!("tag");
pub const DEFAULT_INACCESSIBLE_NAME: Name = name!("inaccessible");

pub const FEDERATION_SPEC_URL_PREFIX: &str = "https://specs.apollo.dev/federation";
pub const TAG_SPEC_URL_PREFIX: &str = "https://specs.apollo.dev/tag";

#[derive(Error, Debug, PartialEq)]
pub enum LinkError {
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
    #[error("the `url` argument for @link must be a string")]
    MissingUrl,
    #[error("invalid entry in @link(import:) argument: {0}")]
    MalformedImport(String),
}

/// One entry of a `@link(import:)` list.
#[derive(Eq, PartialEq, Debug)]
pub struct Import {
    /// The name of the imported element, without any leading `@`.
    pub element: Name,
    /// Whether the imported element is a directive (otherwise it is a type).
    pub is_directive: bool,
    /// The optional alias under which the element is imported, without any
    /// leading `@`.
    pub alias: Option<Name>,
}

impl Import {
    pub fn from_value(value: &Value) -> Result<Import, LinkError> {
        match value {
            Value::String(str) => {
                if let Some(directive_name) = str.strip_prefix('@') {
                    Ok(Import {
                        element: Name::new(directive_name)?,
                        is_directive: true,
                        alias: None,
                    })
                } else {
                    Ok(Import {
                        element: Name::new(str)?,
                        is_directive: false,
                        alias: None,
                    })
                }
            }
            Value::Object(fields) => {
                let mut name: Option<&str> = None;
                let mut alias: Option<&str> = None;
                for (k, v) in fields {
                    match k.as_str() {
                        "name" => {
                            name = Some(v.as_str().ok_or_else(|| {
                                LinkError::MalformedImport(
                                    "the `name` field must be a string".to_string(),
                                )
                            })?)
                        }
                        "as" => {
                            alias = Some(v.as_str().ok_or_else(|| {
                                LinkError::MalformedImport(
                                    "the `as` field must be a string".to_string(),
                                )
                            })?)
                        }
                        _ => {
                            return Err(LinkError::MalformedImport(format!("unknown field `{k}`")));
                        }
                    }
                }
                let Some(element) = name else {
                    return Err(LinkError::MalformedImport(
                        "missing mandatory `name` field".to_string(),
                    ));
                };
                let (element, is_directive) = match element.strip_prefix('@') {
                    Some(directive_name) => (directive_name, true),
                    None => (element, false),
                };
                // A directive alias normally carries a leading '@' too; accept
                // it either way and store the bare name.
                let alias = alias
                    .map(|a| Name::new(a.strip_prefix('@').unwrap_or(a)))
                    .transpose()?;
                Ok(Import {
                    element: Name::new(element)?,
                    is_directive,
                    alias,
                })
            }
            _ => Err(LinkError::MalformedImport(
                "values should be either strings or input object values of the form \
                 { name: \"<importedElement>\", as: \"<alias>\" }"
                    .to_string(),
            )),
        }
    }

    /// The name this element goes by in the importing document.
    pub fn imported_name(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.element)
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.is_directive { "@" } else { "" };
        match &self.alias {
            Some(alias) => write!(f, r#"{{ name: "{at}{}", as: "{at}{alias}" }}"#, self.element),
            None => write!(f, r#""{at}{}""#, self.element),
        }
    }
}

/// One `@link` directive application on a schema definition or extension.
#[derive(Debug)]
pub struct Link {
    pub url: String,
    pub spec_alias: Option<Name>,
    pub imports: Vec<Import>,
}

impl Link {
    /// Parses a single `@link` application. Import entries that are
    /// individually malformed are dropped; a missing or non-string `url` makes
    /// the whole application unusable.
    pub fn from_directive_application(directive: &ast::Directive) -> Result<Link, LinkError> {
        let url = directive
            .specified_argument_by_name("url")
            .and_then(|value| value.as_str())
            .ok_or(LinkError::MissingUrl)?;
        let spec_alias = directive
            .specified_argument_by_name("as")
            .and_then(|value| value.as_str())
            .map(Name::new)
            .transpose()?;
        let imports = directive
            .specified_argument_by_name("import")
            .and_then(|value| value.as_list())
            .unwrap_or(&[])
            .iter()
            .filter_map(|value| Import::from_value(value).ok())
            .collect();
        Ok(Link {
            url: url.to_string(),
            spec_alias,
            imports,
        })
    }

    /// The local name of `directive_name` under this link, following the
    /// federation import convention: an explicit import (possibly aliased)
    /// wins, anything else gets the namespace-prefixed form.
    fn federation_directive_name(&self, directive_name: &Name) -> Name {
        for import in &self.imports {
            if import.is_directive && import.element == *directive_name {
                return import.imported_name().clone();
            }
        }
        // Both sides are `Name`s and we just add valid characters in between.
        Name::new_unchecked(&format!("federation__{directive_name}"))
    }
}

/// Resolves the local name of a federation directive in a subgraph document.
///
/// Never fails: a document with no federation `@link` is assumed to follow the
/// legacy (pre-import) convention where the canonical names apply as-is.
pub fn subgraph_directive_name(document: &ast::Document, directive_name: &Name) -> Name {
    match federation_link(document) {
        Some(link) => link.federation_directive_name(directive_name),
        None => directive_name.clone(),
    }
}

/// Resolves the local name of a spec directive in a supergraph document, or
/// `None` if the document does not link the spec at all.
///
/// Only the first schema definition or extension is consulted: composed
/// documents carry a single canonical schema definition, and which `@link`
/// wins must not depend on later extensions.
pub fn supergraph_directive_name(
    document: &ast::Document,
    spec_url_prefix: &str,
    directive_name: &Name,
) -> Option<Name> {
    let directives = document.definitions.iter().find_map(|def| match def {
        ast::Definition::SchemaDefinition(schema) => Some(&schema.directives),
        ast::Definition::SchemaExtension(schema) => Some(&schema.directives),
        _ => None,
    })?;
    for directive in directives.iter().filter(|d| d.name == DEFAULT_LINK_NAME) {
        let Ok(link) = Link::from_directive_application(directive) else {
            continue;
        };
        if link.url.starts_with(spec_url_prefix) {
            return Some(link.spec_alias.unwrap_or_else(|| directive_name.clone()));
        }
    }
    None
}

/// The first federation `@link` found on any schema definition or extension.
fn federation_link(document: &ast::Document) -> Option<Link> {
    document
        .definitions
        .iter()
        .filter_map(|def| match def {
            ast::Definition::SchemaDefinition(schema) => Some(&schema.directives),
            ast::Definition::SchemaExtension(schema) => Some(&schema.directives),
            _ => None,
        })
        .flat_map(|directives| directives.iter())
        .filter(|directive| directive.name == DEFAULT_LINK_NAME)
        .filter_map(|directive| Link::from_directive_application(directive).ok())
        .find(|link| link.url.starts_with(FEDERATION_SPEC_URL_PREFIX))
}
