//! Schema path parser
//!
//! A schema is declared as an ordered list of leaf paths:
//!
//! ```text
//! doc.links[*].url
//! doc.links[*].language
//! ```
//!
//! Segments are separated by `.`, and a trailing `[*]` marks the field as
//! repeated. Paths sharing a prefix share the corresponding subtree.

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{SchemaError, SchemaResult};
use super::types::{ColumnDescriptor, Level, NodeId, Schema};

/// Suffix marking a repeated field
const REPEATED_SUFFIX: &str = "[*]";

/// Deepest path accepted, in segments; equal to serde_json's recursion limit
pub const MAX_PATH_DEPTH: usize = 128;

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A field name may hold anything except the path metacharacters.
        Regex::new(r"^([^.\[\]*]+)(\[\*\])?$").expect("segment pattern is valid")
    })
}

/// One parsed path segment
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment<'a> {
    name: &'a str,
    repeated: bool,
}

fn parse_segments(path: &str) -> SchemaResult<Vec<Segment<'_>>> {
    if path.trim().is_empty() {
        return Err(SchemaError::malformed_path(path, "path is empty"));
    }

    let raw: Vec<&str> = path.split('.').collect();
    if raw.len() > MAX_PATH_DEPTH {
        return Err(SchemaError::malformed_path(
            path,
            format!("path is nested deeper than {} segments", MAX_PATH_DEPTH),
        ));
    }

    raw.into_iter()
        .map(|segment| {
            if segment.is_empty() {
                return Err(SchemaError::malformed_path(path, "empty segment"));
            }
            let captures = segment_pattern().captures(segment).ok_or_else(|| {
                SchemaError::malformed_path(
                    path,
                    format!("invalid segment '{}'", segment),
                )
            })?;
            let name = captures.get(1).map_or("", |m| m.as_str());
            Ok(Segment {
                name,
                repeated: captures.get(2).is_some(),
            })
        })
        .collect()
}

/// Incrementally merges paths into the descriptor arena.
struct SchemaBuilder {
    nodes: Vec<ColumnDescriptor>,
    /// Whether a node was declared as the end of some path
    declared_leaf: Vec<bool>,
}

impl SchemaBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![ColumnDescriptor::root()],
            declared_leaf: vec![false],
        }
    }

    fn add_path(&mut self, path: &str) -> SchemaResult<()> {
        let segments = parse_segments(path)?;
        let last = segments.len() - 1;

        let mut current = NodeId::ROOT;
        for (i, segment) in segments.iter().enumerate() {
            let is_last = i == last;

            current = match self.find_child(current, segment.name) {
                Some(existing) => {
                    let node = &self.nodes[existing.0];
                    if node.repeated != segment.repeated {
                        return Err(SchemaError::repetition_conflict(path, segment.name));
                    }
                    if is_last {
                        if !node.children.is_empty() {
                            return Err(SchemaError::leaf_conflict(path, segment.name));
                        }
                        return Err(SchemaError::duplicate_path(path));
                    }
                    if self.declared_leaf[existing.0] {
                        return Err(SchemaError::leaf_conflict(path, segment.name));
                    }
                    existing
                }
                None => self.add_child(current, segment),
            };
        }

        self.declared_leaf[current.0] = true;
        Ok(())
    }

    fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].name == name)
    }

    fn add_child(&mut self, parent: NodeId, segment: &Segment<'_>) -> NodeId {
        let parent_node = &self.nodes[parent.0];

        let mut path = String::with_capacity(parent_node.path.len() + segment.name.len() + 4);
        if !parent_node.path.is_empty() {
            path.push_str(&parent_node.path);
            path.push('.');
        }
        path.push_str(segment.name);
        if segment.repeated {
            path.push_str(REPEATED_SUFFIX);
        }

        let node = ColumnDescriptor {
            name: segment.name.to_string(),
            path,
            repeated: segment.repeated,
            max_repetition_level: parent_node.max_repetition_level + Level::from(segment.repeated),
            max_definition_level: parent_node.max_definition_level + 1,
            parent: Some(parent),
            children: Vec::new(),
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.declared_leaf.push(false);
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl Schema {
    /// Parses an ordered list of leaf paths into a schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if:
    /// - No path is given (DREMEL_SCHEMA_EMPTY)
    /// - A path or segment is malformed (DREMEL_SCHEMA_MALFORMED_PATH)
    /// - A field is both repeated and non-repeated (DREMEL_SCHEMA_REPETITION_CONFLICT)
    /// - A field is both a leaf and a group (DREMEL_SCHEMA_LEAF_CONFLICT)
    /// - A leaf path repeats (DREMEL_SCHEMA_DUPLICATE_PATH)
    pub fn parse<I, S>(paths: I) -> SchemaResult<Schema>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = SchemaBuilder::new();
        let mut count = 0usize;
        for path in paths {
            builder.add_path(path.as_ref())?;
            count += 1;
        }
        if count == 0 {
            return Err(SchemaError::empty());
        }
        Ok(Schema::from_nodes(builder.nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;

    fn parse_err(paths: &[&str]) -> SchemaErrorCode {
        Schema::parse(paths.iter().copied()).unwrap_err().code()
    }

    #[test]
    fn test_segment_parsing() {
        let segments = parse_segments("doc.links[*].url").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment { name: "doc", repeated: false },
                Segment { name: "links", repeated: true },
                Segment { name: "url", repeated: false },
            ]
        );
    }

    #[test]
    fn test_shared_prefix_merges() {
        let schema = Schema::parse(["doc.links[*].url", "doc.links[*].language"]).unwrap();
        // root, doc, links, url, language
        assert_eq!(schema.node_count(), 5);
        assert_eq!(schema.leaf_count(), 2);
    }

    #[test]
    fn test_levels_accumulate() {
        let schema = Schema::parse(["a[*].b.c[*]"]).unwrap();
        let c = schema.node(schema.leaf(0).unwrap());
        assert!(c.is_repeated());
        assert_eq!(c.max_repetition_level(), 2);
        assert_eq!(c.max_definition_level(), 3);
        assert_eq!(c.path(), "a[*].b.c[*]");
    }

    #[test]
    fn test_empty_schema_rejected() {
        let empty: [&str; 0] = [];
        assert_eq!(
            Schema::parse(empty).unwrap_err().code(),
            SchemaErrorCode::DremelSchemaEmpty
        );
    }

    #[test]
    fn test_malformed_paths_rejected() {
        for bad in ["", "  ", "a..b", ".a", "a.", "a[*]b", "a[].b", "a[1]", "a*", "[*]"] {
            assert_eq!(
                parse_err(&[bad]),
                SchemaErrorCode::DremelSchemaMalformedPath,
                "path {:?} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_depth_cap() {
        let deepest = vec!["n"; MAX_PATH_DEPTH].join(".");
        let schema = Schema::parse([deepest.as_str()]).unwrap();
        assert_eq!(schema.node(schema.leaves()[0]).depth(), MAX_PATH_DEPTH);
        assert_eq!(schema.to_json()["children"][0]["name"], "n");

        let too_deep = vec!["n[*]"; MAX_PATH_DEPTH + 1].join(".");
        assert_eq!(
            parse_err(&[too_deep.as_str()]),
            SchemaErrorCode::DremelSchemaMalformedPath
        );
        let far_too_deep = vec!["n"; 30_000].join(".");
        assert_eq!(
            parse_err(&[far_too_deep.as_str()]),
            SchemaErrorCode::DremelSchemaMalformedPath
        );
    }

    #[test]
    fn test_repetition_conflict() {
        assert_eq!(
            parse_err(&["doc.links[*].url", "doc.links.language"]),
            SchemaErrorCode::DremelSchemaRepetitionConflict
        );
    }

    #[test]
    fn test_leaf_conflict_both_orders() {
        assert_eq!(parse_err(&["a.b", "a.b.c"]), SchemaErrorCode::DremelSchemaLeafConflict);
        assert_eq!(parse_err(&["a.b.c", "a.b"]), SchemaErrorCode::DremelSchemaLeafConflict);
    }

    #[test]
    fn test_duplicate_path() {
        assert_eq!(parse_err(&["a.b", "a.b"]), SchemaErrorCode::DremelSchemaDuplicatePath);
    }

    #[test]
    fn test_unicode_and_punctuation_names() {
        let schema = Schema::parse(["über.a-b_c", "$meta.@id"]).unwrap();
        assert_eq!(schema.paths(), vec!["über.a-b_c", "$meta.@id"]);
    }
}
