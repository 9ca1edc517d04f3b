use serde::Serialize;
use serde_json::{Map, Value};

use crate::node::{JsonLdNode, NodeType};

/// The `@context` of every emitted document.
pub const SCHEMA_ORG_CONTEXT: &str = "http://schema.org";

/// The root of a document: the node itself, preceded by `@context`.
#[derive(Serialize)]
struct Document<'a, N> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(flatten)]
    node: &'a N,
}

/// A pruned JSON-LD document, ready to be written out.
///
/// Keys appear in declaration order of the node types, so two
/// documents built from the same data are always byte-identical.
/// `{}` formats the document compactly, `{:#}` pretty-prints it.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct CanonicalDocument(Map<String, Value>);

impl CanonicalDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl std::fmt::Display for CanonicalDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = if f.alternate() {
            serde_json::to_string_pretty(&self.0)
        } else {
            serde_json::to_string(&self.0)
        }
        .map_err(|_| std::fmt::Error)?;

        f.write_str(&text)
    }
}

/// A node could not be represented as JSON.
///
/// This can only happen if a node type is not expressible as a JSON object,
/// and always indicates a bug in whatever built the node.
#[derive(thiserror::Error, Debug, miette::Diagnostic)]
pub enum UnsupportedValueKind {
    #[error("{node_type} node contains a value that cannot be represented in JSON")]
    #[diagnostic(
        code(jsonld::unsupported_value_kind),
        help("this is a bug in the projection of the record")
    )]
    Unrepresentable {
        node_type: NodeType,
        #[source]
        source: serde_json::Error,
    },

    #[error("{node_type} node was not serialized as a JSON object")]
    #[diagnostic(
        code(jsonld::unsupported_value_kind),
        help("this is a bug in the projection of the record")
    )]
    NotAnObject { node_type: NodeType },
}

/// Serializes `node` as the root of a document.
///
/// The document carries `@context`; nested nodes never do. Every field that
/// is empty after pruning (see [`prune`]) is left out.
pub fn serialize<N: JsonLdNode>(node: &N) -> Result<CanonicalDocument, UnsupportedValueKind> {
    let node_type = node.node_type();
    let document = Document { context: SCHEMA_ORG_CONTEXT, node };
    let value = serde_json::to_value(&document)
        .map_err(|source| UnsupportedValueKind::Unrepresentable { node_type, source })?;

    match prune(&value) {
        Some(Value::Object(fields)) => Ok(CanonicalDocument(fields)),
        _ => Err(UnsupportedValueKind::NotAnObject { node_type }),
    }
}

/// Builds a copy of `value` with all empty values removed, or `None` if
/// nothing is left.
///
/// Null, the empty string, and arrays or objects that are empty once their
/// own contents have been pruned are all empty. Numbers and booleans are never
/// empty, so `0` and `false` are kept.
pub fn prune(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(value.clone()),
        Value::Array(items) => {
            let items: Vec<Value> = items.iter().filter_map(prune).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(fields) => {
            let fields: Map<String, Value> = fields
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), prune(value)?)))
                .collect();
            (!fields.is_empty()).then_some(Value::Object(fields))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_survive() {
        assert_eq!(prune(&json!("x")), Some(json!("x")));
        assert_eq!(prune(&json!("0")), Some(json!("0")));
        assert_eq!(prune(&json!(0)), Some(json!(0)));
        assert_eq!(prune(&json!(false)), Some(json!(false)));
    }

    #[test]
    fn empty_values_vanish() {
        assert_eq!(prune(&json!(null)), None);
        assert_eq!(prune(&json!("")), None);
        assert_eq!(prune(&json!([])), None);
        assert_eq!(prune(&json!({})), None);
    }

    #[test]
    fn objects_that_prune_to_nothing_are_empty() {
        let value = json!({
            "name": "Jane",
            "birthPlace": { "name": null, "geo": "" },
            "image": { "thumbnail": { "contentUrl": null } },
        });

        assert_eq!(prune(&value), Some(json!({ "name": "Jane" })));
    }

    #[test]
    fn sequences_drop_empty_elements() {
        let value = json!({
            "children": [{ "name": null }, { "name": "Robert" }, {}],
            "parents": [{ "name": "" }],
            "address": [],
        });

        assert_eq!(prune(&value), Some(json!({ "children": [{ "name": "Robert" }] })));
    }

    #[test]
    fn pruning_does_not_touch_the_input() {
        let value = json!({ "a": null, "b": [ {} ] });
        let before = value.clone();
        assert_eq!(prune(&value), None);
        assert_eq!(value, before);
    }

    #[test]
    fn key_order_is_preserved() {
        let value = json!({ "z": 1, "a": null, "m": 2, "b": 3 });
        let Some(Value::Object(fields)) = prune(&value) else {
            panic!("expected an object");
        };

        assert_eq!(fields.keys().collect::<Vec<_>>(), ["z", "m", "b"]);
    }
}
