use serde_json::Value;

/// Leaf value of a metadata tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    /// String form of the scalar, trimmed.
    pub fn to_trimmed_string(&self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// One node of a metadata tree as produced by a metadata reader.
///
/// Object members keep their source order so that traversal follows the
/// natural iteration order of the dump. The `attributes` member of an
/// object is split out: it describes the node rather than carrying content.
#[derive(Debug, Clone, PartialEq)]
pub enum TagNode {
    Object {
        entries: Vec<(String, TagNode)>,
        attributes: Option<Vec<(String, TagNode)>>,
    },
    Array(Vec<TagNode>),
    Scalar(Scalar),
}

impl TagNode {
    /// Convert a decoded JSON value into a tag tree.
    ///
    /// Booleans and nulls carry nothing a search could use and are dropped;
    /// a root that is one of them yields `None`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null | Value::Bool(_) => None,
            Value::String(s) => Some(TagNode::Scalar(Scalar::Text(s))),
            Value::Number(n) => Some(TagNode::Scalar(Scalar::Number(n))),
            Value::Array(items) => Some(TagNode::Array(
                items.into_iter().filter_map(TagNode::from_json).collect(),
            )),
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                let mut attributes = None;

                for (key, value) in map {
                    match value {
                        Value::Object(attrs) if key == "attributes" => {
                            attributes = Some(
                                attrs
                                    .into_iter()
                                    .filter_map(|(k, v)| TagNode::from_json(v).map(|n| (k, n)))
                                    .collect(),
                            );
                        }
                        other => {
                            if let Some(node) = TagNode::from_json(other) {
                                entries.push((key, node));
                            }
                        }
                    }
                }

                Some(TagNode::Object {
                    entries,
                    attributes,
                })
            }
        }
    }

    /// Parse a JSON document into a tag tree.
    pub fn parse(text: &str) -> serde_json::Result<Option<Self>> {
        let value: Value = serde_json::from_str(text)?;
        Ok(TagNode::from_json(value))
    }

    /// Look up a direct child of an object node.
    pub fn get(&self, key: &str) -> Option<&TagNode> {
        match self {
            TagNode::Object { entries, .. } => lookup(entries, key),
            _ => None,
        }
    }

    /// Look up an attribute of an object node.
    pub fn attribute(&self, key: &str) -> Option<&TagNode> {
        match self {
            TagNode::Object {
                attributes: Some(attrs),
                ..
            } => lookup(attrs, key),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TagNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Number of top-level tags carried by this node.
    pub fn top_level_len(&self) -> usize {
        match self {
            TagNode::Object { entries, .. } => entries.len(),
            TagNode::Array(items) => items.len(),
            TagNode::Scalar(_) => 0,
        }
    }
}

fn lookup<'a>(entries: &'a [(String, TagNode)], key: &str) -> Option<&'a TagNode> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
