//! Recursive search of a metadata tree for the mutation number.
//!
//! Two kinds of evidence are collected:
//!
//! - the golden key: a node whose `attributes.path` names the document
//!   number tag. Its value is authoritative and ends the search of that
//!   branch, so weaker matches from sibling text never compete with it.
//! - numeric runs: 3 to 8 digit sequences pulled from free text. These are
//!   informational only and never become an inventory identifier.
//!
//! The search is pure: no I/O and the input tree is never mutated.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metadata::tree::{Scalar, TagNode};

/// Provenance label attached to every golden-key finding.
pub const GOLDEN_KEY_SOURCE: &str = "XMP:DocumentNo";

/// Case-insensitive marker looked for in a node's path attribute.
const GOLDEN_PATH_MARKER: &str = "documentno";

/// Attribute names that may carry the tag path, in lookup order.
const PATH_ATTRIBUTES: &[&str] = &["path", "name"];

/// Children searched before any other, in this order.
const PAYLOAD_KEYS: &[&str] = &["value", "description"];

/// Everything but ASCII word characters, whitespace and hyphens. Non-Latin
/// letters are stripped too, so digits glued to Urdu text still form a run.
static NON_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_\s-]").expect("non-text regex is hardcoded and valid")
});

static NUMBER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{3,8}\b").expect("number regex is hardcoded and valid"));

/// A candidate mutation number found in a metadata tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub number: String,
    /// Human-readable provenance of the match.
    pub source: String,
    pub is_golden_key: bool,
}

impl Finding {
    fn golden(number: String) -> Self {
        Self {
            number,
            source: GOLDEN_KEY_SOURCE.to_string(),
            is_golden_key: true,
        }
    }
}

/// Search `tree` depth-first and return findings in discovery order.
///
/// An absent tree yields no findings.
pub fn hunt(tree: Option<&TagNode>) -> Vec<Finding> {
    let mut hunter = Hunter::default();
    if let Some(root) = tree {
        hunter.visit(root, "");
    }
    hunter.findings
}

/// First golden-key finding, if any.
pub fn golden_key(findings: &[Finding]) -> Option<&Finding> {
    findings.iter().find(|f| f.is_golden_key)
}

#[derive(Default)]
struct Hunter {
    findings: Vec<Finding>,
    /// (number, source) pairs already reported by the numeric fallback.
    seen: HashSet<(String, String)>,
}

impl Hunter {
    fn visit(&mut self, node: &TagNode, label: &str) {
        match node {
            TagNode::Object { entries, .. } => {
                if let Some(number) = golden_value(node) {
                    self.findings.push(Finding::golden(number));
                    return;
                }

                for key in PAYLOAD_KEYS {
                    if let Some(child) = node.get(key) {
                        self.visit(child, &join(label, key));
                    }
                }

                for (key, child) in entries {
                    if PAYLOAD_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    if matches!(child, TagNode::Object { .. } | TagNode::Array(_)) {
                        self.visit(child, &join(label, key));
                    }
                }
            }
            TagNode::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.visit(item, &format!("{label}[{i}]"));
                }
            }
            TagNode::Scalar(Scalar::Text(text)) => self.scan_text(text, label),
            TagNode::Scalar(Scalar::Number(_)) => {}
        }
    }

    fn scan_text(&mut self, text: &str, label: &str) {
        let cleaned = NON_TEXT.replace_all(text, "");

        for m in NUMBER_RUN.find_iter(&cleaned) {
            let key = (m.as_str().to_string(), label.to_string());
            if self.seen.insert(key) {
                self.findings.push(Finding {
                    number: m.as_str().to_string(),
                    source: label.to_string(),
                    is_golden_key: false,
                });
            }
        }
    }
}

/// Value of the golden key at `node`, if `node` is the document number tag
/// and carries a non-empty scalar.
fn golden_value(node: &TagNode) -> Option<String> {
    let is_golden = PATH_ATTRIBUTES.iter().any(|attr| {
        node.attribute(attr)
            .and_then(TagNode::as_scalar)
            .map(|path| {
                path.to_trimmed_string()
                    .to_lowercase()
                    .contains(GOLDEN_PATH_MARKER)
            })
            .unwrap_or(false)
    });

    if !is_golden {
        return None;
    }

    PAYLOAD_KEYS
        .iter()
        .filter_map(|key| node.get(key).and_then(TagNode::as_scalar))
        .map(Scalar::to_trimmed_string)
        .find(|s| !s.is_empty())
}

fn join(label: &str, key: &str) -> String {
    if label.is_empty() {
        key.to_string()
    } else {
        format!("{label}.{key}")
    }
}
