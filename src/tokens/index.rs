//! Path indexing.
//!
//! Flattens parsed documents into an ordered list of (path, value) entries.
//! Entry order follows document key order, which keeps every downstream
//! output deterministic and diffable.

use std::collections::HashMap;

use serde_json::Value;

use super::path::TokenPath;
use super::tree::Node;
use super::value::{Composite, CompositeKind, TokenValue};
use crate::error::{Violation, ViolationKind};

/// One indexed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub path: TokenPath,
    pub value: TokenValue,
}

/// Flattens one document into entries.
///
/// Composite groups (see [`CompositeKind::for_container`]) produce an extra
/// entry for the group path, placed right after the entries of its parts.
pub fn index_document(document: &Value) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut path = Vec::new();
    flatten(&Node::parse(document), &mut path, &mut entries);
    entries
}

fn flatten(node: &Node, path: &mut Vec<String>, out: &mut Vec<Entry>) {
    match node {
        Node::Leaf(literal) => out.push(Entry {
            path: TokenPath::new(path.iter().cloned()),
            value: TokenValue::Literal(literal.clone()),
        }),
        Node::Reference(target) => out.push(Entry {
            path: TokenPath::new(path.iter().cloned()),
            value: TokenValue::Reference(target.clone()),
        }),
        Node::Group(children) => {
            for (key, child) in children {
                path.push(key.clone());
                flatten(child, path, out);
                path.pop();
            }

            let container = path.len().checked_sub(2).map(|i| path[i].as_str());
            if let Some(kind) = container.and_then(CompositeKind::for_container) {
                let group = TokenPath::new(path.iter().cloned());
                let parts = children
                    .iter()
                    .filter(|(_, child)| !child.is_group())
                    .map(|(key, _)| (key.clone(), group.child(key.clone())))
                    .collect();
                out.push(Entry {
                    path: group,
                    value: TokenValue::Composite(Composite { kind, parts }),
                });
            }
        }
    }
}

/// Ordered, path-addressable index over a document set.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    entries: Vec<Entry>,
    positions: HashMap<TokenPath, usize>,
    findings: Vec<Violation>,
}

impl TokenIndex {
    /// Indexes documents in the given order.
    ///
    /// Problems that belong to paths rather than values (a path defined twice,
    /// a segment that cannot be encoded in a variable name, a document whose
    /// root is not an object) are recorded as findings instead of failing.
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut index = TokenIndex::default();

        for (n, document) in documents.into_iter().enumerate() {
            if !document.is_object() {
                index.findings.push(Violation::new(
                    format!("<document {}>", n),
                    ViolationKind::InvalidPath,
                    "document root must be an object",
                ));
                continue;
            }

            for entry in index_document(document) {
                index.insert(entry);
            }
        }

        index
    }

    fn insert(&mut self, entry: Entry) {
        for segment in entry.path.invalid_segments() {
            self.findings.push(Violation::new(
                entry.path.to_string(),
                ViolationKind::InvalidPath,
                format!(
                    "segment '{}' cannot be encoded in a variable name (letters, digits, and '-' only)",
                    segment
                ),
            ));
        }

        if self.positions.contains_key(&entry.path) {
            self.findings.push(Violation::new(
                entry.path.to_string(),
                ViolationKind::InvalidPath,
                "path is defined more than once",
            ));
            return;
        }

        self.positions.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, path: &TokenPath) -> Option<&Entry> {
        self.positions.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &TokenPath) -> bool {
        self.positions.contains_key(path)
    }

    /// Path-level problems found while indexing.
    pub fn findings(&self) -> &[Violation] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
