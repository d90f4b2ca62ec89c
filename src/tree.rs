//! Parser for the indented diagnostic tree printed by `mkvinfo`.
//!
//! `mkvinfo` writes one element per line. Top-level elements start with a
//! bare `+`, nested ones with a `|` followed by one column of padding per
//! extra level and a closing `+`:
//!
//! ```text
//! + Segment: size 274249883
//! |+ Tracks
//! | + Track
//! |  + Track type: subtitles
//! ```
//!
//! The parsed result is an arena ([`MetadataTree`]) whose nodes refer to each
//! other by [`NodeId`]. Parsing never fails: lines that cannot be placed are
//! logged and skipped.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static NESTED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\s*\+").expect("invalid nested marker pattern"));

/// Index of a node inside a [`MetadataTree`]. Ids are only meaningful for
/// the tree that handed them out; the accessors on [`MetadataTree`] panic on
/// an id from another, larger tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One line of diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Text before the first colon, or the whole payload
    pub name: String,
    /// Text after the first colon, empty if there is none
    pub value: String,
    /// Nesting level; the synthetic root is 0
    pub depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(name: String, value: String, depth: usize, parent: Option<NodeId>) -> Self {
        Self {
            name,
            value,
            depth,
            parent,
            children: Vec::new(),
        }
    }
}

/// Arena holding every node parsed from one `mkvinfo` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTree {
    nodes: Vec<TreeNode>,
}

impl Default for MetadataTree {
    fn default() -> Self {
        Self {
            nodes: vec![TreeNode::new(String::new(), String::new(), 0, None)],
        }
    }
}

impl MetadataTree {
    /// Parse `mkvinfo` output into a tree.
    pub fn parse(text: &str) -> Self {
        let mut tree = Self::default();
        let mut stack = vec![tree.root()];

        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let level = line_level(line);
            if level == 0 {
                continue;
            }

            while let Some(&top) = stack.last() {
                if tree.nodes[top.0].depth >= level {
                    stack.pop();
                } else {
                    break;
                }
            }

            let parent = match stack.last() {
                Some(&top) if tree.nodes[top.0].depth + 1 == level => top,
                _ => {
                    warn!("Invalid tree level in line: {}", line);
                    continue;
                }
            };

            let (name, value) = split_payload(line);
            let id = tree.push(parent, name, value, level);
            stack.push(id);
        }

        tree
    }

    /// Parse raw tool output, replacing invalid UTF-8 before splitting lines.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(bytes))
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree. The same holds for
    /// [`parent`](Self::parent) and [`children`](Self::children).
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied()
    }

    /// Number of nodes parsed from input lines (the root is not counted).
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Depth-first, pre-order search below (and including) `start` for the
    /// first node called `name`.
    pub fn find_by_name(&self, start: NodeId, name: &str) -> Option<NodeId> {
        let mut pending = vec![start];

        while let Some(id) = pending.pop() {
            let node = self.node(id);
            if node.name == name {
                return Some(id);
            }
            pending.extend(node.children.iter().rev().copied());
        }

        None
    }

    fn push(&mut self, parent: NodeId, name: String, value: String, depth: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::new(name, value, depth, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }
}

/// Nesting level encoded by the line's leading markers, or 0 if the line has
/// none. `+` is level 1; `|+`, `| +`, `|  +` are levels 2, 3 and 4.
fn line_level(line: &str) -> usize {
    if line.starts_with('+') {
        return 1;
    }

    NESTED_MARKER
        .find(line)
        .map(|m| m.as_str().chars().count())
        .unwrap_or(0)
}

fn split_payload(line: &str) -> (String, String) {
    let payload: String = line.trim().chars().filter(|c| *c != '|' && *c != '+').collect();
    let payload = payload.trim();

    match payload.split_once(':') {
        Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
        None => (payload.to_string(), String::new()),
    }
}
