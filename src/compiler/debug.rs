//! Source line mapping for diagnostics
//!
//! The [`DebugMap`] is a side table produced alongside a render unit. It is
//! consulted only when reporting problems, never while rendering.

use crate::compiler::ast::{Node, Spanned};

/// Maps byte offsets in template source to 1-based line numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing the given byte offset
    pub fn line_of(&self, offset: usize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32,
        }
    }
}

/// Maps each directive node (pre-order id) to its originating source line
#[derive(Debug, Clone)]
pub struct DebugMap {
    lines: Vec<u32>,
}

impl DebugMap {
    pub fn from_nodes(nodes: &[Spanned<Node>], index: &LineIndex) -> Self {
        let mut lines = Vec::new();
        collect(nodes, index, &mut lines);
        Self { lines }
    }

    /// Source line for a node id, if the id is in range
    pub fn line_of(&self, node_id: usize) -> Option<u32> {
        self.lines.get(node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn collect(nodes: &[Spanned<Node>], index: &LineIndex, out: &mut Vec<u32>) {
    for node in nodes {
        out.push(index.line_of(node.span.start));
        match &node.node {
            Node::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect(then_branch, index, out);
                collect(else_branch, index, out);
            }
            Node::For { body, .. } => collect(body, index, out),
            Node::Text(_) | Node::Interp { .. } | Node::Set { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_single_line() {
        let index = LineIndex::new("hello world");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(10), 1);
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("ab\ncd\nef");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(5), 2);
        assert_eq!(index.line_of(6), 3);
    }

    #[test]
    fn test_debug_map_covers_nested_nodes() {
        let source = "a\n{% if x %}\n{{ y }}\n{% endif %}\n";
        let nodes = crate::compiler::grammar::parse(source).expect("Should parse");
        let index = LineIndex::new(source);
        let map = DebugMap::from_nodes(&nodes, &index);

        // text, if, then-branch text/interp/text nodes all get entries
        assert!(map.len() >= 3);
        // First node is the leading text on line 1
        assert_eq!(map.line_of(0), Some(1));
        // Second node is the if tag on line 2
        assert_eq!(map.line_of(1), Some(2));
        // Out-of-range ids resolve to nothing
        assert_eq!(map.line_of(999), None);
    }
}
