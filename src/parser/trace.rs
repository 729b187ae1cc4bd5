//! Parse trees for debugging grammars
//!
//!     In a traced run every [label](super::Parser::label)ed parser becomes a node of a
//!     [ParseTree]: its name, the source range it covered and the text it matched. Unlabeled
//!     parsers leave no trace, so the tree mirrors the names the grammar author chose.
//!
//!     Nodes live in an arena and point to their parent and to their previous sibling. A
//!     node that failed is unlinked from its parent again, and choices unlink whatever a
//!     failed alternative added, so the finished tree only holds what contributed to the
//!     result.
//!
//!     When a traced run fails, the tree is cut at the node that was open when the furthest
//!     failure was recorded, giving the partial structure up to the error.

use serde::Serialize;
use std::fmt;

/// A node of the tree built by a traced run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    pub name: String,
    /// Byte index in the source where the node starts.
    pub begin: usize,
    /// Byte index in the source where the node ends.
    pub end: usize,
    /// Source text the node matched; `None` for a node that did not complete.
    pub value: Option<String>,
    pub children: Vec<ParseTree>,
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return match &self.value {
                Some(value) => write!(f, "{}: {}", self.name, value),
                None => write!(f, "{}:", self.name),
            };
        }
        writeln!(f, "{}: {{", self.name)?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str("\n}")
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    name: String,
    begin: usize,
    end: usize,
    value: Option<String>,
    parent: Option<usize>,
    previous: Option<usize>,
    latest_child: Option<usize>,
}

/// Arena of tree nodes with a cursor on the node being parsed.
#[derive(Debug, Clone)]
pub(crate) struct Trace {
    nodes: Vec<TreeNode>,
    current: usize,
}

const ROOT: usize = 0;

impl Trace {
    pub(crate) fn new(root: &str, begin: usize) -> Self {
        Trace {
            nodes: vec![TreeNode {
                name: root.to_string(),
                begin,
                end: begin,
                value: None,
                parent: None,
                previous: None,
                latest_child: None,
            }],
            current: ROOT,
        }
    }

    pub(crate) fn current(&self) -> usize {
        self.current
    }

    /// Opens a child of the current node and makes it current.
    pub(crate) fn push(&mut self, name: &str, begin: usize) {
        let parent = self.current;
        let child = self.nodes.len();
        self.nodes.push(TreeNode {
            name: name.to_string(),
            begin,
            end: begin,
            value: None,
            parent: Some(parent),
            previous: self.nodes[parent].latest_child,
            latest_child: None,
        });
        self.nodes[parent].latest_child = Some(child);
        self.current = child;
    }

    /// Closes the current node at `end` and returns to its parent.
    pub(crate) fn pop(&mut self, end: usize, value: Option<String>) {
        let node = &mut self.nodes[self.current];
        node.end = end.max(node.begin);
        node.value = value;
        if let Some(parent) = node.parent {
            self.current = parent;
        }
    }

    pub(crate) fn latest_child(&self) -> Option<usize> {
        self.nodes[self.current].latest_child
    }

    /// Forgets the children of the current node added after `child`.
    pub(crate) fn set_latest_child(&mut self, child: Option<usize>) {
        self.nodes[self.current].latest_child = child;
    }

    /// The tree of a successful run.
    pub(crate) fn tree(&self, end: usize, value: String) -> ParseTree {
        let mut nodes = self.nodes.clone();
        nodes[ROOT].end = end.max(nodes[ROOT].begin);
        nodes[ROOT].value = Some(value);
        build(&nodes, ROOT)
    }

    /// The partial tree of a failed run: `node` was open when the failure was recorded.
    /// With `orphan` set, `node` itself is dropped as incomplete.
    pub(crate) fn partial_tree(&self, node: usize, end: usize, orphan: bool) -> ParseTree {
        let mut nodes = self.nodes.clone();
        let mut node = node.min(nodes.len() - 1);
        if orphan {
            if let Some(parent) = nodes[node].parent {
                nodes[parent].latest_child = nodes[node].previous;
                node = parent;
            }
        }
        loop {
            nodes[node].end = end.max(nodes[node].begin);
            match nodes[node].parent {
                Some(parent) => {
                    nodes[parent].latest_child = Some(node);
                    node = parent;
                }
                None => break,
            }
        }
        build(&nodes, node)
    }
}

fn build(nodes: &[TreeNode], at: usize) -> ParseTree {
    let mut children = Vec::new();
    let mut child = nodes[at].latest_child;
    while let Some(index) = child {
        children.push(build(nodes, index));
        child = nodes[index].previous;
    }
    children.reverse();
    let node = &nodes[at];
    ParseTree {
        name: node.name.clone(),
        begin: node.begin,
        end: node.end,
        value: node.value.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(name: &str, value: &str, children: Vec<ParseTree>) -> ParseTree {
        ParseTree {
            name: name.to_string(),
            begin: 0,
            end: 1000,
            value: Some(value.to_string()),
            children,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(tree("foo", "123", vec![]).to_string(), "foo: 123");
        assert_eq!(
            tree("foo", "123", vec![tree("bar", "x", vec![])]).to_string(),
            "foo: {\nbar: x\n}"
        );
        assert_eq!(
            tree(
                "foo",
                "123",
                vec![tree("bar", "x", vec![]), tree("baz", "y", vec![])]
            )
            .to_string(),
            "foo: {\nbar: x,\nbaz: y\n}"
        );
    }

    #[test]
    fn test_failed_child_is_unlinked() {
        let mut trace = Trace::new("root", 0);
        trace.push("a", 0);
        trace.pop(1, Some("x".to_string()));
        let before = trace.latest_child();
        trace.push("b", 1);
        trace.pop(1, None);
        trace.set_latest_child(before);
        let tree = trace.tree(1, "x".to_string());
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "a");
    }

    #[test]
    fn test_partial_tree_orphans_the_failing_node() {
        let mut trace = Trace::new("root", 0);
        trace.push("done", 0);
        trace.pop(2, Some("ab".to_string()));
        trace.push("open", 2);
        let failing = trace.current();
        let tree = trace.partial_tree(failing, 3, true);
        assert_eq!(tree.end, 3);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "done");

        let kept = trace.partial_tree(failing, 3, false);
        assert_eq!(kept.children[1].name, "open");
        assert_eq!(kept.children[1].value, None);
    }
}
