//! Nested export and import of the site graph
//!
//! The nested form mirrors the network map consumed by front-ends:
//! `{ url, path, children: [...] }`.

use crate::graph::{SiteGraph, Vertex};
use crate::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write;

/// One node of the nested network map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub url: String,
    pub path: String,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(vertex: &Vertex) -> Self {
        Self {
            url: vertex.url.clone(),
            path: vertex.identifier.clone(),
            children: Vec::new(),
        }
    }

    /// The vertex this node stands for
    pub fn vertex(&self) -> Vertex {
        Vertex::new(self.url.clone(), self.path.clone())
    }
}

/// Steps emitted by [`SiteGraph::walk`]
enum Step<'a> {
    /// First visit of a vertex on the current path
    Enter(&'a Vertex, usize),
    /// A vertex that is already an ancestor on the current path
    Revisit(&'a Vertex, usize),
    /// All children of the vertex have been walked
    Exit,
}

struct Frame<'a> {
    vertex: &'a Vertex,
    next: usize,
}

impl SiteGraph {
    /// Depth-first walk from `root` along every path, stopping at cycles
    ///
    /// Uses an explicit stack so deep graphs do not grow the call stack.
    fn walk<'a>(
        &'a self,
        root: &'a Vertex,
        mut visit: impl FnMut(Step<'a>),
    ) -> GraphResult<()> {
        if !self.contains(root) {
            return Err(GraphError::UnknownVertex(root.clone()));
        }

        let mut on_path: HashSet<&Vertex> = HashSet::new();
        let mut stack = vec![Frame {
            vertex: root,
            next: 0,
        }];
        on_path.insert(root);
        visit(Step::Enter(root, 0));

        while let Some(frame) = stack.last_mut() {
            let parent = frame.vertex;
            let children = self.children(parent);

            if frame.next >= children.len() {
                on_path.remove(parent);
                stack.pop();
                visit(Step::Exit);
                continue;
            }

            let child = &children[frame.next];
            frame.next += 1;

            if !self.contains(child) {
                return Err(GraphError::Dangling {
                    parent: parent.clone(),
                    child: child.clone(),
                });
            }

            let depth = stack.len();
            if on_path.contains(child) {
                visit(Step::Revisit(child, depth));
            } else {
                on_path.insert(child);
                stack.push(Frame {
                    vertex: child,
                    next: 0,
                });
                visit(Step::Enter(child, depth));
            }
        }

        Ok(())
    }

    /// Exports the part of the graph reachable from `root` as a nested map
    ///
    /// A vertex reached again through a cycle appears as a leaf. Shared
    /// descendants reached through different parents are repeated.
    pub fn tree_map(&self, root: &Vertex) -> GraphResult<TreeNode> {
        let mut building: Vec<TreeNode> = Vec::new();
        let mut finished: Option<TreeNode> = None;

        self.walk(root, |step| match step {
            Step::Enter(vertex, _) => building.push(TreeNode::leaf(vertex)),
            Step::Revisit(vertex, _) => {
                if let Some(parent) = building.last_mut() {
                    parent.children.push(TreeNode::leaf(vertex));
                }
            }
            Step::Exit => {
                if let Some(node) = building.pop() {
                    match building.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => finished = Some(node),
                    }
                }
            }
        })?;

        finished.ok_or_else(|| GraphError::UnknownVertex(root.clone()))
    }

    /// Renders the graph reachable from `root` as an indented listing
    ///
    /// Vertices with children end in `-->`; each level is indented by one
    /// tab after `indent`. A vertex reached again through a cycle is marked
    /// `(cycle)` and not expanded.
    pub fn render_tree(&self, root: &Vertex, indent: &str) -> GraphResult<String> {
        let mut out = String::new();

        self.walk(root, |step| {
            let (vertex, depth, cycle) = match step {
                Step::Enter(vertex, depth) => (vertex, depth, false),
                Step::Revisit(vertex, depth) => (vertex, depth, true),
                Step::Exit => return,
            };

            let tabs = "\t".repeat(depth);
            let _ = if cycle {
                writeln!(out, "{}{}{} (cycle)", indent, tabs, vertex)
            } else if self.children(vertex).is_empty() {
                writeln!(out, "{}{}{}", indent, tabs, vertex)
            } else {
                writeln!(out, "{}{}{} --> ", indent, tabs, vertex)
            };
        })?;

        Ok(out)
    }

    /// Adds every vertex and parent/child edge found in a nested map
    pub fn populate(&mut self, nodes: &[TreeNode]) {
        let mut pending: Vec<&TreeNode> = nodes.iter().rev().collect();

        while let Some(node) = pending.pop() {
            let vertex = node.vertex();
            self.add_vertex(vertex.clone());

            for child in &node.children {
                self.add_edge(vertex.clone(), child.vertex());
            }
            pending.extend(node.children.iter().rev());
        }
    }
}
