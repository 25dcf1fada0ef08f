use crate::graph::Vertex;
use crate::{GraphError, GraphResult};
use std::collections::{HashMap, HashSet};

/// Directed adjacency structure over crawled vertices
///
/// Every vertex that appears as a child is also a key, because
/// [`SiteGraph::add_edge`] inserts both endpoints. Keys and adjacency
/// sequences both keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteGraph {
    adjacency: HashMap<Vertex, Vec<Vertex>>,
    order: Vec<Vertex>,
}

impl SiteGraph {
    /// Creates a new, empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex with an empty adjacency sequence
    ///
    /// Returns false if the vertex already exists.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        if self.adjacency.contains_key(&vertex) {
            return false;
        }
        self.order.push(vertex.clone());
        self.adjacency.insert(vertex, Vec::new());
        true
    }

    /// Records that `child` was discovered via a link on `parent`'s page
    ///
    /// Both endpoints become keys if they were not already. Inserting an edge
    /// that is already present is a no-op.
    pub fn add_edge(&mut self, parent: Vertex, child: Vertex) {
        self.add_vertex(parent.clone());
        self.add_vertex(child.clone());

        if let Some(children) = self.adjacency.get_mut(&parent) {
            if !children.contains(&child) {
                children.push(child);
            }
        }
    }

    /// Returns the ordered children of a vertex (empty if leaf or absent)
    pub fn children(&self, vertex: &Vertex) -> &[Vertex] {
        self.adjacency
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns true if the vertex is a key of the graph
    pub fn contains(&self, vertex: &Vertex) -> bool {
        self.adjacency.contains_key(vertex)
    }

    /// Returns the first vertex ever inserted
    pub fn root(&self) -> Option<&Vertex> {
        self.order.first()
    }

    /// Iterates over all vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.order.iter()
    }

    /// Iterates over all `(parent, child)` edges, grouped by parent in
    /// insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.order
            .iter()
            .flat_map(move |parent| self.children(parent).iter().map(move |child| (parent, child)))
    }

    /// Returns the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the number of edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Returns whether the graph has no vertices
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Discards all vertices and edges
    pub fn reset(&mut self) {
        self.adjacency.clear();
        self.order.clear();
    }

    /// Checks that every child referenced by an edge is also a key
    pub fn validate(&self) -> GraphResult<()> {
        for (parent, child) in self.edges() {
            if !self.contains(child) {
                return Err(GraphError::Dangling {
                    parent: parent.clone(),
                    child: child.clone(),
                });
            }
        }
        Ok(())
    }

    /// Lazily walks the graph in pre-order starting at `root`
    ///
    /// Each reachable vertex is yielded once, so the walk is finite even when
    /// the graph has cycles. The walk reads the adjacency map as it is when
    /// the iterator advances; calling `traverse` again starts over.
    ///
    /// A child referenced by an edge but missing as a key yields
    /// `GraphError::Dangling` and ends the walk. An absent root yields
    /// `GraphError::UnknownVertex`.
    pub fn traverse<'a>(&'a self, root: &Vertex) -> Traverse<'a> {
        let (stack, unknown_root) = match self.adjacency.get_key_value(root) {
            Some((key, _)) => (vec![(None, key)], None),
            None => (Vec::new(), Some(root.clone())),
        };
        Traverse {
            graph: self,
            stack,
            seen: HashSet::new(),
            unknown_root,
            finished: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, vertex: Vertex, children: Vec<Vertex>) {
        if !self.adjacency.contains_key(&vertex) {
            self.order.push(vertex.clone());
        }
        self.adjacency.insert(vertex, children);
    }
}

/// Pre-order iterator returned by [`SiteGraph::traverse`]
pub struct Traverse<'a> {
    graph: &'a SiteGraph,
    stack: Vec<(Option<&'a Vertex>, &'a Vertex)>,
    seen: HashSet<&'a Vertex>,
    unknown_root: Option<Vertex>,
    finished: bool,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Result<&'a Vertex, GraphError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(root) = self.unknown_root.take() {
            self.finished = true;
            return Some(Err(GraphError::UnknownVertex(root)));
        }

        while let Some((parent, vertex)) = self.stack.pop() {
            if self.seen.contains(vertex) {
                continue;
            }

            if !self.graph.contains(vertex) {
                self.finished = true;
                let err = match parent {
                    Some(parent) => GraphError::Dangling {
                        parent: parent.clone(),
                        child: vertex.clone(),
                    },
                    None => GraphError::UnknownVertex(vertex.clone()),
                };
                return Some(Err(err));
            }

            self.seen.insert(vertex);
            for child in self.graph.children(vertex).iter().rev() {
                if !self.seen.contains(child) {
                    self.stack.push((Some(vertex), child));
                }
            }
            return Some(Ok(vertex));
        }

        self.finished = true;
        None
    }
}
