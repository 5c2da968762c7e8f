/// Directed acyclic dependency graph with reference-count culling
///
/// Generic graph container underneath the frame graph. Pass and
/// resource nodes register themselves here and connect with usage-
/// tagged edges; the graph only knows about reference counts and
/// reachability, never about pass or resource semantics.

use crate::frame_graph::ResourceUsage;

/// Dense index of a node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIndex(pub(crate) u32);

/// Dense index of an edge in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EdgeIndex(pub(crate) u32);

/// A directed edge: data flows from `from` into `to`
#[derive(Debug, Clone, Copy)]
pub(crate) struct GraphEdge {
    pub(crate) from: NodeIndex,
    pub(crate) to: NodeIndex,
    /// How the resource behind this edge is accessed
    #[allow(dead_code)]
    pub(crate) usage: ResourceUsage,
}

#[derive(Debug, Clone, Copy, Default)]
struct GraphNode {
    /// Times this node is read or used (outgoing edges + external retains).
    /// Recomputed by `cull()`; zero after culling means unreachable.
    ref_count: u32,
    /// External retains marking this node as a graph root
    retained: u32,
}

/// Directed acyclic graph of pass and resource nodes.
///
/// Nodes and edges are append-only and indexed densely. Adding never
/// fails; looking up an invalid index is a programmer error and
/// panics. `cull()` recomputes reference counts from scratch, so it
/// can be called repeatedly without accumulating state.
#[derive(Default)]
pub(crate) struct DirectedAcyclicGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// Edges arriving at each node, filled by `add_edge`
    incoming: Vec<Vec<EdgeIndex>>,
}

impl DirectedAcyclicGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its dense index
    pub(crate) fn add_node(&mut self) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(GraphNode::default());
        self.incoming.push(Vec::new());
        index
    }

    /// Append an edge from `from` to `to` and return its dense index.
    ///
    /// Counts as one reference on `from` ("read or used once more").
    pub(crate) fn add_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        usage: ResourceUsage,
    ) -> EdgeIndex {
        let index = EdgeIndex(self.edges.len() as u32);
        self.edges.push(GraphEdge { from, to, usage });
        self.incoming[to.0 as usize].push(index);
        self.nodes[from.0 as usize].ref_count += 1;
        index
    }

    /// Mark `node` as a root that must survive culling
    pub(crate) fn retain(&mut self, node: NodeIndex) {
        let node = &mut self.nodes[node.0 as usize];
        node.retained += 1;
        node.ref_count += 1;
    }

    /// Current reference count of `node`
    pub(crate) fn ref_count(&self, node: NodeIndex) -> u32 {
        self.nodes[node.0 as usize].ref_count
    }

    /// Whether `node` is unreachable from any root (valid after `cull()`)
    pub(crate) fn is_culled(&self, node: NodeIndex) -> bool {
        self.nodes[node.0 as usize].ref_count == 0
    }

    #[allow(dead_code)]
    pub(crate) fn edge(&self, index: EdgeIndex) -> &GraphEdge {
        &self.edges[index.0 as usize]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Mark-and-sweep over reference counts.
    ///
    /// A node is live while its reference count is nonzero. Starting
    /// from every unreferenced node, each edge whose destination became
    /// unreferenced releases one reference on its source, transitively.
    pub(crate) fn cull(&mut self) {
        // Recompute counts from scratch so repeated culls stay correct
        for node in &mut self.nodes {
            node.ref_count = node.retained;
        }
        for edge in &self.edges {
            self.nodes[edge.from.0 as usize].ref_count += 1;
        }

        let mut dead: Vec<NodeIndex> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].ref_count == 0)
            .map(|i| NodeIndex(i as u32))
            .collect();

        while let Some(node) = dead.pop() {
            for &edge_index in &self.incoming[node.0 as usize] {
                let from = self.edges[edge_index.0 as usize].from;
                let from_node = &mut self.nodes[from.0 as usize];
                debug_assert!(from_node.ref_count > 0);
                from_node.ref_count -= 1;
                if from_node.ref_count == 0 {
                    dead.push(from);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
