/// Resource node - one version of a logical resource in the graph
///
/// Every write produces a new version node rather than mutating the
/// existing one; this keeps the graph acyclic and gives each version
/// at most one writer.

use crate::frame_graph::graph::{EdgeIndex, NodeIndex};

pub(crate) struct ResourceNode {
    /// Graph vertex backing this version
    pub(crate) node: NodeIndex,
    /// Slot of the virtual resource this version belongs to
    pub(crate) resource_slot: usize,
    /// Version number within the logical resource (0 = initial)
    pub(crate) version: u32,
    /// The pass edge that produced this version (at most one)
    pub(crate) write_edge: Option<EdgeIndex>,
    /// Pass edges consuming this version
    pub(crate) read_edges: Vec<EdgeIndex>,
}

impl ResourceNode {
    pub(crate) fn new(node: NodeIndex, resource_slot: usize, version: u32) -> Self {
        Self {
            node,
            resource_slot,
            version,
            write_edge: None,
            read_edges: Vec::new(),
        }
    }

    pub(crate) fn set_write_edge(&mut self, edge: EdgeIndex) {
        debug_assert!(
            self.write_edge.is_none(),
            "resource version already has a writer"
        );
        self.write_edge = Some(edge);
    }

    pub(crate) fn add_read_edge(&mut self, edge: EdgeIndex) {
        self.read_edges.push(edge);
    }

    pub(crate) fn has_writer(&self) -> bool {
        self.write_edge.is_some()
    }

    #[allow(dead_code)]
    pub(crate) fn has_readers(&self) -> bool {
        !self.read_edges.is_empty()
    }
}
