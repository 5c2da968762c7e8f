/// Pass node - one scheduled unit of GPU work
///
/// Created during pass declaration, resolved during compile (realize
/// and destroy lists), executed in declaration order. Lives exactly as
/// long as its frame graph.

use crate::error::Result;
use crate::frame_graph::fg_render_pass::FgRenderPassDesc;
use crate::frame_graph::graph::NodeIndex;
use crate::frame_graph::{PassExecuteContext, PassType, ResourceUsage};

/// Type-erased execute callback; owns the pass's `Data`
pub(crate) type PassExecutor = Box<dyn FnMut(&mut PassExecuteContext<'_>) -> Result<()>>;

/// One declared resource access of a pass
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResourceAccess {
    /// Logical resource slot
    pub(crate) slot: usize,
    /// Resource version node accessed
    pub(crate) version_node: usize,
    #[allow(dead_code)]
    pub(crate) usage: ResourceUsage,
}

pub(crate) struct PassNode {
    name: String,
    pass_type: PassType,
    /// Graph vertex backing this pass
    pub(crate) node: NodeIndex,
    pub(crate) reads: Vec<ResourceAccess>,
    pub(crate) writes: Vec<ResourceAccess>,
    executor: Option<PassExecutor>,
    render_pass_desc: Option<FgRenderPassDesc>,
    /// Virtual resources to realize just before this pass runs
    pub(crate) realize_list: Vec<usize>,
    /// Virtual resources to release just after this pass runs
    pub(crate) destroy_list: Vec<usize>,
    /// Writes an externally observable resource; never culled
    side_effect: bool,
}

impl PassNode {
    pub(crate) fn new(name: &str, node: NodeIndex, pass_type: PassType) -> Self {
        Self {
            name: name.to_string(),
            pass_type,
            node,
            reads: Vec::new(),
            writes: Vec::new(),
            executor: None,
            render_pass_desc: None,
            realize_list: Vec::new(),
            destroy_list: Vec::new(),
            side_effect: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn pass_type(&self) -> PassType {
        self.pass_type
    }

    pub(crate) fn set_executor(&mut self, executor: PassExecutor) {
        debug_assert!(self.executor.is_none());
        self.executor = Some(executor);
    }

    pub(crate) fn set_render_pass_desc(&mut self, desc: FgRenderPassDesc) {
        self.render_pass_desc = Some(desc);
    }

    pub(crate) fn render_pass_desc(&self) -> Option<&FgRenderPassDesc> {
        self.render_pass_desc.as_ref()
    }

    pub(crate) fn mark_side_effect(&mut self) {
        self.side_effect = true;
    }

    pub(crate) fn has_side_effect(&self) -> bool {
        self.side_effect
    }

    pub(crate) fn add_read(&mut self, access: ResourceAccess) {
        self.reads.push(access);
    }

    pub(crate) fn add_write(&mut self, access: ResourceAccess) {
        self.writes.push(access);
    }

    /// Invoke the recorded execute callback
    pub(crate) fn execute(&mut self, context: &mut PassExecuteContext<'_>) -> Result<()> {
        let executor = self
            .executor
            .as_mut()
            .expect("pass node has no executor (declaration incomplete)");
        executor(context)
    }
}
