/// FrameGraph - declarative per-frame pass and resource scheduler
///
/// One instance describes one frame: passes are declared with setup
/// and execute callbacks, the graph is compiled (dead passes culled,
/// resource lifetimes computed), command lists are bound, passes are
/// executed strictly in declaration order, and the command lists are
/// returned for submission. A new frame needs a new instance.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::frame_graph::fg_render_pass::{FgRenderPass, FgRenderPassDesc, ResolvedAttachment};
use crate::frame_graph::fg_texture::FgTexture;
use crate::frame_graph::graph::DirectedAcyclicGraph;
use crate::frame_graph::pass_node::{PassNode, ResourceAccess};
use crate::frame_graph::resource::{TransientResource, VirtualResource};
use crate::frame_graph::resource_node::ResourceNode;
use crate::frame_graph::resource_pool::FrameGraphCache;
use crate::frame_graph::{
    FgHandle, GraphResource, PassExecuteContext, PassType, ResourceUsage,
};
use crate::graphics_device::{CommandList, GraphicsDevice};
use crate::{engine_bail, engine_debug, engine_err, engine_error, engine_trace};

/// Lifecycle states of a frame graph instance.
///
/// Transitions only move forward: declare, compile, record, execute,
/// finish. Out-of-order calls are rejected with
/// `Error::InvalidOperation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameGraphState {
    Declaring,
    Compiled,
    Recording,
    Executed,
    Finished,
}

pub struct FrameGraph {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    cache: Arc<Mutex<FrameGraphCache>>,
    state: FrameGraphState,
    graph: DirectedAcyclicGraph,
    virtual_resources: Vec<Box<dyn VirtualResource>>,
    resource_nodes: Vec<ResourceNode>,
    /// Logical resource slot -> index of its current version node
    latest_version: Vec<usize>,
    pass_nodes: Vec<PassNode>,
    command_lists: Vec<Box<dyn CommandList>>,
}

impl FrameGraph {
    /// Create an empty frame graph against a graphics device and its
    /// resource cache. The cache outlives the frame graph and is what
    /// carries pooled backend objects from frame to frame.
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        cache: Arc<Mutex<FrameGraphCache>>,
    ) -> Self {
        Self {
            device,
            cache,
            state: FrameGraphState::Declaring,
            graph: DirectedAcyclicGraph::new(),
            virtual_resources: Vec::new(),
            resource_nodes: Vec::new(),
            latest_version: Vec::new(),
            pass_nodes: Vec::new(),
            command_lists: Vec::new(),
        }
    }

    // ===== DECLARATION =====

    /// Declare a pass.
    ///
    /// `setup` runs immediately and synchronously against a builder to
    /// declare the pass's creates/reads/writes; declaration order is
    /// execution order. `execute` is captured and invoked during
    /// [`FrameGraph::execute`] with the same `Data` the setup filled
    /// in, plus the platform execution context. Returns a clone of the
    /// filled `Data` so later passes can wire up against its handles.
    pub fn add_pass<D, S, E>(
        &mut self,
        name: &str,
        pass_type: PassType,
        setup: S,
        execute: E,
    ) -> D
    where
        D: Default + Clone + 'static,
        S: FnOnce(&mut FrameGraphBuilder<'_>, &mut D),
        E: FnMut(&D, &mut PassExecuteContext<'_>) -> Result<()> + 'static,
    {
        assert!(
            self.state == FrameGraphState::Declaring,
            "add_pass() after compile()"
        );

        let node = self.graph.add_node();
        let pass_index = self.pass_nodes.len();
        self.pass_nodes.push(PassNode::new(name, node, pass_type));
        engine_trace!("nova3d::FrameGraph", "declared pass '{}'", name);

        let mut data = D::default();
        {
            let mut builder = FrameGraphBuilder {
                frame_graph: self,
                pass_index,
            };
            setup(&mut builder, &mut data);
        }

        let result = data.clone();
        let mut execute = execute;
        self.pass_nodes[pass_index]
            .set_executor(Box::new(move |context| execute(&data, context)));
        result
    }

    /// Register an externally owned resource (e.g. the swapchain's
    /// current image). The frame graph references it but never
    /// creates or destroys its backend object.
    pub fn import<R: GraphResource + 'static>(
        &mut self,
        name: &str,
        resource: R,
        descriptor: R::Descriptor,
    ) -> FgHandle<R> {
        assert!(
            self.state == FrameGraphState::Declaring,
            "import() after compile()"
        );
        let slot = self.virtual_resources.len();
        self.virtual_resources
            .push(Box::new(TransientResource::imported(name, resource, descriptor)));
        self.push_version(slot);
        engine_debug!("nova3d::FrameGraph", "imported external resource '{}'", name);
        FgHandle::new(slot)
    }

    fn create_resource<R: GraphResource + 'static>(
        &mut self,
        name: &str,
        descriptor: R::Descriptor,
    ) -> FgHandle<R> {
        assert!(
            self.state == FrameGraphState::Declaring,
            "create() after compile()"
        );
        let slot = self.virtual_resources.len();
        self.virtual_resources
            .push(Box::new(TransientResource::<R>::new(name, descriptor)));
        self.push_version(slot);
        engine_trace!("nova3d::FrameGraph", "declared transient resource '{}'", name);
        FgHandle::new(slot)
    }

    /// Append a new version node for `slot` and make it current
    fn push_version(&mut self, slot: usize) -> usize {
        let version = if slot < self.latest_version.len() {
            self.resource_nodes[self.latest_version[slot]].version + 1
        } else {
            0
        };
        let node = self.graph.add_node();
        let index = self.resource_nodes.len();
        self.resource_nodes
            .push(ResourceNode::new(node, slot, version));
        if slot < self.latest_version.len() {
            self.latest_version[slot] = index;
        } else {
            debug_assert_eq!(slot, self.latest_version.len());
            self.latest_version.push(index);
        }
        index
    }

    fn write_resource<R: GraphResource + 'static>(
        &mut self,
        pass_index: usize,
        handle: FgHandle<R>,
        usage: ResourceUsage,
    ) -> FgHandle<R> {
        let slot = handle.index();
        self.virtual_resources[slot].add_usage(usage);

        let mut version_index = self.latest_version[slot];
        if self.resource_nodes[version_index].has_writer() {
            // A second writer produces a successor version of the same
            // logical resource instead of mutating the written one;
            // the handle value stays stable
            version_index = self.push_version(slot);
        }

        let edge = self.graph.add_edge(
            self.pass_nodes[pass_index].node,
            self.resource_nodes[version_index].node,
            usage,
        );
        self.resource_nodes[version_index].set_write_edge(edge);
        self.pass_nodes[pass_index].add_write(ResourceAccess {
            slot,
            version_node: version_index,
            usage,
        });

        if self.virtual_resources[slot].is_imported() || usage.contains(ResourceUsage::PRESENT) {
            self.pass_nodes[pass_index].mark_side_effect();
        }
        handle
    }

    fn read_resource<R: GraphResource + 'static>(
        &mut self,
        pass_index: usize,
        handle: FgHandle<R>,
        usage: ResourceUsage,
    ) -> FgHandle<R> {
        let slot = handle.index();
        self.virtual_resources[slot].add_usage(usage);

        let version_index = self.latest_version[slot];
        let edge = self.graph.add_edge(
            self.resource_nodes[version_index].node,
            self.pass_nodes[pass_index].node,
            usage,
        );
        self.resource_nodes[version_index].add_read_edge(edge);
        self.pass_nodes[pass_index].add_read(ResourceAccess {
            slot,
            version_node: version_index,
            usage,
        });

        if self.virtual_resources[slot].is_imported() || usage.contains(ResourceUsage::PRESENT) {
            self.pass_nodes[pass_index].mark_side_effect();
        }
        handle
    }

    // ===== COMPILATION =====

    /// Resolve the declared graph: validate reads, cull passes not
    /// reachable from any side-effecting root, and compute every
    /// resource's liveness window (first/last using pass in
    /// declaration order) plus each pass's realize/destroy lists.
    ///
    /// Must run after all passes are declared and before `begin()`.
    pub fn compile(&mut self) -> Result<()> {
        self.expect_state(FrameGraphState::Declaring, "compile()")?;

        // A read without a prior writer can never see valid data
        for pass in &self.pass_nodes {
            for access in &pass.reads {
                let version = &self.resource_nodes[access.version_node];
                if !version.has_writer() && !self.virtual_resources[access.slot].is_imported() {
                    let name = self.virtual_resources[access.slot].name();
                    engine_error!(
                        "nova3d::FrameGraph",
                        "resource '{}' read by pass '{}' with no prior writer",
                        name,
                        pass.name()
                    );
                    return Err(Error::InvalidResource(format!(
                        "resource '{}' read with no prior writer",
                        name
                    )));
                }
            }
        }

        // Side-effecting passes are the roots the sweep keeps alive
        let roots: Vec<_> = self
            .pass_nodes
            .iter()
            .filter(|pass| pass.has_side_effect())
            .map(|pass| pass.node)
            .collect();
        for node in roots {
            self.graph.retain(node);
        }
        self.graph.cull();

        // Liveness windows over surviving passes, in declaration order
        {
            let FrameGraph {
                ref graph,
                ref pass_nodes,
                ref mut virtual_resources,
                ..
            } = *self;
            for (pass_index, pass) in pass_nodes.iter().enumerate() {
                if graph.is_culled(pass.node) {
                    continue;
                }
                for access in pass.reads.iter().chain(pass.writes.iter()) {
                    virtual_resources[access.slot].mark_used_by(pass_index);
                }
            }
        }

        // Realize right before first use, release right after last use
        {
            let FrameGraph {
                ref mut pass_nodes,
                ref virtual_resources,
                ..
            } = *self;
            for (slot, resource) in virtual_resources.iter().enumerate() {
                if resource.is_imported() {
                    continue;
                }
                if let (Some(first), Some(last)) = (resource.first_pass(), resource.last_pass()) {
                    pass_nodes[first].realize_list.push(slot);
                    pass_nodes[last].destroy_list.push(slot);
                }
            }
        }

        let culled = self
            .pass_nodes
            .iter()
            .filter(|pass| self.graph.is_culled(pass.node))
            .count();
        engine_debug!(
            "nova3d::FrameGraph",
            "compiled: {} pass(es) ({} culled), {} resource(s), {} node(s), {} edge(s)",
            self.pass_nodes.len(),
            culled,
            self.virtual_resources.len(),
            self.graph.node_count(),
            self.graph.edge_count()
        );

        self.state = FrameGraphState::Compiled;
        Ok(())
    }

    // ===== EXECUTION =====

    /// Bind command lists for recording and begin them. Index 0 records
    /// graphics passes; index 1 (when provided) records compute passes.
    pub fn begin(&mut self, command_lists: Vec<Box<dyn CommandList>>) -> Result<()> {
        self.expect_state(FrameGraphState::Compiled, "begin()")?;
        if command_lists.is_empty() {
            engine_bail!("nova3d::FrameGraph", "begin() requires at least one command list");
        }
        self.command_lists = command_lists;
        for command_list in &mut self.command_lists {
            command_list.begin()?;
        }
        self.state = FrameGraphState::Recording;
        Ok(())
    }

    /// Run every surviving pass strictly in declaration order.
    ///
    /// The dependency graph only informs culling and lifetimes; it
    /// never reorders passes. Per pass: realize its realize-list,
    /// create and begin its backend render pass (graphics passes with
    /// attachments), invoke the execute callback, end and release the
    /// render pass, release its destroy-list.
    pub fn execute(&mut self) -> Result<()> {
        self.expect_state(FrameGraphState::Recording, "execute()")?;

        let device = Arc::clone(&self.device);
        let cache = Arc::clone(&self.cache);
        let mut device = device
            .lock()
            .map_err(|_| engine_err!("nova3d::FrameGraph", "graphics device lock poisoned"))?;
        let mut cache = cache
            .lock()
            .map_err(|_| engine_err!("nova3d::FrameGraph", "resource cache lock poisoned"))?;

        {
            let FrameGraph {
                ref graph,
                ref mut virtual_resources,
                ref mut pass_nodes,
                ref mut command_lists,
                ..
            } = *self;

            for pass_index in 0..pass_nodes.len() {
                if graph.is_culled(pass_nodes[pass_index].node) {
                    engine_trace!(
                        "nova3d::FrameGraph",
                        "pass '{}' culled, skipping",
                        pass_nodes[pass_index].name()
                    );
                    continue;
                }

                let realize_list = pass_nodes[pass_index].realize_list.clone();
                for slot in realize_list {
                    virtual_resources[slot].realize(&mut *device, &mut *cache)?;
                }

                let mut render_pass = None;
                if pass_nodes[pass_index].pass_type() == PassType::Graphics {
                    if let Some(desc) = pass_nodes[pass_index].render_pass_desc().cloned() {
                        let attachments = Self::resolve_attachments(virtual_resources, &desc)?;
                        render_pass = Some(FgRenderPass::create(
                            &desc,
                            &attachments,
                            &mut *device,
                            &mut *cache,
                        )?);
                    }
                }

                let command_index = match pass_nodes[pass_index].pass_type() {
                    PassType::Graphics => 0,
                    PassType::Compute => usize::min(1, command_lists.len() - 1),
                };

                if let Some(pass) = &render_pass {
                    pass.begin(command_lists[command_index].as_mut())?;
                }
                {
                    let mut context = PassExecuteContext {
                        command_list: command_lists[command_index].as_mut(),
                        render_pass: render_pass.as_ref().map(FgRenderPass::render_pass),
                    };
                    pass_nodes[pass_index].execute(&mut context)?;
                }
                if let Some(pass) = &render_pass {
                    pass.end(command_lists[command_index].as_mut())?;
                }
                if let Some(pass) = render_pass.take() {
                    pass.destroy(&mut cache);
                }

                let destroy_list = pass_nodes[pass_index].destroy_list.clone();
                for slot in destroy_list {
                    virtual_resources[slot].release(&mut cache);
                }
            }
        }

        self.state = FrameGraphState::Executed;
        Ok(())
    }

    /// End the bound command lists and hand them back for submission
    pub fn end(&mut self) -> Result<Vec<Box<dyn CommandList>>> {
        self.expect_state(FrameGraphState::Executed, "end()")?;
        for command_list in &mut self.command_lists {
            command_list.end()?;
        }
        self.state = FrameGraphState::Finished;
        Ok(std::mem::take(&mut self.command_lists))
    }

    // ===== INTROSPECTION =====

    /// Number of declared passes
    pub fn pass_count(&self) -> usize {
        self.pass_nodes.len()
    }

    /// Number of declared logical resources
    pub fn resource_count(&self) -> usize {
        self.virtual_resources.len()
    }

    // ===== INTERNAL =====

    fn expect_state(&self, expected: FrameGraphState, operation: &str) -> Result<()> {
        if self.state != expected {
            engine_error!(
                "nova3d::FrameGraph",
                "{} called in {:?} state (expected {:?})",
                operation,
                self.state,
                expected
            );
            return Err(Error::InvalidOperation(format!(
                "{} called in {:?} state",
                operation, self.state
            )));
        }
        Ok(())
    }

    fn resolve_attachments(
        virtual_resources: &[Box<dyn VirtualResource>],
        desc: &FgRenderPassDesc,
    ) -> Result<Vec<ResolvedAttachment>> {
        let mut attachments = Vec::new();
        for (index, handle) in desc.color_attachments.iter().enumerate() {
            if !handle.is_valid() {
                continue;
            }
            attachments.push(Self::resolve_attachment(
                virtual_resources,
                *handle,
                desc.clear_flags
                    .contains(crate::frame_graph::AttachmentFlags::color(index)),
                false,
            )?);
        }
        if desc.depth_stencil_attachment.is_valid() {
            attachments.push(Self::resolve_attachment(
                virtual_resources,
                desc.depth_stencil_attachment,
                desc.clear_flags
                    .contains(crate::frame_graph::AttachmentFlags::DEPTH_STENCIL),
                true,
            )?);
        }
        Ok(attachments)
    }

    fn resolve_attachment(
        virtual_resources: &[Box<dyn VirtualResource>],
        handle: FgHandle<FgTexture>,
        clear: bool,
        is_depth: bool,
    ) -> Result<ResolvedAttachment> {
        let resource = virtual_resources[handle.index()].as_ref();
        let typed = resource
            .as_any()
            .downcast_ref::<TransientResource<FgTexture>>()
            .expect("render pass attachment is not a texture resource");
        let texture = typed
            .resource()
            .backend_texture()
            .cloned()
            .ok_or_else(|| {
                Error::InvalidResource(format!(
                    "attachment '{}' has no realized backend texture",
                    resource.name()
                ))
            })?;
        Ok(ResolvedAttachment {
            texture,
            desc: typed.descriptor().clone(),
            usage: resource.usage(),
            clear,
            is_depth,
        })
    }
}

/// Declaration-time view of a frame graph, scoped to the pass whose
/// setup callback is currently running.
pub struct FrameGraphBuilder<'a> {
    frame_graph: &'a mut FrameGraph,
    pass_index: usize,
}

impl<'a> FrameGraphBuilder<'a> {
    /// Declare a new transient resource, not yet backed by any GPU
    /// object. The returned handle is only valid within this frame
    /// graph instance.
    pub fn create<R: GraphResource + 'static>(
        &mut self,
        name: &str,
        descriptor: R::Descriptor,
    ) -> FgHandle<R> {
        self.frame_graph.create_resource(name, descriptor)
    }

    /// Declare that this pass produces a new version of the resource.
    /// Returns the same handle value.
    pub fn write<R: GraphResource + 'static>(
        &mut self,
        handle: FgHandle<R>,
        usage: ResourceUsage,
    ) -> FgHandle<R> {
        self.frame_graph
            .write_resource(self.pass_index, handle, usage)
    }

    /// Declare that this pass reads the resource's current version.
    /// Returns the same handle value.
    pub fn read<R: GraphResource + 'static>(
        &mut self,
        handle: FgHandle<R>,
        usage: ResourceUsage,
    ) -> FgHandle<R> {
        self.frame_graph
            .read_resource(self.pass_index, handle, usage)
    }

    /// Attach the render pass configuration (attachments, viewport,
    /// clears) to the current graphics pass
    pub fn set_render_pass_desc(&mut self, desc: FgRenderPassDesc) {
        self.frame_graph.pass_nodes[self.pass_index].set_render_pass_desc(desc);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "frame_graph_tests.rs"]
mod tests;
