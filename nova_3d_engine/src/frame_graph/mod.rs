//! Frame graph module
//!
//! A frame graph is a per-frame, declarative description of the render
//! and compute passes that produce a frame, together with the resources
//! they read and write. Passes are declared against a [`FrameGraph`],
//! the graph is compiled (dead passes culled, resource lifetimes
//! computed), then executed: transient resources are realized just
//! before their first use and released just after their last use, and
//! each pass's callback records GPU commands.
//!
//! Backend objects (textures, render passes, framebuffers) are pooled
//! in a [`FrameGraphCache`] that outlives individual frame graphs, so
//! creation cost is amortized across frames.

mod common;
mod graph;
mod handle;
mod resource;
mod resource_node;
mod pass_node;
mod resource_pool;
mod fg_texture;
mod fg_render_pass;
mod frame_graph;

pub use common::{AttachmentFlags, PassExecuteContext, PassType, ResourceUsage};
pub use fg_render_pass::{FgRenderPassDesc, MAX_COLOR_ATTACHMENTS};
pub use fg_texture::{FgTexture, FgTextureDesc};
pub use frame_graph::{FrameGraph, FrameGraphBuilder};
pub use handle::FgHandle;
pub use resource::GraphResource;
pub use resource_pool::{
    FramebufferFactory, FramebufferKey, FrameGraphCache, PoolFactory, PoolHandle,
    RenderPassFactory, ResourcePool, TextureFactory,
};
