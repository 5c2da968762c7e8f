/// Frame graph render pass - bridges a graphics pass's attachment
/// declarations to a pooled backend render pass + framebuffer
///
/// Created right before the pass's callback runs and destroyed (freed
/// back to the pools) right after, so the expensive backend objects
/// are shared across passes and frames with matching attachments.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::frame_graph::fg_texture::{FgTexture, FgTextureDesc};
use crate::frame_graph::resource_pool::{FrameGraphCache, FramebufferKey, PoolHandle};
use crate::frame_graph::{AttachmentFlags, FgHandle, ResourceUsage};
use crate::graphics_device::{
    AttachmentDesc, ClearValue, CommandList, Framebuffer, GraphicsDevice, ImageLayout, LoadOp,
    RenderPass, RenderPassDesc, Rect2D, StoreOp, Texture, Viewport,
};

/// Maximum number of color attachments per graphics pass
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// Attachment and clear configuration of one graphics pass
#[derive(Clone)]
pub struct FgRenderPassDesc {
    /// Color attachment handles (invalid entries are skipped)
    pub color_attachments: [FgHandle<FgTexture>; MAX_COLOR_ATTACHMENTS],
    /// Optional depth/stencil attachment handle
    pub depth_stencil_attachment: FgHandle<FgTexture>,
    /// Viewport; a zero-sized viewport falls back to the attachment size
    pub viewport: Viewport,
    /// MSAA sample count override (0 = use the attachment's own count)
    pub msaa_samples: u32,
    /// Clear color applied to cleared color attachments
    pub clear_color: [f32; 4],
    /// Clear depth applied to a cleared depth/stencil attachment
    pub clear_depth: f32,
    /// Clear stencil applied to a cleared depth/stencil attachment
    pub clear_stencil: u32,
    /// Which attachments are cleared on load
    pub clear_flags: AttachmentFlags,
}

impl Default for FgRenderPassDesc {
    fn default() -> Self {
        Self {
            color_attachments: [FgHandle::default(); MAX_COLOR_ATTACHMENTS],
            depth_stencil_attachment: FgHandle::default(),
            viewport: Viewport::default(),
            msaa_samples: 0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
            clear_stencil: 0,
            clear_flags: AttachmentFlags::empty(),
        }
    }
}

/// One attachment after handle resolution: the realized backend
/// texture plus everything needed to build the backend descriptors
pub(crate) struct ResolvedAttachment {
    pub(crate) texture: Arc<dyn Texture>,
    pub(crate) desc: FgTextureDesc,
    pub(crate) usage: ResourceUsage,
    pub(crate) clear: bool,
    pub(crate) is_depth: bool,
}

impl ResolvedAttachment {
    fn attachment_desc(&self, msaa_samples: u32) -> AttachmentDesc {
        let samples = if msaa_samples > 0 {
            msaa_samples
        } else {
            self.desc.sample_count
        };

        let attachment_layout = if self.is_depth {
            ImageLayout::DepthStencilAttachment
        } else {
            ImageLayout::ColorAttachment
        };

        // The layout the attachment must end in depends on who
        // consumes it after this pass
        let final_layout = if self.usage.contains(ResourceUsage::PRESENT) {
            ImageLayout::PresentSrc
        } else if self.usage.contains(ResourceUsage::SAMPLED) {
            ImageLayout::ShaderReadOnly
        } else {
            attachment_layout
        };

        let load_op = if self.clear { LoadOp::Clear } else { LoadOp::Load };
        let initial_layout = if self.clear {
            ImageLayout::Undefined
        } else {
            attachment_layout
        };

        AttachmentDesc {
            format: self.desc.format,
            samples,
            load_op,
            store_op: StoreOp::Store,
            stencil_load_op: if self.is_depth && self.clear {
                LoadOp::Clear
            } else {
                LoadOp::DontCare
            },
            stencil_store_op: StoreOp::DontCare,
            initial_layout,
            final_layout,
        }
    }
}

/// The realized per-pass render pass state: pooled backend render pass
/// and framebuffer plus the resolved begin parameters.
pub(crate) struct FgRenderPass {
    render_pass: PoolHandle<dyn RenderPass>,
    framebuffer: PoolHandle<dyn Framebuffer>,
    clear_values: Vec<ClearValue>,
    viewport: Viewport,
    extent: (u32, u32),
}

impl FgRenderPass {
    /// Allocate the backend render pass and framebuffer from the cache
    /// for the given resolved attachments (colors first, depth last).
    pub(crate) fn create(
        desc: &FgRenderPassDesc,
        attachments: &[ResolvedAttachment],
        device: &mut dyn GraphicsDevice,
        cache: &mut FrameGraphCache,
    ) -> Result<Self> {
        if attachments.is_empty() {
            return Err(Error::InvalidResource(
                "graphics pass declared a render pass with no attachments".to_string(),
            ));
        }

        let mut color_attachments = Vec::new();
        let mut depth_stencil_attachment = None;
        let mut clear_values = Vec::new();

        for attachment in attachments {
            let attachment_desc = attachment.attachment_desc(desc.msaa_samples);
            if attachment.is_depth {
                depth_stencil_attachment = Some(attachment_desc);
            } else {
                color_attachments.push(attachment_desc);
                clear_values.push(ClearValue::Color(desc.clear_color));
            }
        }
        if depth_stencil_attachment.is_some() {
            clear_values.push(ClearValue::DepthStencil {
                depth: desc.clear_depth,
                stencil: desc.clear_stencil,
            });
        }

        let render_pass_desc = RenderPassDesc {
            color_attachments,
            depth_stencil_attachment,
        };
        let render_pass = cache.render_passes.allocate(&render_pass_desc, device)?;

        let extent = (attachments[0].desc.width, attachments[0].desc.height);
        let framebuffer_key = FramebufferKey {
            render_pass: render_pass.resource.clone(),
            attachments: attachments
                .iter()
                .map(|attachment| attachment.texture.clone())
                .collect(),
            width: extent.0,
            height: extent.1,
        };
        let framebuffer = cache.framebuffers.allocate(&framebuffer_key, device)?;

        let viewport = if desc.viewport.width > 0.0 {
            desc.viewport
        } else {
            Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.0 as f32,
                height: extent.1 as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            }
        };

        Ok(Self {
            render_pass,
            framebuffer,
            clear_values,
            viewport,
            extent,
        })
    }

    /// Backend render pass handed to the pass's execute callback
    pub(crate) fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass.resource
    }

    /// Begin the backend render pass and set viewport + scissor
    pub(crate) fn begin(&self, command_list: &mut dyn CommandList) -> Result<()> {
        command_list.begin_render_pass(
            &self.render_pass.resource,
            &self.framebuffer.resource,
            &self.clear_values,
        )?;
        command_list.set_viewport(self.viewport)?;
        command_list.set_scissor(Rect2D {
            x: 0,
            y: 0,
            width: self.extent.0,
            height: self.extent.1,
        })?;
        Ok(())
    }

    /// End the backend render pass
    pub(crate) fn end(&self, command_list: &mut dyn CommandList) -> Result<()> {
        command_list.end_render_pass()
    }

    /// Return the pooled objects to the cache
    pub(crate) fn destroy(self, cache: &mut FrameGraphCache) {
        cache.render_passes.free(self.render_pass);
        cache.framebuffers.free(self.framebuffer);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "fg_render_pass_tests.rs"]
mod tests;
