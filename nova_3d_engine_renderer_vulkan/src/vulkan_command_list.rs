/// VulkanCommandList - Vulkan implementation of the CommandList trait

use ash::vk;
use nova_3d_engine::nova3d::render::{
    ClearValue, CommandList, Framebuffer, Rect2D, RenderPass, Viewport,
};
use nova_3d_engine::nova3d::Result;
use nova_3d_engine::engine_err;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_frame_buffer::VulkanFramebuffer;
use crate::vulkan_render_pass::VulkanRenderPass;

/// Vulkan command list implementation
///
/// Owns a command pool with one primary command buffer. `begin` resets
/// the pool, so a command list can be reused across frames.
pub struct VulkanCommandList {
    context: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    pub(crate) command_buffer: vk::CommandBuffer,
}

impl VulkanCommandList {
    pub(crate) fn new(context: Arc<GpuContext>) -> Result<Self> {
        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(context.graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let command_pool = context
                .device
                .create_command_pool(&pool_info, None)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to create command pool: {:?}", e)
                })?;

            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffers = context
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to allocate command buffer: {:?}", e)
                })?;

            Ok(Self {
                context,
                command_pool,
                command_buffer: command_buffers[0],
            })
        }
    }

    pub(crate) fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

impl CommandList for VulkanCommandList {
    fn begin(&mut self) -> Result<()> {
        unsafe {
            self.context
                .device
                .reset_command_buffer(
                    self.command_buffer,
                    vk::CommandBufferResetFlags::empty(),
                )
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to reset command buffer: {:?}", e)
                })?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.context
                .device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to begin command buffer: {:?}", e)
                })?;
        }
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        unsafe {
            self.context
                .device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to end command buffer: {:?}", e)
                })?;
        }
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        unsafe {
            // Downcast to Vulkan types to access native handles
            let vk_render_pass =
                render_pass.as_ref() as *const dyn RenderPass as *const VulkanRenderPass;
            let vk_framebuffer =
                framebuffer.as_ref() as *const dyn Framebuffer as *const VulkanFramebuffer;

            let vk_clear_values: Vec<vk::ClearValue> = clear_values
                .iter()
                .map(|clear| match clear {
                    ClearValue::Color(rgba) => vk::ClearValue {
                        color: vk::ClearColorValue { float32: *rgba },
                    },
                    ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
                        depth_stencil: vk::ClearDepthStencilValue {
                            depth: *depth,
                            stencil: *stencil,
                        },
                    },
                })
                .collect();

            let begin_info = vk::RenderPassBeginInfo::default()
                .render_pass((*vk_render_pass).render_pass)
                .framebuffer((*vk_framebuffer).framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: vk::Extent2D {
                        width: framebuffer.width(),
                        height: framebuffer.height(),
                    },
                })
                .clear_values(&vk_clear_values);

            self.context.device.cmd_begin_render_pass(
                self.command_buffer,
                &begin_info,
                vk::SubpassContents::INLINE,
            );
        }
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        unsafe {
            self.context.device.cmd_end_render_pass(self.command_buffer);
        }
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        unsafe {
            self.context.device.cmd_set_viewport(
                self.command_buffer,
                0,
                &[vk::Viewport {
                    x: viewport.x,
                    y: viewport.y,
                    width: viewport.width,
                    height: viewport.height,
                    min_depth: viewport.min_depth,
                    max_depth: viewport.max_depth,
                }],
            );
        }
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        unsafe {
            self.context.device.cmd_set_scissor(
                self.command_buffer,
                0,
                &[vk::Rect2D {
                    offset: vk::Offset2D {
                        x: scissor.x,
                        y: scissor.y,
                    },
                    extent: vk::Extent2D {
                        width: scissor.width,
                        height: scissor.height,
                    },
                }],
            );
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        unsafe {
            self.context
                .device
                .cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
        }
        Ok(())
    }
}

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            self.context
                .device
                .destroy_command_pool(self.command_pool, None);
        }
    }
}
