/// VulkanGraphicsDevice - Vulkan implementation of the GraphicsDevice trait

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc};
use gpu_allocator::MemoryLocation;
use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

use nova_3d_engine::nova3d::render::{
    CommandList, Config, Framebuffer, FramebufferDesc, GraphicsDevice, RenderPass, RenderPassDesc,
    RenderTarget, Texture, TextureDesc, TextureInfo, TextureUsage,
};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_bail, engine_err, engine_error, engine_info, engine_warn};

use crate::vulkan_command_list::VulkanCommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{
    aspect_mask_for, format_to_vk, image_layout_to_vk, load_op_to_vk, sample_count_to_vk,
    store_op_to_vk, usage_to_vk,
};
use crate::vulkan_frame_buffer::VulkanFramebuffer;
use crate::vulkan_render_pass::VulkanRenderPass;
use crate::vulkan_render_target::VulkanRenderTarget;
use crate::vulkan_texture::VulkanTexture;

/// Vulkan graphics device
///
/// Central object for creating resources and submitting commands. Can
/// be created headless (no window/surface), which is what offscreen
/// rendering and the test suite use.
pub struct VulkanGraphicsDevice {
    /// Physical device the logical device was created from
    #[allow(dead_code)]
    physical_device: vk::PhysicalDevice,

    /// Fence for submit synchronization
    submit_fence: vk::Fence,

    /// Shared GPU context, also held by every created resource
    context: Arc<GpuContext>,
}

impl VulkanGraphicsDevice {
    /// Create a headless Vulkan device: instance, physical device
    /// selection, logical device with one graphics queue, and the GPU
    /// memory allocator. No surface or swapchain is created.
    pub fn new_headless(config: Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            // Application info
            let app_name = CString::new(config.app_name.as_str()).unwrap_or_default();
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(
                    0,
                    config.app_version.0,
                    config.app_version.1,
                    config.app_version.2,
                ))
                .engine_name(c"Nova3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            // Layers and extensions
            #[allow(unused_mut)]
            let mut extension_names: Vec<*const std::ffi::c_char> = Vec::new();
            #[allow(unused_mut)]
            let mut layer_names: Vec<*const std::ffi::c_char> = Vec::new();

            #[cfg(feature = "vulkan-validation")]
            let validation_enabled = {
                let mut enabled = false;
                if config.enable_validation {
                    let validation_layer = c"VK_LAYER_KHRONOS_validation";
                    let available = entry
                        .enumerate_instance_layer_properties()
                        .unwrap_or_default()
                        .iter()
                        .any(|layer| {
                            layer
                                .layer_name_as_c_str()
                                .map(|name| name == validation_layer)
                                .unwrap_or(false)
                        });
                    if available {
                        layer_names.push(validation_layer.as_ptr());
                        extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                        enabled = true;
                    } else {
                        engine_warn!(
                            "nova3d::vulkan",
                            "Validation requested but VK_LAYER_KHRONOS_validation is not installed"
                        );
                    }
                }
                enabled
            };

            let mut instance_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            #[cfg(feature = "vulkan-validation")]
            let mut debug_messenger_info = crate::vulkan_debug::messenger_create_info();
            #[cfg(feature = "vulkan-validation")]
            if validation_enabled {
                instance_info = instance_info.push_next(&mut debug_messenger_info);
            }

            let instance = entry.create_instance(&instance_info, None).map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create Vulkan instance: {:?}", e))
            })?;

            #[cfg(feature = "vulkan-validation")]
            let (debug_utils_loader, debug_messenger) = if validation_enabled {
                let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
                let messenger = loader
                    .create_debug_utils_messenger(&crate::vulkan_debug::messenger_create_info(), None)
                    .map_err(|e| {
                        engine_error!(
                            "nova3d::vulkan",
                            "Failed to create debug messenger: {:?}",
                            e
                        );
                        Error::InitializationFailed(format!(
                            "Failed to create debug messenger: {:?}",
                            e
                        ))
                    })?;
                (Some(loader), Some(messenger))
            } else {
                (None, None)
            };

            // Physical device selection: prefer a discrete GPU
            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!(
                    "Failed to enumerate physical devices: {:?}",
                    e
                ))
            })?;
            if physical_devices.is_empty() {
                engine_error!("nova3d::vulkan", "No Vulkan-capable physical device found");
                return Err(Error::InitializationFailed(
                    "No Vulkan-capable physical device found".to_string(),
                ));
            }
            let physical_device = physical_devices
                .iter()
                .copied()
                .find(|&device| {
                    instance.get_physical_device_properties(device).device_type
                        == vk::PhysicalDeviceType::DISCRETE_GPU
                })
                .unwrap_or(physical_devices[0]);

            let properties = instance.get_physical_device_properties(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "<unknown>".to_string());
            engine_info!("nova3d::vulkan", "Using physical device '{}'", device_name);

            // Graphics queue family
            let graphics_queue_family = instance
                .get_physical_device_queue_family_properties(physical_device)
                .iter()
                .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .ok_or_else(|| {
                    engine_error!("nova3d::vulkan", "No graphics queue family found");
                    Error::InitializationFailed("No graphics queue family found".to_string())
                })? as u32;

            // Logical device with one graphics queue
            let queue_priorities = [1.0f32];
            let queue_info = vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_queue_family)
                .queue_priorities(&queue_priorities);
            let device_info =
                vk::DeviceCreateInfo::default().queue_create_infos(std::slice::from_ref(&queue_info));

            let device = instance
                .create_device(physical_device, &device_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to create logical device: {:?}",
                        e
                    ))
                })?;
            let graphics_queue = device.get_device_queue(graphics_queue_family, 0);

            // GPU memory allocator
            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!("nova3d::vulkan", "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create GPU allocator: {:?}", e))
            })?;

            // Submit fence, created signaled so the first submit never waits
            let submit_fence = device
                .create_fence(
                    &vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED),
                    None,
                )
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create submit fence: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create submit fence: {:?}", e))
                })?;

            let context = Arc::new(GpuContext {
                entry,
                instance,
                device,
                allocator: ManuallyDrop::new(Mutex::new(allocator)),
                graphics_queue,
                graphics_queue_family,
                #[cfg(feature = "vulkan-validation")]
                debug_utils_loader,
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
            });

            engine_info!("nova3d::vulkan", "Headless Vulkan device initialized");
            Ok(Self {
                physical_device,
                submit_fence,
                context,
            })
        }
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>> {
        unsafe {
            let format = format_to_vk(desc.format);
            let image_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(desc.mip_levels)
                .array_layers(desc.array_layers)
                .samples(sample_count_to_vk(desc.sample_count))
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage_to_vk(desc.usage))
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = self
                .context
                .device
                .create_image(&image_info, None)
                .map_err(|e| engine_err!("nova3d::vulkan", "Failed to create image: {:?}", e))?;

            let requirements = self.context.device.get_image_memory_requirements(image);
            let allocation: Allocation = self
                .context
                .allocator
                .lock()
                .unwrap()
                .allocate(&AllocationCreateDesc {
                    name: "texture",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    self.context.device.destroy_image(image, None);
                    engine_err!("nova3d::vulkan", "Failed to allocate image memory: {:?}", e)
                })?;

            self.context
                .device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to bind image memory: {:?}", e)
                })?;

            let view_type = if desc.array_layers > 1 {
                vk::ImageViewType::TYPE_2D_ARRAY
            } else {
                vk::ImageViewType::TYPE_2D
            };
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(view_type)
                .format(format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect_mask_for(desc.format),
                    base_mip_level: 0,
                    level_count: desc.mip_levels,
                    base_array_layer: 0,
                    layer_count: desc.array_layers,
                });
            let view = self
                .context
                .device
                .create_image_view(&view_info, None)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to create image view: {:?}", e)
                })?;

            Ok(Arc::new(VulkanTexture {
                image,
                view,
                allocation: Some(allocation),
                context: self.context.clone(),
                info: TextureInfo {
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    usage: desc.usage,
                    array_layers: desc.array_layers,
                    mip_levels: desc.mip_levels,
                    sample_count: desc.sample_count,
                },
            }))
        }
    }

    fn create_render_target_texture(
        &self,
        texture: &dyn Texture,
        layer: u32,
        mip_level: u32,
    ) -> Result<Arc<dyn RenderTarget>> {
        let info = texture.info();

        match info.usage {
            TextureUsage::RenderTarget
            | TextureUsage::SampledAndRenderTarget
            | TextureUsage::DepthStencil => {}
            _ => {
                engine_bail!(
                    "nova3d::vulkan",
                    "create_render_target_texture: texture usage {:?} is not render-target compatible",
                    info.usage
                );
            }
        }
        if layer >= info.array_layers {
            engine_bail!(
                "nova3d::vulkan",
                "create_render_target_texture: layer {} out of range (array_layers = {})",
                layer,
                info.array_layers
            );
        }
        if mip_level >= info.mip_levels {
            engine_bail!(
                "nova3d::vulkan",
                "create_render_target_texture: mip_level {} out of range (mip_levels = {})",
                mip_level,
                info.mip_levels
            );
        }

        unsafe {
            // Downcast to the Vulkan texture to access the VkImage
            let vk_texture = texture as *const dyn Texture as *const VulkanTexture;
            let vk_texture = &*vk_texture;

            let view_info = vk::ImageViewCreateInfo::default()
                .image(vk_texture.image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format_to_vk(info.format))
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect_mask_for(info.format),
                    base_mip_level: mip_level,
                    level_count: 1,
                    base_array_layer: layer,
                    layer_count: 1,
                });

            let view = self
                .context
                .device
                .create_image_view(&view_info, None)
                .map_err(|e| {
                    engine_err!(
                        "nova3d::vulkan",
                        "Failed to create render target view: {:?}",
                        e
                    )
                })?;

            let mip_width = (info.width >> mip_level).max(1);
            let mip_height = (info.height >> mip_level).max(1);

            Ok(Arc::new(VulkanRenderTarget::new(
                mip_width,
                mip_height,
                info.format,
                view,
                self.context.clone(),
            )))
        }
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        unsafe {
            let mut attachments = Vec::new();
            let mut color_attachment_refs = Vec::new();
            let mut depth_attachment_ref: Option<vk::AttachmentReference> = None;

            for (index, color) in desc.color_attachments.iter().enumerate() {
                attachments.push(
                    vk::AttachmentDescription::default()
                        .format(format_to_vk(color.format))
                        .samples(sample_count_to_vk(color.samples))
                        .load_op(load_op_to_vk(color.load_op))
                        .store_op(store_op_to_vk(color.store_op))
                        .stencil_load_op(load_op_to_vk(color.stencil_load_op))
                        .stencil_store_op(store_op_to_vk(color.stencil_store_op))
                        .initial_layout(image_layout_to_vk(color.initial_layout))
                        .final_layout(image_layout_to_vk(color.final_layout)),
                );
                color_attachment_refs.push(
                    vk::AttachmentReference::default()
                        .attachment(index as u32)
                        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
                );
            }

            if let Some(depth) = &desc.depth_stencil_attachment {
                let depth_index = attachments.len() as u32;
                attachments.push(
                    vk::AttachmentDescription::default()
                        .format(format_to_vk(depth.format))
                        .samples(sample_count_to_vk(depth.samples))
                        .load_op(load_op_to_vk(depth.load_op))
                        .store_op(store_op_to_vk(depth.store_op))
                        .stencil_load_op(load_op_to_vk(depth.stencil_load_op))
                        .stencil_store_op(store_op_to_vk(depth.stencil_store_op))
                        .initial_layout(image_layout_to_vk(depth.initial_layout))
                        .final_layout(image_layout_to_vk(depth.final_layout)),
                );
                depth_attachment_ref = Some(
                    vk::AttachmentReference::default()
                        .attachment(depth_index)
                        .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
                );
            }

            let mut subpass = vk::SubpassDescription::default()
                .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
                .color_attachments(&color_attachment_refs);
            if let Some(ref depth_ref) = depth_attachment_ref {
                subpass = subpass.depth_stencil_attachment(depth_ref);
            }

            let has_depth = depth_attachment_ref.is_some();
            let (stage_mask, access_mask) = if has_depth {
                (
                    vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                        | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
                    vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                        | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
                )
            } else {
                (
                    vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
                    vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
                )
            };
            let dependency = vk::SubpassDependency::default()
                .src_subpass(vk::SUBPASS_EXTERNAL)
                .dst_subpass(0)
                .src_stage_mask(stage_mask)
                .src_access_mask(vk::AccessFlags::empty())
                .dst_stage_mask(stage_mask)
                .dst_access_mask(access_mask);

            let render_pass_info = vk::RenderPassCreateInfo::default()
                .attachments(&attachments)
                .subpasses(std::slice::from_ref(&subpass))
                .dependencies(std::slice::from_ref(&dependency));

            let render_pass = self
                .context
                .device
                .create_render_pass(&render_pass_info, None)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to create render pass: {:?}", e)
                })?;

            Ok(Arc::new(VulkanRenderPass {
                render_pass,
                context: self.context.clone(),
            }))
        }
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        unsafe {
            let vk_render_pass = desc.render_pass.as_ref() as *const dyn RenderPass
                as *const VulkanRenderPass;

            let mut attachments = Vec::with_capacity(
                desc.color_attachments.len()
                    + usize::from(desc.depth_stencil_attachment.is_some()),
            );
            for color in &desc.color_attachments {
                let vk_target =
                    color.as_ref() as *const dyn RenderTarget as *const VulkanRenderTarget;
                attachments.push((*vk_target).image_view);
            }
            if let Some(depth) = &desc.depth_stencil_attachment {
                let vk_target =
                    depth.as_ref() as *const dyn RenderTarget as *const VulkanRenderTarget;
                attachments.push((*vk_target).image_view);
            }

            let framebuffer_info = vk::FramebufferCreateInfo::default()
                .render_pass((*vk_render_pass).render_pass)
                .attachments(&attachments)
                .width(desc.width)
                .height(desc.height)
                .layers(1);

            let framebuffer = self
                .context
                .device
                .create_framebuffer(&framebuffer_info, None)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to create framebuffer: {:?}", e)
                })?;

            Ok(Arc::new(VulkanFramebuffer::new(
                framebuffer,
                desc.width,
                desc.height,
                self.context.clone(),
            )))
        }
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(VulkanCommandList::new(self.context.clone())?))
    }

    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()> {
        unsafe {
            self.context
                .device
                .wait_for_fences(&[self.submit_fence], true, u64::MAX)
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to wait for submit fence: {:?}", e)
                })?;
            self.context
                .device
                .reset_fences(&[self.submit_fence])
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to reset submit fence: {:?}", e)
                })?;

            let command_buffers: Vec<vk::CommandBuffer> = commands
                .iter()
                .map(|command| {
                    let vk_command =
                        *command as *const dyn CommandList as *const VulkanCommandList;
                    (*vk_command).command_buffer()
                })
                .collect();

            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            self.context
                .device
                .queue_submit(
                    self.context.graphics_queue,
                    &[submit_info],
                    self.submit_fence,
                )
                .map_err(|e| {
                    engine_err!("nova3d::vulkan", "Failed to submit commands: {:?}", e)
                })?;
        }
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.context
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!("nova3d::vulkan", "wait_idle failed: {:?}", e))?;
        }
        Ok(())
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.context.device.device_wait_idle().ok();
            self.context.device.destroy_fence(self.submit_fence, None);
            // Device and instance teardown happens in GpuContext::drop
            // once the last resource releases its context reference
        }
    }
}
