//! Integration tests for VulkanGraphicsDevice
//!
//! These tests require a Vulkan driver and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_graphics_device_tests -- --ignored

use nova_3d_engine::nova3d::render::{
    AttachmentDesc, ClearValue, Config, FramebufferDesc, GraphicsDevice, ImageLayout, LoadOp,
    Rect2D, RenderPassDesc, StoreOp, TextureDesc, TextureFormat, TextureUsage, Viewport,
};
use nova_3d_engine_renderer_vulkan::VulkanGraphicsDevice;
use serial_test::serial;
use std::sync::{Arc, Mutex, OnceLock};

static DEVICE: OnceLock<Arc<Mutex<VulkanGraphicsDevice>>> = OnceLock::new();

fn test_device() -> Arc<Mutex<VulkanGraphicsDevice>> {
    DEVICE
        .get_or_init(|| {
            let device = VulkanGraphicsDevice::new_headless(Config::default())
                .expect("Failed to create headless Vulkan device");
            Arc::new(Mutex::new(device))
        })
        .clone()
}

fn color_texture_desc() -> TextureDesc {
    TextureDesc {
        width: 128,
        height: 128,
        format: TextureFormat::R8G8B8A8_UNORM,
        usage: TextureUsage::RenderTarget,
        array_layers: 1,
        mip_levels: 1,
        sample_count: 1,
    }
}

fn color_attachment_desc() -> AttachmentDesc {
    AttachmentDesc {
        format: TextureFormat::R8G8B8A8_UNORM,
        samples: 1,
        load_op: LoadOp::Clear,
        store_op: StoreOp::Store,
        stencil_load_op: LoadOp::DontCare,
        stencil_store_op: StoreOp::DontCare,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::ColorAttachment,
    }
}

// ============================================================================
// Resource creation
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_create_texture_reports_info() {
    let device = test_device();
    let texture = device
        .lock()
        .unwrap()
        .create_texture(color_texture_desc())
        .unwrap();

    let info = texture.info();
    assert_eq!(info.width, 128);
    assert_eq!(info.height, 128);
    assert_eq!(info.format, TextureFormat::R8G8B8A8_UNORM);
    assert_eq!(info.usage, TextureUsage::RenderTarget);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_create_render_target_from_texture() {
    let device = test_device();
    let texture = device
        .lock()
        .unwrap()
        .create_texture(color_texture_desc())
        .unwrap();

    let guard = device.lock().unwrap();
    let target = guard
        .create_render_target_texture(texture.as_ref(), 0, 0)
        .unwrap();
    assert_eq!(target.width(), 128);
    assert_eq!(target.height(), 128);
    assert_eq!(target.format(), TextureFormat::R8G8B8A8_UNORM);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_render_target_rejects_sampled_texture() {
    let device = test_device();
    let texture = {
        let mut desc = color_texture_desc();
        desc.usage = TextureUsage::Sampled;
        device.lock().unwrap().create_texture(desc).unwrap()
    };

    let guard = device.lock().unwrap();
    assert!(guard
        .create_render_target_texture(texture.as_ref(), 0, 0)
        .is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_create_render_pass_and_framebuffer() {
    let device = test_device();
    let texture = device
        .lock()
        .unwrap()
        .create_texture(color_texture_desc())
        .unwrap();

    let guard = device.lock().unwrap();
    let render_pass = guard
        .create_render_pass(&RenderPassDesc {
            color_attachments: vec![color_attachment_desc()],
            depth_stencil_attachment: None,
        })
        .unwrap();
    let target = guard
        .create_render_target_texture(texture.as_ref(), 0, 0)
        .unwrap();
    let framebuffer = guard
        .create_framebuffer(&FramebufferDesc {
            render_pass: render_pass.clone(),
            color_attachments: vec![target],
            depth_stencil_attachment: None,
            width: 128,
            height: 128,
        })
        .unwrap();

    assert_eq!(framebuffer.width(), 128);
    assert_eq!(framebuffer.height(), 128);
}

// ============================================================================
// Command recording and submission
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_record_clear_pass_and_submit() {
    let device = test_device();
    let texture = device
        .lock()
        .unwrap()
        .create_texture(color_texture_desc())
        .unwrap();

    let guard = device.lock().unwrap();
    let render_pass = guard
        .create_render_pass(&RenderPassDesc {
            color_attachments: vec![color_attachment_desc()],
            depth_stencil_attachment: None,
        })
        .unwrap();
    let target = guard
        .create_render_target_texture(texture.as_ref(), 0, 0)
        .unwrap();
    let framebuffer = guard
        .create_framebuffer(&FramebufferDesc {
            render_pass: render_pass.clone(),
            color_attachments: vec![target],
            depth_stencil_attachment: None,
            width: 128,
            height: 128,
        })
        .unwrap();

    let mut command_list = guard.create_command_list().unwrap();
    command_list.begin().unwrap();
    command_list
        .begin_render_pass(
            &render_pass,
            &framebuffer,
            &[ClearValue::Color([0.0, 0.5, 1.0, 1.0])],
        )
        .unwrap();
    command_list
        .set_viewport(Viewport {
            x: 0.0,
            y: 0.0,
            width: 128.0,
            height: 128.0,
            min_depth: 0.0,
            max_depth: 1.0,
        })
        .unwrap();
    command_list
        .set_scissor(Rect2D {
            x: 0,
            y: 0,
            width: 128,
            height: 128,
        })
        .unwrap();
    command_list.end_render_pass().unwrap();
    command_list.end().unwrap();

    guard.submit(&[command_list.as_ref()]).unwrap();
    guard.wait_idle().unwrap();
}
