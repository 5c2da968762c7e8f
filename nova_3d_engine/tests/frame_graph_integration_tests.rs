//! Integration tests for the frame graph with a real GPU
//!
//! These tests run complete declare/compile/execute/submit frames
//! against a headless VulkanGraphicsDevice. Tests requiring a GPU are
//! marked with #[ignore].
//!
//! Run with: cargo test --test frame_graph_integration_tests -- --ignored

mod gpu_test_utils;

use gpu_test_utils::get_test_graphics_device;
use nova_3d_engine::nova3d::frame_graph::{
    AttachmentFlags, FgHandle, FgRenderPassDesc, FgTexture, FgTextureDesc, FrameGraph,
    FrameGraphCache, PassType, ResourceUsage,
};
use nova_3d_engine::nova3d::render::{GraphicsDevice, TextureDesc, TextureFormat, TextureUsage};
use serial_test::serial;
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
struct GBufferData {
    color: FgHandle<FgTexture>,
}

fn offscreen_desc(width: u32, height: u32) -> FgTextureDesc {
    FgTextureDesc {
        width,
        height,
        format: TextureFormat::R8G8B8A8_UNORM,
        ..FgTextureDesc::default()
    }
}

/// Run one frame: a geometry pass into a transient color target, then
/// a composite pass sampling it and writing the imported target.
fn run_frame(
    device: &Arc<Mutex<nova_3d_engine_renderer_vulkan::nova3d::VulkanGraphicsDevice>>,
    cache: &Arc<Mutex<FrameGraphCache>>,
    target: Arc<dyn nova_3d_engine::nova3d::render::Texture>,
) {
    let device_dyn: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    let mut fg = FrameGraph::new(device_dyn, cache.clone());

    let imported = fg.import(
        "final_target",
        FgTexture::from_imported(target),
        offscreen_desc(256, 256),
    );

    let gbuffer = fg.add_pass::<GBufferData, _, _>(
        "geometry",
        PassType::Graphics,
        |builder, data| {
            data.color = builder.create::<FgTexture>("gbuffer_color", offscreen_desc(256, 256));
            data.color = builder.write(
                data.color,
                ResourceUsage::COLOR_ATTACHMENT | ResourceUsage::SAMPLED,
            );

            let mut desc = FgRenderPassDesc::default();
            desc.color_attachments[0] = data.color;
            desc.clear_flags = AttachmentFlags::COLOR0;
            desc.clear_color = [0.1, 0.2, 0.3, 1.0];
            builder.set_render_pass_desc(desc);
        },
        |_, context| {
            context.command_list.draw(3, 0)?;
            Ok(())
        },
    );

    fg.add_pass::<(), _, _>(
        "composite",
        PassType::Graphics,
        |builder, _| {
            builder.read(gbuffer.color, ResourceUsage::SAMPLED);
            let handle = builder.write(imported, ResourceUsage::COLOR_ATTACHMENT);

            let mut desc = FgRenderPassDesc::default();
            desc.color_attachments[0] = handle;
            desc.clear_flags = AttachmentFlags::COLOR0;
            builder.set_render_pass_desc(desc);
        },
        |_, context| {
            context.command_list.draw(3, 0)?;
            Ok(())
        },
    );

    fg.compile().unwrap();

    let command_list = device.lock().unwrap().create_command_list().unwrap();
    fg.begin(vec![command_list]).unwrap();
    fg.execute().unwrap();
    let commands = fg.end().unwrap();

    {
        let device = device.lock().unwrap();
        let refs: Vec<&dyn nova_3d_engine::nova3d::render::CommandList> =
            commands.iter().map(|c| c.as_ref()).collect();
        device.submit(&refs).unwrap();
        device.wait_idle().unwrap();
    }
}

fn create_offscreen_target(
    device: &Arc<Mutex<nova_3d_engine_renderer_vulkan::nova3d::VulkanGraphicsDevice>>,
) -> Arc<dyn nova_3d_engine::nova3d::render::Texture> {
    device
        .lock()
        .unwrap()
        .create_texture(TextureDesc {
            width: 256,
            height: 256,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::RenderTarget,
            array_layers: 1,
            mip_levels: 1,
            sample_count: 1,
        })
        .unwrap()
}

// ============================================================================
// FULL FRAME TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_integration_full_frame_records_and_submits() {
    let device = get_test_graphics_device();
    let cache = Arc::new(Mutex::new(FrameGraphCache::new()));
    let target = create_offscreen_target(&device);

    run_frame(&device, &cache, target);

    // Transient objects went back to the pools
    let cache = cache.lock().unwrap();
    assert_eq!(cache.in_use_object_count(), 0);
    assert!(cache.free_object_count() > 0);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_integration_pools_survive_across_frames() {
    let device = get_test_graphics_device();
    let cache = Arc::new(Mutex::new(FrameGraphCache::new()));
    let target = create_offscreen_target(&device);

    run_frame(&device, &cache, target.clone());
    let free_after_first = cache.lock().unwrap().free_object_count();

    // Second frame reuses the pooled objects instead of growing the pools
    run_frame(&device, &cache, target.clone());
    assert_eq!(cache.lock().unwrap().free_object_count(), free_after_first);

    // After an update everything evicts and the next frame recreates
    cache.lock().unwrap().update();
    assert_eq!(cache.lock().unwrap().free_object_count(), 0);
    run_frame(&device, &cache, target);
    assert_eq!(cache.lock().unwrap().free_object_count(), free_after_first);

    device.lock().unwrap().wait_idle().unwrap();
}
