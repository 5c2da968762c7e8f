use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{TextureFormat, TextureUsage};

fn texture_desc(width: u32) -> TextureDesc {
    TextureDesc {
        width,
        height: 128,
        format: TextureFormat::R8G8B8A8_UNORM,
        usage: TextureUsage::RenderTarget,
        array_layers: 1,
        mip_levels: 1,
        sample_count: 1,
    }
}

// ============================================================================
// Allocation and reuse tests
// ============================================================================

#[test]
fn test_allocate_invokes_factory_on_miss() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let handle = pool.allocate(&texture_desc(64), &mut device).unwrap();
    assert_eq!(device.texture_count(), 1);
    assert_eq!(pool.in_use_object_count(), 1);
    assert_eq!(pool.free_object_count(), 0);

    pool.free(handle);
}

#[test]
fn test_free_then_allocate_reuses_object() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let first = pool.allocate(&texture_desc(64), &mut device).unwrap();
    let first_ptr = Arc::as_ptr(&first.resource);
    pool.free(first);

    assert_eq!(pool.free_object_count(), 1);
    assert_eq!(pool.in_use_object_count(), 0);

    let second = pool.allocate(&texture_desc(64), &mut device).unwrap();
    // Same underlying object, no second factory invocation
    assert!(std::ptr::eq(
        Arc::as_ptr(&second.resource),
        first_ptr
    ));
    assert_eq!(device.texture_count(), 1);

    pool.free(second);
}

#[test]
fn test_different_content_hash_never_shares_objects() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let a = pool.allocate(&texture_desc(64), &mut device).unwrap();
    pool.free(a);

    // Different width → different hash → fresh factory invocation
    let b = pool.allocate(&texture_desc(128), &mut device).unwrap();
    assert_eq!(device.texture_count(), 2);
    pool.free(b);
}

#[test]
fn test_object_is_in_exactly_one_pool() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let handle = pool.allocate(&texture_desc(64), &mut device).unwrap();
    assert_eq!(pool.in_use_object_count(), 1);
    assert_eq!(pool.free_object_count(), 0);

    pool.free(handle);
    assert_eq!(pool.in_use_object_count(), 0);
    assert_eq!(pool.free_object_count(), 1);
}

#[test]
fn test_two_concurrent_allocations_of_same_info() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    // No intervening free: the second request must not share the first object
    let a = pool.allocate(&texture_desc(64), &mut device).unwrap();
    let b = pool.allocate(&texture_desc(64), &mut device).unwrap();
    assert!(!Arc::ptr_eq(&a.resource, &b.resource));
    assert_eq!(device.texture_count(), 2);
    assert_eq!(pool.in_use_object_count(), 2);

    pool.free(a);
    pool.free(b);
}

// ============================================================================
// Double-free detection
// ============================================================================

#[test]
#[should_panic(expected = "double free or foreign pool handle")]
fn test_double_free_panics() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let handle = pool.allocate(&texture_desc(64), &mut device).unwrap();
    let duplicate = handle.clone();
    pool.free(handle);
    pool.free(duplicate);
}

// ============================================================================
// Eviction tests
// ============================================================================

#[test]
fn test_update_evicts_all_free_objects() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let a = pool.allocate(&texture_desc(64), &mut device).unwrap();
    let b = pool.allocate(&texture_desc(128), &mut device).unwrap();
    pool.free(a);
    pool.free(b);
    assert_eq!(pool.free_object_count(), 2);

    pool.update();
    assert_eq!(pool.free_object_count(), 0);
    assert_eq!(pool.frame_index(), 1);
}

#[test]
fn test_update_does_not_touch_in_use_objects() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let held = pool.allocate(&texture_desc(64), &mut device).unwrap();
    pool.update();

    assert_eq!(pool.in_use_object_count(), 1);
    pool.free(held);
}

#[test]
fn test_allocate_after_update_invokes_factory_again() {
    let mut device = MockGraphicsDevice::new();
    let mut pool = ResourcePool::new(TextureFactory);

    let first = pool.allocate(&texture_desc(64), &mut device).unwrap();
    pool.free(first);
    pool.update(); // evicts the pooled object

    let second = pool.allocate(&texture_desc(64), &mut device).unwrap();
    assert_eq!(device.texture_count(), 2);
    pool.free(second);
}

// ============================================================================
// FrameGraphCache tests
// ============================================================================

#[test]
fn test_cache_update_advances_all_pools() {
    let mut device = MockGraphicsDevice::new();
    let mut cache = FrameGraphCache::new();

    let texture = cache
        .textures
        .allocate(&texture_desc(64), &mut device)
        .unwrap();
    cache.textures.free(texture);
    assert_eq!(cache.free_object_count(), 1);

    cache.update();
    assert_eq!(cache.free_object_count(), 0);
    assert_eq!(cache.in_use_object_count(), 0);
}

// ============================================================================
// Framebuffer key hashing
// ============================================================================

#[test]
fn test_framebuffer_key_is_stable_for_same_textures() {
    let mut device = MockGraphicsDevice::new();
    let factory = FramebufferFactory;

    let texture = device.create_texture(texture_desc(64)).unwrap();
    let render_pass = device
        .create_render_pass(&RenderPassDesc {
            color_attachments: Vec::new(),
            depth_stencil_attachment: None,
        })
        .unwrap();

    let key = FramebufferKey {
        render_pass: render_pass.clone(),
        attachments: vec![texture.clone()],
        width: 64,
        height: 128,
    };
    let same = FramebufferKey {
        render_pass,
        attachments: vec![texture],
        width: 64,
        height: 128,
    };

    assert_eq!(factory.content_hash(&key), factory.content_hash(&same));
}

#[test]
fn test_framebuffer_key_differs_for_different_textures() {
    let mut device = MockGraphicsDevice::new();
    let factory = FramebufferFactory;

    let render_pass = device
        .create_render_pass(&RenderPassDesc {
            color_attachments: Vec::new(),
            depth_stencil_attachment: None,
        })
        .unwrap();
    let a = device.create_texture(texture_desc(64)).unwrap();
    let b = device.create_texture(texture_desc(64)).unwrap();

    let key_a = FramebufferKey {
        render_pass: render_pass.clone(),
        attachments: vec![a],
        width: 64,
        height: 128,
    };
    let key_b = FramebufferKey {
        render_pass,
        attachments: vec![b],
        width: 64,
        height: 128,
    };

    assert_ne!(factory.content_hash(&key_a), factory.content_hash(&key_b));
}
