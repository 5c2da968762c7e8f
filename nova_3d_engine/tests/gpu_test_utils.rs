#![allow(dead_code)]
//! GPU test utilities - shared headless Vulkan device for integration tests
//!
//! Provides a global VulkanGraphicsDevice instance shared across all GPU
//! tests. Creating one device per test would be slow and some drivers
//! dislike many instances in one process; a single shared device also
//! matches real-world usage (one device per app).

use nova_3d_engine::nova3d::render::Config;
use nova_3d_engine_renderer_vulkan::nova3d::VulkanGraphicsDevice;
use std::sync::{Arc, Mutex, OnceLock};

/// Global VulkanGraphicsDevice instance (initialized once)
static GPU_DEVICE: OnceLock<Arc<Mutex<VulkanGraphicsDevice>>> = OnceLock::new();

/// Get the shared headless VulkanGraphicsDevice for GPU tests
///
/// Lazily initializes the device on first call. All subsequent calls
/// return a clone of the same `Arc<Mutex<VulkanGraphicsDevice>>`.
pub fn get_test_graphics_device() -> Arc<Mutex<VulkanGraphicsDevice>> {
    GPU_DEVICE
        .get_or_init(|| {
            let device = VulkanGraphicsDevice::new_headless(Config {
                app_name: "Nova3D GPU Tests".to_string(),
                ..Config::default()
            })
            .expect("Failed to create headless VulkanGraphicsDevice for tests");
            Arc::new(Mutex::new(device))
        })
        .clone()
}
