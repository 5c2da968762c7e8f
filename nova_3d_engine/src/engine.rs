/// Nova3D Engine - Singleton manager for engine subsystems
///
/// Provides global singleton management for graphics devices and the
/// frame graph resource caches, plus the engine logger. Uses
/// thread-safe static storage (OnceLock + RwLock).

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::frame_graph::FrameGraphCache;
use crate::graphics_device::GraphicsDevice;
use crate::log::{DefaultLogger, LogEntry, Logger, LogSeverity};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Named graphics devices (e.g. "main")
    graphics_devices: RwLock<FxHashMap<String, Arc<Mutex<dyn GraphicsDevice>>>>,
    /// Frame graph resource caches, one per graphics device, same key
    frame_graph_caches: RwLock<FxHashMap<String, Arc<Mutex<FrameGraphCache>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            graphics_devices: RwLock::new(FxHashMap::default()),
            frame_graph_caches: RwLock::new(FxHashMap::default()),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of engine subsystems (graphics devices, frame
/// graph caches) using a singleton pattern with thread-safe access.
///
/// # Example
///
/// ```no_run
/// use nova_3d_engine::nova3d::Engine;
/// use nova_3d_engine::nova3d::render::Config;
/// use nova_3d_engine_renderer_vulkan::nova3d::VulkanGraphicsDevice;
///
/// Engine::initialize()?;
/// let device = VulkanGraphicsDevice::new_headless(Config::default())?;
/// Engine::create_graphics_device("main", device)?;
/// Engine::create_frame_graph_cache("main")?;
///
/// let device = Engine::graphics_device("main")?;
/// let cache = Engine::frame_graph_cache("main")?;
/// // build and run frame graphs against device + cache...
///
/// Engine::shutdown();
/// # Ok::<(), nova_3d_engine::nova3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("nova3d::Engine", "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })
    }

    /// Initialize the engine
    ///
    /// Must be called once at application startup before creating any
    /// subsystems.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the entire engine and destroy all singletons
    ///
    /// Frame graph caches are cleared before graphics devices, since
    /// pooled objects reference GPU state owned by their device.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut caches) = state.frame_graph_caches.write() {
                caches.clear();
            }
            if let Ok(mut devices) = state.graphics_devices.write() {
                devices.clear();
            }
        }
    }

    // ===== GRAPHICS DEVICE API =====

    /// Create and register a named graphics device singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or a device
    /// with the same name already exists.
    pub fn create_graphics_device<D: GraphicsDevice + 'static>(
        name: &str,
        device: D,
    ) -> Result<()> {
        let state = Self::state()?;
        let mut devices = state.graphics_devices.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Graphics device registry lock poisoned".to_string(),
            ))
        })?;

        if devices.contains_key(name) {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                format!("Graphics device '{}' already exists", name),
            )));
        }

        devices.insert(name.to_string(), Arc::new(Mutex::new(device)));
        crate::engine_info!("nova3d::Engine", "Graphics device '{}' created", name);
        Ok(())
    }

    /// Get a named graphics device
    pub fn graphics_device(name: &str) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let state = Self::state()?;
        let devices = state.graphics_devices.read().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Graphics device registry lock poisoned".to_string(),
            ))
        })?;

        devices.get(name).cloned().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(format!(
                "Graphics device '{}' not created. Call Engine::create_graphics_device() first.",
                name
            )))
        })
    }

    /// Destroy a named graphics device
    ///
    /// Existing references remain valid until dropped.
    pub fn destroy_graphics_device(name: &str) -> Result<()> {
        let state = Self::state()?;
        let mut devices = state.graphics_devices.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Graphics device registry lock poisoned".to_string(),
            ))
        })?;

        if devices.remove(name).is_none() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                format!("Graphics device '{}' does not exist", name),
            )));
        }
        crate::engine_info!("nova3d::Engine", "Graphics device '{}' destroyed", name);
        Ok(())
    }

    /// Number of registered graphics devices
    pub fn graphics_device_count() -> usize {
        ENGINE_STATE
            .get()
            .and_then(|state| state.graphics_devices.read().ok())
            .map(|devices| devices.len())
            .unwrap_or(0)
    }

    // ===== FRAME GRAPH CACHE API =====

    /// Create the frame graph resource cache for a named graphics
    /// device. The cache outlives individual frame graphs and carries
    /// pooled backend objects across frames.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized, the device
    /// does not exist, or a cache for it already exists.
    pub fn create_frame_graph_cache(name: &str) -> Result<()> {
        let state = Self::state()?;

        // The cache is bound to a device; require it first
        {
            let devices = state.graphics_devices.read().map_err(|_| {
                Self::log_and_return_error(Error::BackendError(
                    "Graphics device registry lock poisoned".to_string(),
                ))
            })?;
            if !devices.contains_key(name) {
                return Err(Self::log_and_return_error(Error::InitializationFailed(
                    format!(
                        "Cannot create frame graph cache: graphics device '{}' does not exist",
                        name
                    ),
                )));
            }
        }

        let mut caches = state.frame_graph_caches.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Frame graph cache registry lock poisoned".to_string(),
            ))
        })?;

        if caches.contains_key(name) {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                format!("Frame graph cache '{}' already exists", name),
            )));
        }

        caches.insert(name.to_string(), Arc::new(Mutex::new(FrameGraphCache::new())));
        crate::engine_info!("nova3d::Engine", "Frame graph cache '{}' created", name);
        Ok(())
    }

    /// Get the frame graph cache of a named graphics device
    pub fn frame_graph_cache(name: &str) -> Result<Arc<Mutex<FrameGraphCache>>> {
        let state = Self::state()?;
        let caches = state.frame_graph_caches.read().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Frame graph cache registry lock poisoned".to_string(),
            ))
        })?;

        caches.get(name).cloned().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(format!(
                "Frame graph cache '{}' not created. Call Engine::create_frame_graph_cache() first.",
                name
            )))
        })
    }

    /// Destroy the frame graph cache of a named graphics device
    pub fn destroy_frame_graph_cache(name: &str) -> Result<()> {
        let state = Self::state()?;
        let mut caches = state.frame_graph_caches.write().map_err(|_| {
            Self::log_and_return_error(Error::BackendError(
                "Frame graph cache registry lock poisoned".to_string(),
            ))
        })?;

        if caches.remove(name).is_none() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                format!("Frame graph cache '{}' does not exist", name),
            )));
        }
        crate::engine_info!("nova3d::Engine", "Frame graph cache '{}' destroyed", name);
        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut caches) = state.frame_graph_caches.write() {
                caches.clear();
            }
            if let Ok(mut devices) = state.graphics_devices.write() {
                devices.clear();
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation
    /// (file logger, test capture, etc.)
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to the default colored console logger
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by the engine_trace!/engine_debug!/engine_info!/engine_warn!
    /// macros.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information
    ///
    /// Used by the engine_error! macro to include the source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
