/*!
# Nova 3D Engine

Core traits and types for the Nova 3D rendering engine.

This crate provides the platform-agnostic API for 3D rendering using
trait-based dynamic polymorphism. Backend implementations (Vulkan,
Direct3D 12, etc.) live in separate crates and implement the
`graphics_device` traits.

## Architecture

- **GraphicsDevice**: factory trait for creating GPU resources and
  submitting command lists
- **Texture / RenderPass / Framebuffer / RenderTarget / CommandList**:
  backend resource traits
- **FrameGraph**: per-frame declarative pass/resource scheduler with
  dead-pass culling, automatic resource lifetimes, and pooled backend
  object reuse across frames

Backend implementations provide concrete types that implement these
traits.
*/

// Internal modules
mod engine;
mod error;
pub mod frame_graph;
pub mod graphics_device;
pub mod log;

// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, Logger, LogSeverity};
        // Note: engine_* macros are NOT re-exported here - they live at the crate root
    }

    // Render sub-module with the graphics device traits and types
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Frame graph sub-module
    pub mod frame_graph {
        pub use crate::frame_graph::*;
    }
}

// Re-export math library at crate root
pub use glam;
