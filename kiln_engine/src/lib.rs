/*!
# Kiln Engine

Resource caching and scene loading for a small OpenGL-style renderer.

Models are imported into a `SceneTree`, then loaded into shared, reference
counted `MeshNode` trees whose meshes, materials and textures live in keyed
caches owned by a `ResourceManager`. GPU objects are created and released
through the `GraphicsDevice` trait, so the whole crate also runs headless on
`MockGraphicsDevice`.

## Architecture

- **GraphicsDevice**: Backend trait for buffers, vertex arrays, textures and programs
- **ResourceCache**: Keyed store handing out `Arc` references to its entries
- **ResourceManager**: Owns one cache per resource kind and the device
- **SceneImporter**: Parses a model file into a `SceneTree`
- **SceneLoader**: Builds and caches the resource graph of an imported scene
*/

// Internal modules
mod error;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod scene;

// Main kiln namespace module
pub mod kiln {
    // Error types
    pub use crate::error::{Error, Result};

    // Resource owner
    pub use crate::resource::ResourceManager;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Graphics device sub-module
    pub mod device {
        pub use crate::graphics_device::*;
        pub use crate::graphics_device::mock_graphics_device::{
            HandleKind, MockCommand, MockGraphicsDevice,
        };
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
