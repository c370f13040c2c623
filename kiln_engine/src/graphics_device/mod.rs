/// Graphics device module - GPU backend trait and the RAII objects built on it

pub mod graphics_device;
pub mod buffer;
pub mod vertex_layout;
pub mod draw_object;

// Headless backend, public so integration tests and downstream crates can
// run the engine without a GPU
pub mod mock_graphics_device;

pub use graphics_device::*;
pub use buffer::*;
pub use vertex_layout::*;
pub use draw_object::*;
