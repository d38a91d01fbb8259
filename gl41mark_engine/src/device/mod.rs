/// Device module - GL abstraction consumed by every scene

// Module declarations
pub mod handles;
pub mod types;
pub mod gl_device;

// Re-export everything
pub use handles::*;
pub use types::*;
pub use gl_device::*;

// Mock GL device for tests (no GPU required)
#[cfg(test)]
pub mod mock_gl_device;
