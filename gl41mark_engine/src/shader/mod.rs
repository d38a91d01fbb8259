/// Shader module - program building and shader text collaborators

pub mod program;
pub mod rewriter;
pub mod sources;

pub use program::*;
pub use rewriter::*;
