//! Error types for the gl41mark engine
//!
//! Failures that can surface from `load()` and `setup()`. Transient GPU stalls
//! and buffer map problems are recovered locally and never reach this type.

use std::fmt;

/// Result type for gl41mark engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// gl41mark engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required entry point or context feature is absent
    CapabilityMissing(String),

    /// Shader compilation or program linking failed
    CompileOrLinkFailure(String),

    /// An attribute, uniform or uniform block was not found in a linked program
    MissingBinding(String),

    /// A creation call returned the "not allocated" sentinel
    ResourceAllocationFailure(String),

    /// Operation not valid in the current lifecycle state
    InvalidState(String),

    /// Backend-specific error (driver, loader, etc.)
    BackendError(String),

    /// Initialization failed (context, backend)
    InitializationFailed(String),
}

impl Error {
    /// True for errors that mean "skip this scene" rather than "scene is broken"
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::CapabilityMissing(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapabilityMissing(msg) => write!(f, "Capability missing: {}", msg),
            Error::CompileOrLinkFailure(msg) => write!(f, "Compile/link failure: {}", msg),
            Error::MissingBinding(msg) => write!(f, "Missing binding: {}", msg),
            Error::ResourceAllocationFailure(msg) => write!(f, "Resource allocation failure: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error through the engine logger and build the matching `Error`
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("gl41mark::scene::mrt", MissingBinding,
///     "missing vertex attribute '{}'", "position");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::gl41mark::Error::$variant(message)
    }};
}

/// Log an error and return it from the enclosing function
///
/// # Example
///
/// ```ignore
/// engine_bail!("gl41mark::scene::mrt", ResourceAllocationFailure,
///     "FBO incomplete (0x{:x})", status);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
