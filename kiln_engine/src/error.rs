//! Error types for the Kiln engine
//!
//! This module defines the error type shared by the GPU device layer, the
//! resource caches and the scene loader, plus two helper macros that log an
//! error before handing it back to the caller.

use std::fmt;

/// Result type for Kiln engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kiln engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend rejected an operation (bad handle, compile failure, ...)
    BackendError(String),

    /// The backend ran out of GPU handles or memory
    OutOfMemory,

    /// Constructor input is malformed (bad vertex data, bad layout, ...)
    InvalidResource(String),

    /// `get` was called for a key that was never loaded
    ResourceNotFound(String),

    /// `load` was called for a key that is already cached
    DuplicateResource(String),

    /// Two different keys hashed to the same cache id
    KeyCollision {
        /// Key that was requested
        requested: String,
        /// Key already stored under the same id
        existing: String,
    },

    /// The scene importer could not produce a usable scene tree
    ImportFailed(String),

    /// File system error while reading a resource source
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::ResourceNotFound(key) => write!(f, "Resource not found: {}", key),
            Error::DuplicateResource(key) => write!(f, "Resource already loaded: {}", key),
            Error::KeyCollision { requested, existing } => write!(
                f,
                "Resource key collision: '{}' hashes to the same id as '{}'",
                requested, existing
            ),
            Error::ImportFailed(msg) => write!(f, "Import failed: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

// ===== ERROR MACROS =====

/// Log an ERROR and return early with `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// # use kiln_engine::engine_bail;
/// # fn f(count: u32) -> kiln_engine::kiln::Result<()> {
/// if count == 0 {
///     engine_bail!("kiln::DrawObject", "Layout must have at least one attribute");
/// }
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        return Err($crate::kiln::Error::BackendError(message));
    }};
}

/// Log an ERROR and evaluate to an `Error::BackendError`
///
/// Meant for `ok_or_else` chains where an early return is not possible.
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::kiln::Error::BackendError(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
