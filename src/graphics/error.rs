//! Error taxonomy for the GDI engine.
//!
//! Every variant has a fixed negative code so the C bridge can report it
//! without a separate error channel.

use super::types::{HGdiObj, Hdc};

/// Which fixed-capacity table ran out of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    DeviceContext,
    Object,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::DeviceContext => write!(f, "device-context"),
            TableKind::Object => write!(f, "object"),
        }
    }
}

/// Errors reported by [`GdiContext`](super::context::GdiContext) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GdiError {
    #[error("required argument was not supplied")]
    NullArgument,

    #[error("GDI context is not initialized")]
    NotInitialized,

    #[error("{table} table is full")]
    CapacityExceeded { table: TableKind },

    #[error("handle {handle} does not refer to a live entry")]
    NotFound { handle: u16 },

    #[error("handle is the null sentinel")]
    BadHandle,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to allocate {bytes} bytes of pixel storage")]
    OutOfMemory { bytes: usize },
}

impl GdiError {
    pub const CODE_NULL_ARGUMENT: i32 = -1;
    pub const CODE_NOT_INITIALIZED: i32 = -2;
    pub const CODE_CAPACITY_EXCEEDED: i32 = -3;
    pub const CODE_NOT_FOUND: i32 = -4;
    pub const CODE_BAD_HANDLE: i32 = -5;
    pub const CODE_INVALID_ARGUMENT: i32 = -6;
    pub const CODE_OUT_OF_MEMORY: i32 = -7;

    /// Stable negative code for the C interface.
    pub fn code(&self) -> i32 {
        match self {
            GdiError::NullArgument => Self::CODE_NULL_ARGUMENT,
            GdiError::NotInitialized => Self::CODE_NOT_INITIALIZED,
            GdiError::CapacityExceeded { .. } => Self::CODE_CAPACITY_EXCEEDED,
            GdiError::NotFound { .. } => Self::CODE_NOT_FOUND,
            GdiError::BadHandle => Self::CODE_BAD_HANDLE,
            GdiError::InvalidArgument(_) => Self::CODE_INVALID_ARGUMENT,
            GdiError::OutOfMemory { .. } => Self::CODE_OUT_OF_MEMORY,
        }
    }

    pub(crate) fn dc_not_found(hdc: Hdc) -> Self {
        GdiError::NotFound { handle: hdc.0 }
    }

    pub(crate) fn object_not_found(handle: HGdiObj) -> Self {
        GdiError::NotFound { handle: handle.0 }
    }
}

pub type GdiResult<T> = Result<T, GdiError>;
