use std::time::Duration;

use crate::scene::{MaterialId, ObjectId};
use crate::timeline::Access;

/// Result alias that carries the custom [`OrreryError`] type.
pub type Result<T> = std::result::Result<T, OrreryError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum OrreryError {
    /// Parameters handed to an updater binding were rejected at construction.
    #[error("invalid binding: {0}")]
    InvalidBinding(String),
    /// Clock and refresh intervals must be strictly positive.
    #[error("interval must be greater than zero")]
    InvalidInterval,
    #[error("scene graph has no object {0}")]
    UnknownObject(ObjectId),
    #[error("scene graph has no material {0}")]
    UnknownMaterial(MaterialId),
    #[error("material {0} has no time parameter to animate")]
    MissingTimeParameter(MaterialId),
    /// A listener would write a property that an earlier listener already
    /// reads, so the reader would observe last tick's value.
    #[error("listener `{writer}` writes the {access} which `{reader}` reads earlier in the tick")]
    OrderingViolation {
        writer: String,
        reader: String,
        access: Access,
    },
    #[error("listener `{listener}` was built for {expected:?} ticks but the clock ticks every {actual:?}")]
    IntervalMismatch {
        listener: String,
        expected: Duration,
        actual: Duration,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("render failed: {0}")]
    Render(String),
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl OrreryError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn binding<T: Into<String>>(reason: T) -> Self {
        Self::InvalidBinding(reason.into())
    }
}
