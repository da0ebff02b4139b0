use crate::foundation::core::FrameSpan;

/// Convenience result type used across reelwright.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by build and render APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided data (configs, arguments, frame spans).
    #[error("validation error: {0}")]
    Validation(String),

    /// The timeline table breaks the contiguity invariant.
    #[error("timeline error: {message} at frame {frame}")]
    Timeline {
        /// Human-readable description (`gap`, `overlap`, `inverted segment`).
        message: String,
        /// First frame where the invariant is broken.
        frame: u64,
    },

    /// A segment name that is not present in the timeline map.
    #[error("unknown segment '{0}'")]
    UnknownSegment(String),

    /// An action exposes neither a flat curve collection nor a layer collection.
    #[error("unsupported action format for action '{0}'")]
    UnsupportedActionFormat(String),

    /// A layered action could not resolve the binding for a curve owner.
    #[error("binding resolution error in action '{action}': {message}")]
    BindingResolution {
        /// Action name.
        action: String,
        /// What went wrong (missing owner, ambiguous binding).
        message: String,
    },

    /// The external host exited unsuccessfully for a render chunk.
    #[error("host subprocess failed for frames {span}: {message} (command: {command})")]
    Subprocess {
        /// Failing frame span.
        span: FrameSpan,
        /// Rendered command line.
        command: String,
        /// Exit status or spawn failure, plus trimmed stderr.
        message: String,
    },

    /// The static linter found violations.
    #[error("lint failed with {0} violation(s)")]
    Lint(usize),

    /// Errors when serializing or deserializing configuration data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>, frame: u64) -> Self {
        Self::Timeline {
            message: msg.into(),
            frame,
        }
    }

    /// Build a [`ReelError::BindingResolution`] value.
    pub fn binding(action: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::BindingResolution {
            action: action.into(),
            message: msg.into(),
        }
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
