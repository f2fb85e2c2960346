/// Convenience result type used across animaker.
pub type AnimResult<T> = Result<T, AnimError>;

/// Top-level error taxonomy used by the build pipeline.
///
/// `RenderContract`, `Save`, `Worker` and `Codec` are job-level: they are captured on the job's
/// result and never abort a run. `Config` and `Encode` propagate to the caller.
#[derive(thiserror::Error, Debug)]
pub enum AnimError {
    /// Missing or invalid startup configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The render callback returned no figure, or an unusable one.
    #[error("render contract error: {0}")]
    RenderContract(String),

    /// Filesystem failure while persisting an image.
    #[error("save error: {0}")]
    Save(String),

    /// Any other failure inside a job (panicking callback, lost result, ...).
    #[error("worker error: {0}")]
    Worker(String),

    /// Payload compression or decompression failure.
    #[error("codec error: {0}")]
    Codec(String),

    /// The external video encoder failed or exited with a non-zero status.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing configs and reports.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimError {
    /// Build an [`AnimError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an [`AnimError::RenderContract`] value.
    pub fn render_contract(msg: impl Into<String>) -> Self {
        Self::RenderContract(msg.into())
    }

    /// Build an [`AnimError::Save`] value.
    pub fn save(msg: impl Into<String>) -> Self {
        Self::Save(msg.into())
    }

    /// Build an [`AnimError::Worker`] value.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }

    /// Build an [`AnimError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Build an [`AnimError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`AnimError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors that are isolated to a single job.
    pub fn is_job_level(&self) -> bool {
        matches!(
            self,
            Self::RenderContract(_) | Self::Save(_) | Self::Worker(_) | Self::Codec(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
