use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("failed to acquire GPU context: {0:#}")]
    Context(#[source] anyhow::Error),

    #[error("{stage} shader for variant failed to compile: {message}")]
    Compile {
        stage: &'static str,
        message: String,
    },

    #[error("render instance has been disposed")]
    Disposed,

    #[error("render context is lost")]
    Lost,

    #[error("frame readback failed: {0}")]
    Readback(String),
}
