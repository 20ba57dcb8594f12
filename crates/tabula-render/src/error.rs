//! Renderer errors.

/// Errors that can occur while rendering.
///
/// Rendering itself cannot fail; only the output medium can.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
