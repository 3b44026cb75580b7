use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid settings, options, or template geometry. Raised before any drawing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Records and boxes disagree between the layout pass and the paint pass.
    #[error("layout inconsistency: {0}")]
    LayoutInconsistency(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the offending path to NotFound/PermissionDenied errors so the message is actionable.
    pub(crate) fn io_at(e: std::io::Error, path: &std::path::Path) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        }
    }
}
