use axum::http::StatusCode;
use thiserror::Error;

/// Faults that can occur while turning a remote PDF into text.
///
/// The `Display` impl of each variant is exactly the `error` string the
/// caller sees in the JSON envelope.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The caller supplied no file location in the query string or body.
    #[error("Missing fileURL parameter")]
    MissingFileUrl,

    /// The remote server answered, but with a non-success status.
    /// All upstream statuses collapse into one fixed client-facing message;
    /// the actual status is kept for logging only.
    #[error("Unable to fetch file from provided URL")]
    UpstreamRejected { status: u16 },

    #[error("invalid file URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure while talking to the remote server
    /// (DNS, connect, timeout, broken body stream).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("file of {size} bytes exceeds the {limit} byte download limit")]
    TooLarge { size: usize, limit: usize },

    /// The downloaded bytes could not be parsed as a PDF.
    #[error("{0}")]
    PdfParse(#[from] pdf_extract::OutputError),

    /// pdf-extract panics on some malformed inputs; the panic payload is
    /// carried here instead of unwinding through the handler.
    #[error("PDF parsing failed: {reason}")]
    PdfPanic { reason: String },
}

impl ServiceError {
    /// Maps each fault onto one of the two error response states.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingFileUrl | ServiceError::UpstreamRejected { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::InvalidUrl(_)
            | ServiceError::Transport(_)
            | ServiceError::TooLarge { .. }
            | ServiceError::PdfParse(_)
            | ServiceError::PdfPanic { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
