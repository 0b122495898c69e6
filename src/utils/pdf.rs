use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::info;

use crate::error::ServiceError;

/// Returns true if the content-type or head bytes indicate a PDF file.
/// - Content-Type: application/pdf (case-insensitive, substring match)
/// - Magic bytes: %PDF-
pub fn is_pdf(content_type: Option<&str>, head: &[u8]) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    ct.contains("application/pdf") || head.starts_with(b"%PDF-")
}

/// Extracts the embedded text of a PDF held fully in memory, with
/// surrounding whitespace removed. A PDF without a text layer yields an
/// empty string, which is not a fault.
///
/// pdf-extract panics on some malformed inputs, so the call runs under
/// `catch_unwind` and a panic is reported as a parse fault.
pub fn extract_trimmed_text(bytes: &[u8]) -> Result<String, ServiceError> {
    let started = std::time::Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    match outcome {
        Ok(Ok(text)) => {
            info!(
                target: "pdf",
                elapsed_ms = started.elapsed().as_millis() as u64,
                len = text.len(),
                "PDF extraction succeeded"
            );
            Ok(text.trim().to_string())
        }
        Ok(Err(err)) => Err(ServiceError::PdfParse(err)),
        Err(panic) => Err(ServiceError::PdfPanic {
            reason: panic_message(panic),
        }),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "parser panicked without a message".to_string()
    }
}
