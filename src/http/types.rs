use serde::{Deserialize, Serialize};

/// JSON envelope returned by the extract route in every outcome.
///
/// A success carries `text` (possibly empty) and no `error`; a failure
/// carries `error` and no `text`. There is never a partial result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: None,
            error: Some(message.into()),
        }
    }
}

/// Query-string parameters of the extract route.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractQuery {
    #[serde(rename = "fileURL")]
    pub file_url: Option<String>,
}

/// JSON request body of the extract route.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractBody {
    #[serde(rename = "fileURL")]
    pub file_url: Option<String>,
}
