use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignError {
    #[error("Please upload a valid PDF file. (received {0})")]
    UnsupportedMediaType(String),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("Invalid signature image: {0}")]
    InvalidImage(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Nothing to export: load a document and place at least one signature")]
    ExportDisabled,
}

impl SignError {
    /// Message suitable for an alert shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            SignError::UnsupportedMediaType(_) => "Please upload a valid PDF file.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<lopdf::Error> for SignError {
    fn from(e: lopdf::Error) -> Self {
        SignError::Operation(e.to_string())
    }
}
