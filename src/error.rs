use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("OPENROUTER_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("API request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request error: HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("completion response contained no message content")]
    EmptyCompletion,

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
