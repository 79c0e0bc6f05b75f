use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlitchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image loading error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Report generation failed: {0}")]
    Report(String),
}

pub type Result<T> = std::result::Result<T, GlitchError>;
