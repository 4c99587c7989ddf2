use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetwizError {
    #[error("No template matches '{0}'")]
    TemplateNotFound(String),

    #[error("Template id '{0}' is ambiguous ({1} matches)")]
    TemplateAmbiguous(String, usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SheetwizError>;
