use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Bot {0} is not initialized")]
    NotInitialized(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Classified reasons a command handler can fail. Each handler maps these to a fixed,
/// user-facing fallback text; the detail string is only ever logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The Content Provider call failed or returned nothing usable.
    #[error("Content generation failed: {0}")]
    Generation(String),

    /// The encyclopedia backend could not be reached or returned garbage.
    #[error("Article lookup failed: {0}")]
    Lookup(String),

    /// The lookup succeeded but matched nothing.
    #[error("Nothing found for: {0}")]
    NotFound(String),

    /// The formatted reply could not be delivered (e.g. rejected markup).
    #[error("Reply delivery failed: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, DbotError>;
