use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ExploraError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Transcript store error: {0}")]
    Transcript(String),

    #[error("Prompt rendering failed: {0}")]
    Prompt(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExploraResult<T> = Result<T, ExploraError>;

/// Raised while turning a parsed document into events. Only ever ends the current
/// parse cycle, never the stream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("{field} is not a list")]
    NotAList { field: &'static str },

    #[error("topic record {index} is not an object")]
    TopicNotObject { index: usize },

    #[error("question record {index} is not an object")]
    QuestionNotObject { index: usize },
}
