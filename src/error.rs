use std::path::PathBuf;

use crate::pipeline::Step;

/// Failure of a single call to the text-generation service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Network failure or timeout talking to the service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("generation API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered but carried no usable text.
    #[error("generation response has no content")]
    EmptyResponse,

    /// The response body could not be decoded.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::MalformedResponse(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("missing `{{` in model output")]
    MissingOpenBrace,
    #[error("missing `}}` in model output")]
    MissingCloseBrace,
    #[error("invalid json object span")]
    InvalidSpan,
}

/// Any failure between issuing a structured request and holding a parsed value.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("extract json object: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("parse json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("score response has no numeric metrics")]
    NoMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("section index {index} is out of range (structure has {len} sections)")]
    SectionOutOfRange { index: usize, len: usize },
    #[error("serialize structure: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("article part is missing: {0}")]
    MissingPart(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("output already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },
    #[error("write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation failures surfaced to the caller of the pipeline controller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("a keyword is required")]
    KeywordRequired,

    #[error("no title candidates were generated; try another keyword")]
    NoTitleCandidates {
        #[source]
        source: Option<GenerationError>,
    },

    #[error("a title must be selected first")]
    TitleSelectionRequired,

    #[error("title {index} is out of range ({count} candidates)")]
    TitleOutOfRange { index: usize, count: usize },

    #[error("operation requires step {expected} but the pipeline is at step {actual}")]
    WrongStep { expected: Step, actual: Step },

    #[error("the outline has no sections")]
    EmptyOutline,

    #[error("the article text is empty")]
    EmptyArticle,

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
