/// Errors raised by the markup pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum GecError {
    #[error("text is empty after trimming whitespace")]
    EmptyText,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no worker queue has capacity for the request")]
    NoCapacity,

    #[error("worker dropped the request without answering")]
    WorkerGone,

    #[error("grammar engine failed: {0}")]
    Engine(String),

    #[error("could not map corrections onto the original text: {0}")]
    Diff(String),

    #[error("invalid start index({index}) or length({length}); text length={len}")]
    OutOfBounds {
        index: usize,
        length: usize,
        len: usize,
    },

    #[error("{} worker(s) failed to start: {}", .0.len(), .0.join("; "))]
    Startup(Vec<String>),

    #[error("dictionary error: {0}")]
    Dictionary(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GecError>;
