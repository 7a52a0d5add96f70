use thiserror::Error;

/// Monodef error types
#[derive(Error, Debug)]
pub enum MonodefError {
    /// Instruction argument that does not fit the expected grammar
    #[error("Malformed argument for {instruction}: {argument}")]
    MalformedArgument {
        instruction: String,
        argument: String,
    },

    /// Image reference that does not fit `[namespace/]name[:tag|@digest]`
    #[error("Malformed image reference: {0}")]
    MalformedImageReference(String),

    /// Instruction keyword outside the dispatch table
    #[error("Unknown instruction: {0}")]
    UnknownInstruction(String),

    /// ADD/COPY could not fetch or persist a file
    #[error("File materialization failed for {path}: {message}")]
    FileMaterialization { path: String, message: String },

    /// Path inside an image names a directory, not a file
    #[error("Path is a directory: {0}")]
    PathIsDirectory(String),

    /// Registry or runtime object that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or subprocess transport failure
    #[error("Transport error: {endpoint} - {message}")]
    Transport { endpoint: String, message: String },

    /// An ancestor recorded more than one child
    #[error("Non-linear lineage at {0}")]
    NonLinearLineage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for MonodefError {
    fn from(err: serde_json::Error) -> Self {
        MonodefError::Serialization(err.to_string())
    }
}

/// Result type alias for monodef operations
pub type Result<T> = std::result::Result<T, MonodefError>;
