use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("GitHub returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("could not decode file contents: {0}")]
    Decode(String),

    #[error("package catalog has unsupported shape: {0}")]
    Catalog(String),

    #[error("invalid {field} timestamp '{value}': expected %Y-%m-%dT%H:%M:%SZ")]
    IssueDate { field: &'static str, value: String },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
