use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveCopyError {
    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("drive api responded with {status}: {body}")]
    Api { status: u16, body: String },

    #[error("{0}: no owners recorded")]
    NoOwners(String),

    #[error("{0}: folder reached twice on the same path")]
    Cycle(String),

    #[error("{0}")]
    Config(String),

    #[error("no access token; set DRIVE_ACCESS_TOKEN or access_token in the config file")]
    MissingToken,
}
