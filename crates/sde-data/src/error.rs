use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdeError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transient upstream error: {0}")]
    TransientUpstream(#[from] reqwest::Error),

    #[error("zip archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("checksum manifest is missing an entry for {0}")]
    ManifestEntryMissing(String),

    #[error("unknown family: {0}")]
    UnknownFamily(String),

    #[error("family not loaded: {0}")]
    FamilyNotLoaded(String),

    #[error("{0}")]
    Fatal(String),
}

impl SdeError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SdeError::TransientUpstream(_))
    }
}
