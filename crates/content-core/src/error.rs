use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Editor not ready")]
    EditorNotReady,
    #[error("No headings found; nothing to generate")]
    NoHeadings,
    #[error("Sidebar item {0} not found")]
    SidebarItemNotFound(u32),
    #[error("Heading level {0} is out of range (expected 1-3)")]
    InvalidLevel(u8),
    #[error("Company '{0}' not found")]
    CompanyNotFound(String),
    #[error("No configuration directory available")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ContentError>;
