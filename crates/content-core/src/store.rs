use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, info};

use crate::config;
use crate::error::{ContentError, Result};
use crate::types::CompanyContent;

const STORE_FILE: &str = "companies.json";

/// Company content records kept as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn open_default() -> Result<Self> {
        let root = config::config_root().ok_or(ContentError::NoConfigDir)?;
        Ok(Self::at(root.join(STORE_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> Result<Vec<CompanyContent>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn get(&self, id: &str) -> Result<CompanyContent> {
        self.load_all()?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| ContentError::CompanyNotFound(id.to_string()))
    }

    /// Inserts or replaces the record with the same id, stamping
    /// `updated_at`. Returns the stored record.
    pub fn save(&self, record: &CompanyContent) -> Result<CompanyContent> {
        let mut records = self.load_all()?;
        let mut stored = record.clone();
        stored.updated_at = Some(Utc::now().to_rfc3339());
        match records.iter_mut().find(|r| r.id == stored.id) {
            Some(existing) => *existing = stored.clone(),
            None => records.push(stored.clone()),
        }
        self.write(&records)?;
        info!(id = %stored.id, path = %self.path.display(), "company content saved");
        Ok(stored)
    }

    /// Returns whether a record was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut records = self.load_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write(&records)?;
        info!(id, "company content removed");
        Ok(true)
    }

    fn write(&self, records: &[CompanyContent]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        let mut file = fs::File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
