use crate::data::DailyRecord;
use crate::error::SourceError;
use crate::source::RecordSource;
use chrono::NaiveDate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Record source backed by one JSON file per listing code
///
/// Layout: `<dir>/<code>.json`, each file a JSON array of daily records.
/// A missing file means the code has no stored data (`NotListed`); a file
/// that does not parse is reported as `Corrupt`, never as an empty table.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.json", code))
    }

    /// Write the full table for a code, replacing any existing file
    pub fn store(&self, code: &str, records: &[DailyRecord]) -> Result<(), SourceError> {
        std::fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(records).map_err(|e| SourceError::Corrupt {
            code: code.to_string(),
            reason: e.to_string(),
        })?;

        std::fs::write(self.path_for(code), json)?;
        info!("Stored {} records for {}", records.len(), code);
        Ok(())
    }

    fn read_all(&self, code: &str) -> Result<Vec<DailyRecord>, SourceError> {
        let path = self.path_for(code);

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotListed(code.to_string()));
            }
            Err(e) => return Err(SourceError::Io(e)),
        };

        serde_json::from_str(&contents).map_err(|e| SourceError::Corrupt {
            code: code.to_string(),
            reason: e.to_string(),
        })
    }
}

impl RecordSource for FileSource {
    fn load(&self, code: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyRecord>, SourceError> {
        let mut records: Vec<DailyRecord> = self.read_all(code)?
            .into_iter()
            .filter(|r| r.date >= from && r.date <= to)
            .collect();

        records.sort_by_key(|r| r.date);

        debug!("Loaded {} records for {} ({} to {})", records.len(), code, from, to);
        Ok(records)
    }
}
