use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::error::PersistenceError;

const EXTENSION: &str = "md";

/// Destination for the final edited article.
pub trait ArticleSink {
    /// Writes `text` and returns where it landed.
    fn save(&self, title: &str, text: &str) -> Result<PathBuf, PersistenceError>;
}

/// Writes each article to `<dir>/blog_<YYYYMMDD>_<HHMMSS>.md`, never
/// overwriting an existing file.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save_at(
        &self,
        title: &str,
        text: &str,
        now: DateTime<Local>,
    ) -> Result<PathBuf, PersistenceError> {
        let path = self.dir.join(file_name(now, EXTENSION));
        if !self.dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
                path: self.dir.clone(),
                source,
            })?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(PersistenceError::AlreadyExists { path });
            }
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| PersistenceError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!(title, path = %path.display(), bytes = text.len(), "article saved");
        Ok(path)
    }
}

impl ArticleSink for FileSink {
    fn save(&self, title: &str, text: &str) -> Result<PathBuf, PersistenceError> {
        self.save_at(title, text, Local::now())
    }
}

pub fn file_name(now: DateTime<Local>, extension: &str) -> String {
    format!("blog_{}.{extension}", now.format("%Y%m%d_%H%M%S"))
}
