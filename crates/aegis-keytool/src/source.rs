//! Tenant seeds read from a directory of key files.

use aegis_keys::{KeyError, KeySource};
use async_trait::async_trait;
use std::{io, path::PathBuf};
use tracing::debug;

/// Reads `<dir>/<id>.keys`: one hex seed per line, active first.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.keys"))
    }
}

#[async_trait]
impl KeySource for DirSource {
    async fn fetch(&self, id: &str) -> aegis_keys::Result<Vec<Vec<u8>>> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(KeyError::NotFound(id.to_string()));
        }

        let path = self.path_of(id);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(KeyError::NotFound(id.to_string()))
            }
            Err(e) => return Err(KeyError::from_source(id, e)),
        };

        let keys = parse_key_file(&text).map_err(|e| KeyError::from_source(id, e))?;
        if keys.is_empty() {
            return Err(KeyError::NotFound(id.to_string()));
        }
        debug!(id, path = %path.display(), keys = keys.len(), "Read key file");
        Ok(keys)
    }
}

/// One hex seed per line
pub fn parse_key_file(text: &str) -> Result<Vec<Vec<u8>>, hex::FromHexError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(hex::decode)
        .collect()
}
