use expense_core::{chain::ChainStore, Block, LedgerError, Result};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::debug;

/// Keeps the whole chain as one pretty-printed JSON array of blocks.
///
/// Saves go to a temporary file beside the target which is synced and then
/// renamed over it, so readers only ever see the old or the new document.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encode(chain: &[Block]) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(chain)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// `Ok(None)` for an empty or whitespace-only document.
    pub fn decode(bytes: &[u8], location: &str) -> Result<Option<Vec<Block>>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice::<Vec<Block>>(bytes)
            .map(Some)
            .map_err(|e| LedgerError::corrupt(location, e))
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        // Make the rename itself durable.
        #[cfg(unix)]
        fs::File::open(dir)?.sync_all()?;
        Ok(())
    }
}

impl ChainStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<Block>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LedgerError::persistence(self.location(), e)),
        };
        Self::decode(&bytes, &self.location())
    }

    fn save(&self, chain: &[Block]) -> Result<()> {
        let bytes = Self::encode(chain)?;
        self.write_atomic(&bytes)
            .map_err(|e| LedgerError::persistence(self.location(), e))?;
        debug!(path = %self.path.display(), blocks = chain.len(), bytes = bytes.len(), "ledger saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
