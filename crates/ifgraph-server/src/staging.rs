//! On-disk staging of uploaded files
//!
//! An upload is written to a uniquely named file in the upload directory,
//! read back for analysis, and removed afterwards. Removal happens on every
//! exit path: explicitly through [`StagedUpload::release`], or on drop.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `data` to a fresh file in `dir`, creating `dir` if needed.
    ///
    /// The staged name keeps the extension of `original_name` so the file
    /// on disk still says what dialect it is.
    pub fn stage(dir: &Path, original_name: &str, data: &[u8]) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let suffix = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(data)?;
        file.flush()?;

        tracing::debug!("Staged {} bytes at {}", data.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged content back from disk.
    pub fn read_to_end(&mut self) -> std::io::Result<Vec<u8>> {
        let handle = self.file.as_file_mut();
        handle.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        handle.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Delete the staged file. A failure is logged, never returned.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!("Removed staged upload {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove staged upload {}: {}", path.display(), e),
        }
    }
}
