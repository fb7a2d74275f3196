//! Packing generated documents into a single ZIP archive.

use crate::common::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write every regular file directly inside `dir` into a deflated ZIP at
/// `dest`, stored under its file name. Subfolders are not included.
///
/// Entries are added in file-name order. Returns the number of files packed.
pub fn zip_directory(dir: &Path, dest: &Path) -> Result<usize> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| Error::at_path(dir, e))? {
        let path = entry.map_err(|e| Error::at_path(dir, e))?.path();
        if path.is_file() && path != dest {
            files.push(path);
        }
    }
    files.sort();

    let out = File::create(dest).map_err(|e| Error::at_path(dest, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(path).map_err(|e| Error::at_path(path, e))?;
        zip.start_file(name, options)?;
        zip.write_all(&data)?;
    }

    let mut writer = zip.finish()?;
    writer.flush().map_err(|e| Error::at_path(dest, e))?;

    tracing::debug!(files = files.len(), archive = %dest.display(), "Archive written");
    Ok(files.len())
}
