//! Physical (ZIP) layer of an OPC package.
//!
//! The reader inflates every member up front; Office packages are small and
//! the document layer needs random access to parts while it rewrites them.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A member read from the archive.
#[derive(Debug, Clone)]
pub struct PhysMember {
    pub partname: PackURI,
    pub blob: Vec<u8>,
}

/// Reads all file members of a ZIP-based OPC package, in archive order.
pub struct PhysPkgReader;

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Vec<PhysMember>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }

        let data = std::fs::read(path)?;
        Self::from_reader(Cursor::new(data))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Vec<PhysMember>> {
        Self::from_reader(Cursor::new(data))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Vec<PhysMember>> {
        let mut archive = ZipArchive::new(reader)?;
        let mut members = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let partname = PackURI::from_membername(file.name());
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.push(PhysMember { partname, blob });
        }

        Ok(members)
    }
}

/// Writes parts into a new in-memory ZIP archive.
pub struct PhysPkgWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    /// Write a part to the archive under its member name.
    pub fn write(&mut self, partname: &PackURI, blob: &[u8]) -> Result<()> {
        self.writer.start_file(partname.membername(), self.options)?;
        self.writer.write_all(blob)?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
