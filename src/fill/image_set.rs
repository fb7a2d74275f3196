//! Per-document image lists.

use crate::common::error::{Error, Result};
use std::path::{Path, PathBuf};

/// File extensions accepted as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where a document's images come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// One folder shared by every document.
    Flat(PathBuf),
    /// One subfolder per document, named after its base name.
    PerDocument(PathBuf),
}

impl ImageSource {
    /// Folder holding the images for `base_name`.
    pub fn folder_for(&self, base_name: &str) -> PathBuf {
        match self {
            ImageSource::Flat(dir) => dir.clone(),
            ImageSource::PerDocument(root) => root.join(base_name),
        }
    }

    /// Resolve the image set of one document; `Ok(None)` when its folder
    /// does not exist.
    pub fn resolve(&self, base_name: &str) -> Result<Option<ImageSet>> {
        let folder = self.folder_for(base_name);
        if !folder.is_dir() {
            return Ok(None);
        }
        ImageSet::from_dir(&folder).map(Some)
    }
}

/// Image files of one document, sorted by file name; position = image index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSet {
    paths: Vec<PathBuf>,
}

impl ImageSet {
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Self { paths }
    }

    /// Collect the image files directly inside `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::at_path(dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::at_path(dir, e))?.path();
            if path.is_file() && is_image_file(&path) {
                paths.push(path);
            }
        }
        Ok(Self::new(paths))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
