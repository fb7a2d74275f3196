//! In-memory OPC package.
//!
//! [`OpcPackage`] keeps every member of the archive as raw bytes in its
//! original order. Parts the caller never touches are written back
//! byte-for-byte; only `[Content_Types].xml` is regenerated, and only when a
//! content type was added.

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypeMap;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{PhysMember, PhysPkgReader, PhysPkgWriter};
use crate::ooxml::opc::rel::Relationships;
use std::io::{Read, Seek};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct OpcPackage {
    members: Vec<PhysMember>,
    content_types: ContentTypeMap,
    content_types_dirty: bool,
}

impl OpcPackage {
    /// Open an OPC package from a file.
    ///
    /// # Example
    /// ```no_run
    /// use docfill::ooxml::opc::OpcPackage;
    ///
    /// let pkg = OpcPackage::open("template.docx").unwrap();
    /// let main = pkg.main_document_partname().unwrap();
    /// println!("{} is {:?}", main, pkg.content_type(&main));
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_members(PhysPkgReader::open(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_members(PhysPkgReader::from_bytes(data)?)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_members(PhysPkgReader::from_reader(reader)?)
    }

    fn from_members(members: Vec<PhysMember>) -> Result<Self> {
        let content_types = members
            .iter()
            .find(|m| m.partname.as_str().eq_ignore_ascii_case(CONTENT_TYPES_URI))
            .map(|m| ContentTypeMap::from_xml(&m.blob))
            .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))??;

        Ok(Self {
            members,
            content_types,
            content_types_dirty: false,
        })
    }

    #[inline]
    pub fn contains(&self, partname: &PackURI) -> bool {
        self.find(partname).is_some()
    }

    /// Raw bytes of a part.
    pub fn part_blob(&self, partname: &PackURI) -> Result<&[u8]> {
        self.find(partname)
            .map(|i| self.members[i].blob.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Replace the bytes of a part, appending the part if it is new.
    pub fn set_part_blob(&mut self, partname: &PackURI, blob: Vec<u8>) {
        match self.find(partname) {
            Some(i) => self.members[i].blob = blob,
            None => self.members.push(PhysMember {
                partname: partname.clone(),
                blob,
            }),
        }
    }

    /// Iterate over partnames in archive order.
    pub fn partnames(&self) -> impl Iterator<Item = &PackURI> {
        self.members.iter().map(|m| &m.partname)
    }

    #[inline]
    pub fn content_type(&self, partname: &PackURI) -> Option<&str> {
        self.content_types.content_type(partname)
    }

    /// Register a `Default` content type for an extension if it has none.
    pub fn add_default_content_type(&mut self, ext: &str, content_type: &str) {
        if self.content_types.add_default(ext, content_type) {
            self.content_types_dirty = true;
        }
    }

    /// Relationships whose source is `source` (use `/` for the package).
    ///
    /// A source without a `.rels` part has no relationships.
    pub fn rels_for(&self, source: &PackURI) -> Result<Relationships> {
        let base_uri = source.base_uri();
        match self.find(&source.rels_uri()) {
            Some(i) => Relationships::from_xml(base_uri, &self.members[i].blob),
            None => Ok(Relationships::new(base_uri)),
        }
    }

    pub fn set_rels_for(&mut self, source: &PackURI, rels: &Relationships) {
        self.set_part_blob(&source.rels_uri(), rels.to_xml().into_bytes());
    }

    /// Partname of the main part, the target of the package-level
    /// officeDocument relationship.
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let package = PackURI::from_membername(PACKAGE_URI);
        let rels = self.rels_for(&package)?;
        let rel = rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        rels.target_partname(rel)
    }

    /// First unused partname of the form `{prefix}{n}.{ext}`, counting from 1.
    pub fn next_partname(&self, prefix: &str, ext: &str) -> Result<PackURI> {
        (1..)
            .map(|n| PackURI::new(format!("{}{}.{}", prefix, n, ext)))
            .find(|candidate| match candidate {
                Ok(uri) => !self.contains(uri),
                Err(_) => true,
            })
            .unwrap_or_else(|| Err(format!("No free partname for {}", prefix)))
            .map_err(OpcError::InvalidPackUri)
    }

    /// Serialize the package to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new();
        let content_types_xml = self
            .content_types_dirty
            .then(|| self.content_types.to_xml());

        for member in &self.members {
            let is_content_types = member
                .partname
                .as_str()
                .eq_ignore_ascii_case(CONTENT_TYPES_URI);
            match &content_types_xml {
                Some(xml) if is_content_types => writer.write(&member.partname, xml.as_bytes())?,
                _ => writer.write(&member.partname, &member.blob)?,
            }
        }

        writer.finish()
    }

    /// Write the package to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn find(&self, partname: &PackURI) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.partname.as_str().eq_ignore_ascii_case(partname.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn create_minimal_docx() -> Vec<u8> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#).unwrap();

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_minimal_package() {
        let pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        let main = pkg.main_document_partname().unwrap();

        assert_eq!(main.as_str(), "/word/document.xml");
        assert_eq!(pkg.content_type(&main), Some(ct::WML_DOCUMENT_MAIN));
        assert!(pkg.rels_for(&main).unwrap().is_empty());
    }

    #[test]
    fn test_add_media_part() {
        let mut pkg = OpcPackage::from_bytes(&create_minimal_docx()).unwrap();
        let main = pkg.main_document_partname().unwrap();

        let media = pkg.next_partname("/word/media/image", "png").unwrap();
        assert_eq!(media.as_str(), "/word/media/image1.png");
        pkg.set_part_blob(&media, vec![1, 2, 3]);
        pkg.add_default_content_type("png", ct::PNG);
        assert_eq!(
            pkg.next_partname("/word/media/image", "png").unwrap().as_str(),
            "/word/media/image2.png"
        );

        let mut rels = pkg.rels_for(&main).unwrap();
        let r_id = rels.get_or_add(
            relationship_type::IMAGE,
            &media.relative_ref(main.base_uri()),
        );
        pkg.set_rels_for(&main, &rels);

        let reopened = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.part_blob(&media).unwrap(), &[1, 2, 3]);
        assert_eq!(reopened.content_type(&media), Some(ct::PNG));

        let rels = reopened.rels_for(&main).unwrap();
        let rel = rels.get(&r_id).unwrap();
        assert_eq!(rels.target_partname(rel).unwrap(), media);
    }

    #[test]
    fn test_missing_content_types() {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(matches!(
            OpcPackage::from_bytes(&bytes),
            Err(OpcError::PartNotFound(_))
        ));
    }
}
