//! Package implementation for Word documents.

use crate::common::unit::Length;
use crate::ooxml::docx::document::Document;
use crate::ooxml::docx::image::{Picture, inline_picture_run};
use crate::ooxml::docx::tree::Element;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

/// Partname prefix for embedded pictures.
const MEDIA_PREFIX: &str = "/word/media/image";

/// A Word (.docx) package opened for rewriting.
///
/// The main document part is parsed into a [`Document`]; every other part is
/// carried along untouched and written back on [`Package::save`].
///
/// # Examples
///
/// ```rust,no_run
/// use docfill::common::Length;
/// use docfill::ooxml::docx::{Package, Picture};
///
/// let mut pkg = Package::open("template.docx")?;
/// let run = pkg.new_picture_run(&Picture::open("photo.png")?, Length::from_inches(4.0))?;
///
/// if let Some(at) = pkg.document().find_paragraph("{{PHOTO}}") {
///     if let Some(mut para) = pkg.document_mut().paragraph_at_mut(at) {
///         para.clear();
///         para.append(run);
///     }
/// }
/// pkg.save("out.docx")?;
/// # Ok::<(), docfill::ooxml::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    opc: OpcPackage,
    main_partname: PackURI,
    rels: Relationships,
    document: Document,
    /// Media already embedded by this package, keyed by content digest
    media: HashMap<Vec<u8>, String>,
}

impl Package {
    /// Open a .docx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_partname = opc
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("main document part: {}", e)))?;

        // Verify it's a Word document by checking the main part's content type
        let content_type = opc.content_type(&main_partname).unwrap_or_default();
        if content_type != ct::WML_DOCUMENT_MAIN {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::WML_DOCUMENT_MAIN.to_string(),
                got: content_type.to_string(),
            });
        }

        let document = Document::parse(opc.part_blob(&main_partname)?)?;
        let rels = opc.rels_for(&main_partname)?;

        Ok(Self {
            opc,
            main_partname,
            rels,
            document,
            media: HashMap::new(),
        })
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Embed `picture` and build an inline run showing it at `width`.
    ///
    /// The height follows the picture's aspect ratio. Pictures with identical
    /// bytes share one media part.
    pub fn new_picture_run(&mut self, picture: &Picture, width: Length) -> Result<Element> {
        let r_id = self.embed(picture)?;
        let height = picture.height_for_width(width);
        let id = self.document.next_drawing_id();

        let xml = inline_picture_run(&r_id, id, picture.filename(), width.emus(), height.emus())?;
        Element::parse_fragment(&xml)
    }

    fn embed(&mut self, picture: &Picture) -> Result<String> {
        if let Some(r_id) = self.media.get(picture.digest()) {
            return Ok(r_id.clone());
        }

        let format = picture.format();
        let partname = self.opc.next_partname(MEDIA_PREFIX, format.extension())?;
        self.opc.set_part_blob(&partname, picture.data().to_vec());
        self.opc
            .add_default_content_type(format.extension(), format.mime_type());

        let target = partname.relative_ref(self.main_partname.base_uri());
        let r_id = self.rels.get_or_add(rt::IMAGE, &target);
        self.media.insert(picture.digest().to_vec(), r_id.clone());
        Ok(r_id)
    }

    /// Serialize the package with the current document content.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.opc
            .set_part_blob(&self.main_partname, self.document.to_xml().into_bytes());
        if !self.rels.is_empty() {
            self.opc.set_rels_for(&self.main_partname, &self.rels);
        }
        Ok(self.opc.to_bytes()?)
    }

    /// Write the package to `path`, overwriting any existing file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}
