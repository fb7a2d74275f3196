//! Pictures placed inline in a document.

use crate::common::unit::Length;
use crate::common::xml::escape_xml;
use crate::ooxml::docx::format::ImageFormat;
use crate::ooxml::error::{OoxmlError, Result};
use image::ImageReader;
use sha2::{Digest, Sha256};
use std::fmt::Write as FmtWrite;
use std::io::Cursor;
use std::path::Path;

/// Image bytes ready to be embedded, with the pixel size used for scaling.
#[derive(Debug, Clone)]
pub struct Picture {
    data: Vec<u8>,
    format: ImageFormat,
    width_px: u32,
    height_px: u32,
    /// Shown as the drawing's description (alt text)
    filename: String,
    digest: Vec<u8>,
}

impl Picture {
    /// Read a picture file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(data, filename)
            .map_err(|e| OoxmlError::Image(format!("{}: {}", path.display(), e)))
    }

    pub fn from_bytes(data: Vec<u8>, filename: impl Into<String>) -> Result<Self> {
        let format = ImageFormat::detect_from_bytes(&data)
            .ok_or_else(|| OoxmlError::Image("unsupported image format".to_string()))?;

        let (width_px, height_px) = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .into_dimensions()?;
        if width_px == 0 || height_px == 0 {
            return Err(OoxmlError::Image("image has no pixels".to_string()));
        }

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let digest = hasher.finalize().to_vec();

        Ok(Self {
            data,
            format,
            width_px,
            height_px,
            filename: filename.into(),
            digest,
        })
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// SHA-256 of the bytes; identical pictures share one media part.
    #[inline]
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    #[inline]
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// Height that keeps the aspect ratio when rendered at `width`.
    pub fn height_for_width(&self, width: Length) -> Length {
        let scale = self.height_px as f64 / self.width_px as f64;
        Length::from_emus((width.emus() as f64 * scale).round() as i64)
    }
}

/// An inline picture run (`w:r` holding a `w:drawing`).
///
/// `docpr_id` must be unique among the drawings of the document.
pub(crate) fn inline_picture_run(
    r_id: &str,
    docpr_id: u32,
    descr: &str,
    cx: i64,
    cy: i64,
) -> Result<String> {
    let mut xml = String::with_capacity(1200);
    let name = format!("Picture {}", docpr_id);
    let descr = escape_xml(descr);

    write!(
        xml,
        r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{id}" name="{name}" descr="{descr}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:nvPicPr><pic:cNvPr id="0" name="{name}" descr="{descr}"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        cx = cx,
        cy = cy,
        id = docpr_id,
        name = name,
        descr = descr,
        r_id = escape_xml(r_id),
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))?;

    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat as Encoding, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut bytes, Encoding::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_picture_from_png() {
        let picture = Picture::from_bytes(png(40, 20), "a.png").unwrap();
        assert_eq!(picture.format(), ImageFormat::Png);
        assert_eq!(picture.pixel_size(), (40, 20));
        assert_eq!(
            picture.height_for_width(Length::from_inches(4.0)),
            Length::from_inches(2.0)
        );
    }

    #[test]
    fn test_identical_bytes_share_digest() {
        let a = Picture::from_bytes(png(3, 3), "a.png").unwrap();
        let b = Picture::from_bytes(png(3, 3), "b.png").unwrap();
        let c = Picture::from_bytes(png(4, 3), "c.png").unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(Picture::from_bytes(b"not an image at all".to_vec(), "x.png").is_err());
    }

    #[test]
    fn test_inline_run_markup() {
        let xml = inline_picture_run("rId7", 3, "a & b.png", 100, 50).unwrap();
        assert!(xml.starts_with("<w:r><w:drawing>"));
        assert!(xml.contains(r#"<wp:docPr id="3" name="Picture 3" descr="a &amp; b.png"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId7"/>"#));
        assert!(xml.contains(r#"<wp:extent cx="100" cy="50"/>"#));
    }
}
