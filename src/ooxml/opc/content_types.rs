//! The `[Content_Types].xml` part.
//!
//! Content types are discovered per the OPC rules: an `Override` for the exact
//! partname wins, otherwise the `Default` registered for the extension applies.
//! Entries keep their document order so an untouched map serializes back in
//! the order the producer wrote it.

use crate::common::xml::{escape_xml, unescape_xml};
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone, Default)]
pub struct ContentTypeMap {
    /// (extension, content type), extensions stored lowercase
    defaults: Vec<(String, String)>,
    /// (partname, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse content types from `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::new();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let (key_attr, is_default): (&[u8], bool) = match e.local_name().as_ref() {
                        b"Default" => (b"Extension", true),
                        b"Override" => (b"PartName", false),
                        _ => {
                            buf.clear();
                            continue;
                        },
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = unescape_xml(std::str::from_utf8(&attr.value)?);
                        if attr.key.as_ref() == key_attr {
                            key = Some(value);
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = Some(value);
                        }
                    }

                    if let (Some(key), Some(content_type)) = (key, content_type) {
                        if is_default {
                            map.add_default(&key, &content_type);
                        } else {
                            map.add_override(&key, &content_type);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Register a default for an extension unless one already exists.
    ///
    /// Returns `true` when the map changed.
    pub fn add_default(&mut self, ext: &str, content_type: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if self.defaults.iter().any(|(e, _)| *e == ext) {
            return false;
        }
        self.defaults.push((ext, content_type.to_string()));
        true
    }

    /// Set the override for a partname, replacing any previous one.
    pub fn add_override(&mut self, partname: &str, content_type: &str) {
        match self
            .overrides
            .iter_mut()
            .find(|(p, _)| p.eq_ignore_ascii_case(partname))
        {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self
                .overrides
                .push((partname.to_string(), content_type.to_string())),
        }
    }

    /// Content type of a part, if the map knows it.
    pub fn content_type(&self, partname: &PackURI) -> Option<&str> {
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(partname.as_str()))
        {
            return Some(ct);
        }

        let ext = partname.ext().to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(
            256 + self.defaults.len() * 96 + self.overrides.len() * 160,
        );
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (partname, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(ct)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="XML" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

    #[test]
    fn test_lookup_prefers_override() {
        let map = ContentTypeMap::from_xml(CONTENT_TYPES.as_bytes()).unwrap();

        let document = PackURI::new("/word/document.xml").unwrap();
        assert_eq!(map.content_type(&document), Some(ct::WML_DOCUMENT_MAIN));

        let styles = PackURI::new("/word/styles.xml").unwrap();
        assert_eq!(map.content_type(&styles), Some(ct::XML));

        let image = PackURI::new("/word/media/image1.png").unwrap();
        assert_eq!(map.content_type(&image), None);
    }

    #[test]
    fn test_add_default_once() {
        let mut map = ContentTypeMap::from_xml(CONTENT_TYPES.as_bytes()).unwrap();
        assert!(map.add_default("png", ct::PNG));
        assert!(!map.add_default("PNG", ct::PNG));

        let reparsed = ContentTypeMap::from_xml(map.to_xml().as_bytes()).unwrap();
        let image = PackURI::new("/word/media/image1.PNG").unwrap();
        assert_eq!(reparsed.content_type(&image), Some(ct::PNG));
    }
}
