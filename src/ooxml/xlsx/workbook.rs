//! Workbook access for Excel (.xlsx) files.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};
use crate::ooxml::xlsx::cell::DateSystem;
use crate::ooxml::xlsx::parsers::styles_parser::parse_styles_xml;
use crate::ooxml::xlsx::parsers::workbook_parser::{parse_date_system, parse_workbook_xml};
use crate::ooxml::xlsx::parsers::worksheet_parser::{CellContext, parse_worksheet_xml};
use crate::ooxml::xlsx::shared_strings::SharedStrings;
use crate::ooxml::xlsx::styles::CellFormats;
use crate::ooxml::xlsx::worksheet::Worksheet;
use std::io::{Read, Seek};
use std::path::Path;

/// A `<sheet>` entry of workbook.xml.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    /// Worksheet name
    pub name: String,
    /// Relationship ID for the worksheet
    pub relationship_id: String,
    /// Sheet ID
    pub sheet_id: u32,
}

/// A read-only Excel workbook.
///
/// # Examples
///
/// ```rust,no_run
/// use docfill::ooxml::xlsx::Workbook;
///
/// let workbook = Workbook::open("data.xlsx")?;
/// let sheet = workbook.active_worksheet()?;
/// for row in sheet.rows() {
///     println!("{:?}", row);
/// }
/// # Ok::<(), docfill::ooxml::OoxmlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Workbook {
    package: OpcPackage,
    rels: Relationships,
    sheets: Vec<WorksheetInfo>,
    active_sheet_index: usize,
    shared_strings: SharedStrings,
    formats: CellFormats,
    date_system: DateSystem,
}

impl Workbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(OpcPackage::open(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::new(OpcPackage::from_bytes(data)?)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::new(OpcPackage::from_reader(reader)?)
    }

    /// Load the workbook part, its shared strings and cell formats.
    pub fn new(package: OpcPackage) -> Result<Self> {
        let workbook_partname = package
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("workbook part: {}", e)))?;

        let content_type = package.content_type(&workbook_partname).unwrap_or_default();
        if content_type != ct::SML_SHEET_MAIN && content_type != ct::SML_SHEET_MACRO_MAIN {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::SML_SHEET_MAIN.to_string(),
                got: content_type.to_string(),
            });
        }

        let content = std::str::from_utf8(package.part_blob(&workbook_partname)?)?;
        let (sheets, active_sheet_index) = parse_workbook_xml(content)?;
        let date_system = parse_date_system(content);
        let rels = package.rels_for(&workbook_partname)?;
        let shared_strings = load_shared_strings(&package, &rels)?;
        let formats = load_cell_formats(&package, &rels)?;

        Ok(Self {
            package,
            rels,
            sheets,
            active_sheet_index,
            shared_strings,
            formats,
            date_system,
        })
    }

    pub fn worksheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    #[inline]
    pub fn worksheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Index of the sheet selected when the workbook was last saved.
    #[inline]
    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet_index
    }

    #[inline]
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Load the worksheet at `index` (workbook order).
    pub fn worksheet(&self, index: usize) -> Result<Worksheet> {
        let info = self
            .sheets
            .get(index)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("worksheet {}", index)))?;

        let partname = self.worksheet_partname(info)?;
        let context = CellContext {
            strings: &self.shared_strings,
            formats: &self.formats,
            dates: self.date_system,
        };
        let rows = parse_worksheet_xml(self.package.part_blob(&partname)?, context)?;
        Ok(Worksheet::new(info.name.clone(), rows))
    }

    pub fn active_worksheet(&self) -> Result<Worksheet> {
        self.worksheet(self.active_sheet_index)
    }

    fn worksheet_partname(&self, info: &WorksheetInfo) -> Result<PackURI> {
        let rel = self.rels.get(&info.relationship_id).ok_or_else(|| {
            OoxmlError::PartNotFound(format!(
                "relationship {} of sheet '{}'",
                info.relationship_id, info.name
            ))
        })?;
        if rel.reltype() != rt::WORKSHEET {
            return Err(OoxmlError::InvalidFormat(format!(
                "sheet '{}' is not a worksheet",
                info.name
            )));
        }
        Ok(self.rels.target_partname(rel)?)
    }
}

fn load_shared_strings(package: &OpcPackage, rels: &Relationships) -> Result<SharedStrings> {
    let Ok(rel) = rels.part_with_reltype(rt::SHARED_STRINGS) else {
        return Ok(SharedStrings::new());
    };
    let partname = rels.target_partname(rel)?;
    if !package.contains(&partname) {
        return Ok(SharedStrings::new());
    }
    SharedStrings::parse(package.part_blob(&partname)?)
}

fn load_cell_formats(package: &OpcPackage, rels: &Relationships) -> Result<CellFormats> {
    let Ok(rel) = rels.part_with_reltype(rt::STYLES) else {
        return Ok(CellFormats::default());
    };
    let partname = rels.target_partname(rel)?;
    if !package.contains(&partname) {
        return Ok(CellFormats::default());
    }
    Ok(parse_styles_xml(std::str::from_utf8(package.part_blob(&partname)?)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::cell::CellValue;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

    const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

    fn workbook_xml(active_tab: Option<usize>) -> String {
        let view = match active_tab {
            Some(tab) => format!(r#"<bookViews><workbookView activeTab="{}"/></bookViews>"#, tab),
            None => String::new(),
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}<sheets><sheet name="Data" sheetId="1" r:id="rId1"/><sheet name="Other" sheetId="2" r:id="rId2"/></sheets></workbook>"#,
            view
        )
    }

    fn create_minimal_xlsx(active_tab: Option<usize>) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("xl/workbook.xml", workbook_xml(active_tab)),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>Name</t></si><si><t>Report1</t></si></sst>"#.to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row><row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2"><v>7</v></c><c r="C2" s="1"><v>45292.5</v></c></row></sheetData></worksheet>"#.to_string(),
            ),
            (
                "xl/styles.xml",
                r#"<styleSheet><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="22" applyNumberFormat="1"/></cellXfs></styleSheet>"#.to_string(),
            ),
            (
                "xl/worksheets/sheet2.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>second</t></is></c></row></sheetData></worksheet>"#.to_string(),
            ),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_first_sheet_is_active_by_default() {
        let workbook = Workbook::from_bytes(&create_minimal_xlsx(None)).unwrap();
        assert_eq!(workbook.worksheet_count(), 2);
        assert_eq!(workbook.worksheet_names().collect::<Vec<_>>(), vec!["Data", "Other"]);

        let sheet = workbook.active_worksheet().unwrap();
        assert_eq!(sheet.name(), "Data");
        assert_eq!(sheet.cell(1, 1), &CellValue::String("Name".into()));
        assert_eq!(sheet.cell(2, 1), &CellValue::String("Report1".into()));
        assert_eq!(sheet.cell(2, 2), &CellValue::Int(7));
    }

    #[test]
    fn test_date_styled_cells() {
        let workbook = Workbook::from_bytes(&create_minimal_xlsx(None)).unwrap();
        assert_eq!(workbook.date_system(), DateSystem::V1900);
        let sheet = workbook.active_worksheet().unwrap();
        assert_eq!(sheet.cell(2, 3).to_text().as_deref(), Some("2024-01-01 12:00:00"));

        let mut pkg = OpcPackage::from_bytes(&create_minimal_xlsx(None)).unwrap();
        let workbook_xml = workbook_xml(None).replace("<sheets>", r#"<workbookPr date1904="1"/><sheets>"#);
        pkg.set_part_blob(&PackURI::new("/xl/workbook.xml").unwrap(), workbook_xml.into_bytes());
        let workbook = Workbook::new(pkg).unwrap();
        assert_eq!(workbook.date_system(), DateSystem::V1904);
        let sheet = workbook.active_worksheet().unwrap();
        assert_eq!(sheet.cell(2, 3).to_text().as_deref(), Some("2028-01-02 12:00:00"));
    }

    #[test]
    fn test_active_tab_is_honoured() {
        let workbook = Workbook::from_bytes(&create_minimal_xlsx(Some(1))).unwrap();
        let sheet = workbook.active_worksheet().unwrap();
        assert_eq!(sheet.name(), "Other");
        assert_eq!(sheet.cell(1, 1), &CellValue::String("second".into()));
    }

    #[test]
    fn test_rejects_non_spreadsheet() {
        let bytes = create_minimal_xlsx(None);
        let mut pkg = OpcPackage::from_bytes(&bytes).unwrap();
        let types = CONTENT_TYPES.replace(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            ct::WML_DOCUMENT_MAIN,
        );
        pkg.set_part_blob(&PackURI::new("/[Content_Types].xml").unwrap(), types.into_bytes());
        let reopened = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();

        assert!(matches!(
            Workbook::new(reopened),
            Err(OoxmlError::InvalidContentType { .. })
        ));
    }
}
