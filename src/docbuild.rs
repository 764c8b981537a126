//! Document builder: render enhanced text as a downloadable DOCX.
//!
//! The output package is the minimal WordprocessingML set — content types,
//! package relationships, a styles part defining `Heading1`, and the
//! document itself. One top-level heading ("Enhanced Document") is followed
//! by one paragraph per non-blank input line, in original order. There is
//! nothing to get wrong about the input: an empty string simply yields a
//! heading-only document.

use crate::error::DocPolishError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// MIME type of the produced document, for the download boundary.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Title text of the single top-level heading.
pub const DOCUMENT_HEADING: &str = "Enhanced Document";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#;

/// Render text as a complete DOCX byte buffer, ready for transfer.
///
/// # Errors
/// Only [`DocPolishError::Internal`] — a ZIP write into an in-memory
/// buffer has no interesting failure modes.
pub fn build_docx(content: &str) -> Result<Vec<u8>, DocPolishError> {
    let mut buf = Cursor::new(Vec::new());
    let mut zip = zip::ZipWriter::new(&mut buf);
    let opts = SimpleFileOptions::default();

    let internal = |e: &dyn std::fmt::Display| DocPolishError::Internal(format!("DOCX write: {e}"));

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
    ] {
        zip.start_file(name, opts).map_err(|e| internal(&e))?;
        zip.write_all(body.as_bytes()).map_err(|e| internal(&e))?;
    }

    zip.start_file("word/document.xml", opts)
        .map_err(|e| internal(&e))?;
    zip.write_all(document_xml(content).as_bytes())
        .map_err(|e| internal(&e))?;

    zip.finish().map_err(|e| internal(&e))?;
    Ok(buf.into_inner())
}

/// Build the document part: heading plus one paragraph per non-blank line.
fn document_xml(content: &str) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    xml.push_str(&format!(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
        escape_xml(DOCUMENT_HEADING)
    ));

    for line in content.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        xml.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_xml(line)
        ));
    }

    xml.push_str("</w:body></w:document>");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn document_part(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn heading_plus_paragraphs_skipping_blanks() {
        let bytes = build_docx("Hello\n\nWorld").unwrap();
        let xml = document_part(&bytes);

        assert_eq!(xml.matches("Heading1").count(), 1);
        // Heading + "Hello" + "World"; the blank line emits nothing.
        assert_eq!(xml.matches("<w:p>").count(), 3);
        assert!(xml.contains(">Hello<"));
        assert!(xml.contains(">World<"));
    }

    #[test]
    fn whitespace_only_lines_are_skipped() {
        let bytes = build_docx("a\n   \n\t\nb").unwrap();
        let xml = document_part(&bytes);
        assert_eq!(xml.matches("<w:p>").count(), 3);
    }

    #[test]
    fn empty_input_yields_heading_only() {
        let bytes = build_docx("").unwrap();
        let xml = document_part(&bytes);
        assert_eq!(xml.matches("<w:p>").count(), 1);
        assert!(xml.contains(DOCUMENT_HEADING));
    }

    #[test]
    fn text_is_xml_escaped() {
        let bytes = build_docx("fish & <chips>").unwrap();
        let xml = document_part(&bytes);
        assert!(xml.contains("fish &amp; &lt;chips&gt;"));
        assert!(!xml.contains("<chips>"));
    }

    #[test]
    fn package_has_all_parts() {
        let bytes = build_docx("x").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/document.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {name}");
        }
    }
}
