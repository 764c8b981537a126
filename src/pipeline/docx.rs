//! DOCX text extraction.
//!
//! A `.docx` file is a ZIP archive whose main part, `word/document.xml`,
//! holds the text as WordprocessingML: paragraphs (`<w:p>`) containing runs
//! whose text lives in `<w:t>` elements. The extractor walks paragraphs in
//! document order, concatenates each paragraph's `<w:t>` runs, and joins
//! paragraphs with `\n` — empty paragraphs are preserved as empty lines so
//! the author's spacing survives the round trip.
//!
//! Only text runs are read; drawings, fields, headers and footers are
//! ignored. The tag scan is deliberately schema-light: WordprocessingML
//! documents in the wild carry heavy namespaces and revision markup, and a
//! full XML parse buys nothing here over finding `<w:p>`/`<w:t>` boundaries.

use crate::error::DocPolishError;
use std::io::{Cursor, Read};

/// Extract the paragraph text of a DOCX file.
///
/// # Errors
/// [`DocPolishError::ExtractionFailed`] when the bytes are not a readable
/// ZIP archive or the document part is missing/unreadable.
pub fn extract_docx(bytes: &[u8]) -> Result<String, DocPolishError> {
    let cursor = Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| DocPolishError::extraction(format!("not a DOCX (ZIP) archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocPolishError::extraction(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocPolishError::extraction(format!("unreadable document.xml: {e}")))?;

    Ok(paragraphs(&xml).join("\n"))
}

/// Split `document.xml` into paragraph texts, in document order.
fn paragraphs(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some((start, body_start)) = find_element(xml, pos, "w:p") {
        // Self-closing <w:p/> is an empty paragraph.
        let Some(body_start) = body_start else {
            out.push(String::new());
            pos = start + 1;
            continue;
        };
        let Some(end) = xml[body_start..].find("</w:p>") else {
            break;
        };
        out.push(collect_runs(&xml[body_start..body_start + end]));
        pos = body_start + end + "</w:p>".len();
    }

    out
}

/// Concatenate the `<w:t>` run texts inside one paragraph body.
fn collect_runs(body: &str) -> String {
    let mut text = String::new();
    let mut pos = 0;

    while let Some((start, content_start)) = find_element(body, pos, "w:t") {
        let Some(content_start) = content_start else {
            pos = start + 1;
            continue;
        };
        let Some(end) = body[content_start..].find("</w:t>") else {
            break;
        };
        text.push_str(&decode_entities(&body[content_start..content_start + end]));
        pos = content_start + end + "</w:t>".len();
    }

    text
}

/// Find the next `<tag ...>` element at or after `from`.
///
/// Returns `(tag_start, Some(body_start))` for an open element and
/// `(tag_start, None)` for a self-closing one. Prefix collisions are
/// excluded: searching for `w:p` will not match `<w:pPr>`.
fn find_element(xml: &str, from: usize, tag: &str) -> Option<(usize, Option<usize>)> {
    let needle = format!("<{tag}");
    let mut search = from;

    while let Some(rel) = xml[search..].find(&needle) {
        let start = search + rel;
        let after = start + needle.len();
        match xml.as_bytes().get(after) {
            // "<w:p>" or "<w:p attr=...>"
            Some(b'>') | Some(b' ') => {
                let close = xml[after..].find('>')?;
                let tag_end = after + close;
                if xml.as_bytes()[tag_end - 1] == b'/' {
                    return Some((start, None));
                }
                return Some((start, Some(tag_end + 1)));
            }
            // "<w:p/>"
            Some(b'/') => return Some((start, None)),
            // "<w:pPr" etc. — keep looking
            _ => search = after,
        }
    }

    None
}

/// Decode the five predefined XML entities.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build a minimal DOCX container holding the given document.xml body.
    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(&mut buf);
        let opts = SimpleFileOptions::default();
        zip.start_file("word/document.xml", opts).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        zip.finish().unwrap();
        buf.into_inner()
    }

    #[test]
    fn joins_paragraphs_with_newlines() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>First</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx(&bytes).unwrap(), "First\nSecond");
    }

    #[test]
    fn preserves_empty_paragraphs_as_blank_lines() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Above</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t>Below</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx(&bytes).unwrap(), "Above\n\nBelow");
    }

    #[test]
    fn concatenates_split_runs() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>Hel</w:t></w:r><w:r><w:t xml:space="preserve">lo there</w:t></w:r></w:p>"#,
        );
        assert_eq!(extract_docx(&bytes).unwrap(), "Hello there");
    }

    #[test]
    fn decodes_xml_entities() {
        let bytes = docx_with_body("<w:p><w:r><w:t>a &amp; b &lt; c</w:t></w:r></w:p>");
        assert_eq!(extract_docx(&bytes).unwrap(), "a & b < c");
    }

    #[test]
    fn paragraph_properties_do_not_leak_text() {
        // <w:pPr> shares the <w:p prefix; make sure it is not taken for a paragraph.
        let bytes = docx_with_body(
            "<w:p><w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx(&bytes).unwrap(), "Title");
    }

    #[test]
    fn rejects_non_zip_bytes() {
        let err = extract_docx(b"this is not a zip").unwrap_err();
        assert!(matches!(err, DocPolishError::ExtractionFailed { .. }));
    }

    #[test]
    fn rejects_zip_without_document_part() {
        let mut buf = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(&mut buf);
        zip.start_file("unrelated.txt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"hi").unwrap();
        zip.finish().unwrap();

        let err = extract_docx(&buf.into_inner()).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
