//! DOCX body-paragraph reader.
//!
//! A .docx file is a ZIP archive; the body lives in `word/document.xml`. Only
//! top-level body paragraphs are returned, table cells are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractError;

/// Returns the text of each body paragraph, in document order.
pub fn read_body_paragraphs(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" if table_depth == 0 => current.clear(),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if table_depth == 0 => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text && table_depth == 0 => {
                current.push_str(&e.unescape()?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 => paragraphs.push(std::mem::take(&mut current)),
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_runs_tabs_and_breaks() {
        let bytes = docx_with_body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t xml:space="preserve">Hello </w:t></w:r><w:r><w:t>world</w:t><w:tab/><w:t>A&amp;B</w:t><w:br/><w:t>next</w:t></w:r></w:p>"#,
        );
        let paragraphs = read_body_paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs, vec!["Hello world\tA&B\nnext"]);
    }

    #[test]
    fn test_keeps_empty_paragraphs() {
        let bytes = docx_with_body(r#"<w:p><w:r><w:t>one</w:t></w:r></w:p><w:p/><w:p></w:p>"#);
        let paragraphs = read_body_paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs, vec!["one", "", ""]);
    }

    #[test]
    fn test_skips_table_paragraphs() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>after</w:t></w:r></w:p>"#,
        );
        let paragraphs = read_body_paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs, vec!["before", "after"]);
    }

    #[test]
    fn test_missing_document_part_is_an_error() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert!(read_body_paragraphs(&bytes).is_err());
    }
}
