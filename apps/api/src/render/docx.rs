//! Minimal WordprocessingML package for the Word export.
//!
//! Paragraph order: Title (name), contact line, then Summary, Experience,
//! Education and Skills, each under a Heading 1. Job points use the List Bullet
//! style. Every archive entry carries the same fixed timestamp so the output is
//! byte-identical for identical input.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::models::resume::ResumeRecord;
use crate::render::RenderError;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="60"/></w:pPr><w:rPr><w:sz w:val="56"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="2F5496"/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr><w:spacing w:after="40"/></w:pPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// Renders `resume` as .docx bytes.
pub fn render_docx(resume: &ResumeRecord) -> Result<Vec<u8>, RenderError> {
    let document = document_xml(resume);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/document.xml", document.as_str()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
        ("word/styles.xml", STYLES_XML),
        ("word/numbering.xml", NUMBERING_XML),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn document_xml(resume: &ResumeRecord) -> String {
    let mut body = String::new();

    paragraph(&mut body, Some("Title"), &resume.name, false);
    paragraph(&mut body, None, &resume.contact_line(), false);

    paragraph(&mut body, Some("Heading1"), "Summary", false);
    paragraph(&mut body, None, &resume.summary, false);

    paragraph(&mut body, Some("Heading1"), "Experience", false);
    for job in &resume.experience {
        paragraph(&mut body, None, &job.heading(), true);
        for point in &job.points {
            paragraph(&mut body, Some("ListBullet"), point, false);
        }
    }

    paragraph(&mut body, Some("Heading1"), "Education", false);
    for entry in &resume.education {
        paragraph(&mut body, None, &entry.line(), false);
    }

    paragraph(&mut body, Some("Heading1"), "Skills", false);
    paragraph(&mut body, None, &resume.skills_line(), false);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1134" w:header="709" w:footer="709" w:gutter="0"/></w:sectPr></w:body></w:document>"#
    )
}

fn paragraph(out: &mut String, style: Option<&str>, text: &str, bold: bool) {
    out.push_str("<w:p>");
    if let Some(style) = style {
        out.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{style}"/></w:pPr>"#));
    }
    out.push_str("<w:r>");
    if bold {
        out.push_str("<w:rPr><w:b/></w:rPr>");
    }
    out.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(&xml_safe(text))
    ));
}

/// Drops characters XML 1.0 does not allow. Newlines and carriage returns
/// become spaces; tabs are kept.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' => Some(c),
            '\n' | '\r' => Some(' '),
            c if c < '\u{20}' => None,
            '\u{FFFE}' | '\u{FFFF}' => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::docx::read_body_paragraphs;
    use crate::models::resume::fixtures::sample_resume;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_render_docx_paragraph_order() {
        let bytes = render_docx(&sample_resume()).unwrap();
        let paragraphs = read_body_paragraphs(&bytes).unwrap();

        assert_eq!(
            paragraphs,
            vec![
                "Ada Lovelace",
                "ada@example.com | +44 20 7946 0000",
                "Summary",
                "Backend engineer with a decade of experience building distributed \
                 systems in Rust and Go, focused on reliability and developer tooling.",
                "Experience",
                "Staff Engineer - Analytical Engines Ltd",
                "Cut p99 latency of the billing API by 40% by redesigning the cache layer",
                "Led a team of 5 migrating 30 services to Kubernetes",
                "Software Engineer - Difference Works",
                "Built the ingestion pipeline processing 2M events/day",
                "Education",
                "BSc Mathematics - University of London (2012)",
                "Skills",
                "Rust, Kubernetes, PostgreSQL",
            ]
        );
    }

    #[test]
    fn test_render_docx_is_deterministic() {
        let resume = sample_resume();
        assert_eq!(render_docx(&resume).unwrap(), render_docx(&resume).unwrap());
    }

    #[test]
    fn test_render_docx_contains_package_parts() {
        let bytes = render_docx(&sample_resume()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/numbering.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }

        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains(r#"<w:pStyle w:val="ListBullet"/>"#));
        assert!(document.contains(r#"<w:pStyle w:val="Title"/>"#));
    }

    #[test]
    fn test_render_docx_escapes_markup() {
        let mut resume = sample_resume();
        resume.summary = "R&D <lead> \"quoted\"".to_string();
        let bytes = render_docx(&resume).unwrap();
        let paragraphs = read_body_paragraphs(&bytes).unwrap();
        assert!(paragraphs.contains(&"R&D <lead> \"quoted\"".to_string()));
    }

    #[test]
    fn test_render_docx_strips_xml_forbidden_characters() {
        let mut resume = sample_resume();
        resume.summary = "Led\u{1} team\u{8}\tof 5\nengineers".to_string();
        let bytes = render_docx(&resume).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(!document.chars().any(|c| c < '\u{20}' && c != '\t' && c != '\n'));

        let paragraphs = read_body_paragraphs(&bytes).unwrap();
        assert!(paragraphs.contains(&"Led team\tof 5 engineers".to_string()));
    }

    #[test]
    fn test_render_docx_empty_record() {
        let bytes = render_docx(&ResumeRecord::default()).unwrap();
        let paragraphs = read_body_paragraphs(&bytes).unwrap();
        assert_eq!(
            paragraphs,
            vec!["", " | ", "Summary", "", "Experience", "Education", "Skills", ""]
        );
    }
}
