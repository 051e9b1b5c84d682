//! Single-column A4 resume drawn with the PDF base fonts.
//!
//! Layout (top to bottom): centered name, centered contact line, then the
//! Professional Summary / Work Experience / Education / Skills sections, each
//! introduced by a shaded title band. Text is encoded as WinAnsi, one byte per
//! character. Output carries no timestamps or IDs and is byte-identical for
//! identical input.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::models::resume::ResumeRecord;
use crate::render::font_metrics::BaseFont;
use crate::render::RenderError;

const MM: f32 = 72.0 / 25.4;
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 10.0 * MM;
const AUTO_BREAK_MARGIN: f32 = 20.0 * MM;
const CELL_PADDING: f32 = 1.0 * MM;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const SECTION_FILL: [f32; 3] = [200.0 / 255.0, 220.0 / 255.0, 255.0 / 255.0];

#[derive(Debug, Clone, Copy)]
enum Align {
    Left,
    Center,
}

/// Renders `resume` as PDF bytes.
pub fn render_pdf(resume: &ResumeRecord) -> Result<Vec<u8>, RenderError> {
    let mut canvas = Canvas::new();

    canvas.cell(&resume.name, BaseFont::HelveticaBold, 24.0, 10.0 * MM, Align::Center);
    canvas.cell(&resume.contact_line(), BaseFont::Helvetica, 12.0, 10.0 * MM, Align::Center);
    canvas.gap(10.0 * MM);

    canvas.section_title("Professional Summary");
    canvas.body(&resume.summary);

    canvas.section_title("Work Experience");
    for job in &resume.experience {
        canvas.paragraph(&job.heading(), BaseFont::HelveticaBold, 11.0, 6.0 * MM);
        for point in &job.points {
            canvas.paragraph(&format!("- {point}"), BaseFont::Helvetica, 11.0, 5.0 * MM);
        }
        canvas.gap(3.0 * MM);
    }

    canvas.section_title("Education");
    for entry in &resume.education {
        canvas.paragraph(&entry.line(), BaseFont::HelveticaBold, 11.0, 6.0 * MM);
    }
    canvas.gap(5.0 * MM);

    canvas.section_title("Skills");
    canvas.body(&resume.skills_line());

    canvas.into_pdf()
}

/// Maps `text` to WinAnsi bytes. Characters without a WinAnsi code become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            // 0x80..=0x9F are remapped above; the rest of Latin-1 maps 1:1.
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas: a minimal top-down flow layout over PDF content operations
// ────────────────────────────────────────────────────────────────────────────

struct Canvas {
    finished_pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    /// Distance from the top edge of the page, in points.
    y: f32,
}

impl Canvas {
    fn new() -> Self {
        Self {
            finished_pages: Vec::new(),
            ops: Vec::new(),
            y: MARGIN,
        }
    }

    fn gap(&mut self, height: f32) {
        self.y += height;
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y + height > PAGE_HEIGHT - AUTO_BREAK_MARGIN {
            self.finished_pages.push(std::mem::take(&mut self.ops));
            self.y = MARGIN;
        }
    }

    /// One line of text in a full-width cell of `height`, then moves below it.
    fn cell(&mut self, text: &str, font: BaseFont, size: f32, height: f32, align: Align) {
        self.ensure_room(height);
        self.draw_text(text, font, size, height, align);
        self.y += height;
    }

    /// Word-wrapped text, one `line_height` cell per line.
    fn paragraph(&mut self, text: &str, font: BaseFont, size: f32, line_height: f32) {
        let max_width = CONTENT_WIDTH - 2.0 * CELL_PADDING;
        for line in font.metrics().wrap(text, size, max_width) {
            self.cell(&line, font, size, line_height, Align::Left);
        }
    }

    /// Shaded band with a bold title, followed by a small gap.
    fn section_title(&mut self, title: &str) {
        let height = 6.0 * MM;
        self.ensure_room(height);
        let bottom = PAGE_HEIGHT - self.y - height;
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "rg",
                SECTION_FILL.iter().map(|&c| Object::from(c)).collect(),
            ),
            Operation::new(
                "re",
                vec![
                    MARGIN.into(),
                    bottom.into(),
                    CONTENT_WIDTH.into(),
                    height.into(),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.draw_text(title, BaseFont::HelveticaBold, 12.0, height, Align::Left);
        self.y += height;
        self.gap(4.0 * MM);
    }

    /// Regular 11pt body block followed by a blank line.
    fn body(&mut self, text: &str) {
        let line_height = 5.0 * MM;
        self.paragraph(text, BaseFont::Helvetica, 11.0, line_height);
        self.gap(line_height);
    }

    fn draw_text(&mut self, text: &str, font: BaseFont, size: f32, height: f32, align: Align) {
        if text.is_empty() {
            return;
        }
        let width = font.metrics().width_pt(text, size);
        let x = match align {
            Align::Left => MARGIN + CELL_PADDING,
            Align::Center => (MARGIN + (CONTENT_WIDTH - width) / 2.0).max(MARGIN),
        };
        // Baseline sits slightly below the vertical middle of the cell.
        let baseline = PAGE_HEIGHT - (self.y + 0.5 * height + 0.3 * size);

        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(text),
                    StringFormat::Hexadecimal,
                )],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn into_pdf(mut self) -> Result<Vec<u8>, RenderError> {
        self.finished_pages.push(std::mem::take(&mut self.ops));

        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = |doc: &mut Document, font: BaseFont| -> ObjectId {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.postscript_name(),
                "Encoding" => "WinAnsiEncoding",
            })
        };
        let regular_id = font_id(&mut doc, BaseFont::Helvetica);
        let bold_id = font_id(&mut doc, BaseFont::HelveticaBold);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                BaseFont::Helvetica.resource_name() => regular_id,
                BaseFont::HelveticaBold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished_pages.len());
        for operations in self.finished_pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    PAGE_WIDTH.into(),
                    PAGE_HEIGHT.into(),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
