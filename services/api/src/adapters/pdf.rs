//! services/api/src/adapters/pdf.rs
//!
//! PDF export of a generated summary via `printpdf`, using the built-in
//! Helvetica faces so no font files need to ship with the service.

use diabetes_education_core::ports::{DocumentRenderer, PortError, PortResult, SummaryDocument};
use diabetes_education_core::reference::DISCLAIMER;
use diabetes_education_core::split_sections;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::io::BufWriter;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const INDENT: f32 = 25.0;

/// Renders summaries as A4 PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSummaryRenderer;

fn pdf_error(stage: &str, e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(format!("PDF {stage} error: {e}"))
}

/// Tracks the write position and starts a new page when the current one is full.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl PageWriter<'_> {
    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        let step = size * 0.5;
        if self.y - step < BOTTOM {
            self.pages += 1;
            let (page, layer) = self.doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Layer {}", self.pages),
            );
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.y -= step;
    }

    fn wrapped(&mut self, text: &str, size: f32, x: f32, max_chars: usize, font: &IndirectFontRef) {
        for line in wrap_text(text, max_chars) {
            self.line(&line, size, x, font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Markdown emphasis markers are noise in a plain-text PDF.
fn plain(text: &str) -> String {
    text.replace("**", "").replace('`', "")
}

impl DocumentRenderer for PdfSummaryRenderer {
    fn render_summary(&self, document: &SummaryDocument) -> PortResult<Vec<u8>> {
        let (doc, page1, layer1) =
            PdfDocument::new(&document.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error("font", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error("font", e))?;

        let mut writer = PageWriter {
            doc: &doc,
            layer: doc.get_page(page1).get_layer(layer1),
            y: TOP,
            pages: 1,
        };

        writer.line(&document.title, 14.0, LEFT, &bold);
        writer.line(
            &format!("Generated: {}", document.generated_at.format("%Y-%m-%d %H:%M UTC")),
            9.0,
            LEFT,
            &font,
        );
        writer.wrapped(DISCLAIMER, 8.0, LEFT, 100, &font);
        writer.gap(6.0);

        let sections = split_sections(&document.text);
        if sections.is_empty() {
            for paragraph in document.text.lines() {
                writer.wrapped(&plain(paragraph), 9.0, LEFT, 90, &font);
            }
        } else {
            for section in &sections {
                writer.wrapped(
                    &format!("{}) {}", section.number, plain(&section.title)),
                    11.0,
                    LEFT,
                    80,
                    &bold,
                );
                for body_line in section.body.lines() {
                    writer.wrapped(&plain(body_line.trim_end()), 9.0, INDENT, 90, &font);
                }
                writer.gap(4.0);
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf).map_err(|e| pdf_error("save", e))?;
        buf.into_inner().map_err(|e| pdf_error("buffer", e))
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

/// Word-wraps `text`, keeping its leading indentation on the first line.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let indent_len = text.len() - text.trim_start().len();
    let mut lines = Vec::new();
    let mut current = text[..indent_len].to_string();
    let mut has_words = false;

    for word in text.split_whitespace() {
        if has_words && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
            has_words = false;
        }
        if has_words {
            current.push(' ');
        }
        current.push_str(word);
        has_words = true;
    }
    if has_words || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(text: &str) -> SummaryDocument {
        SummaryDocument {
            title: "Your Diabetes Education Summary".to_string(),
            generated_at: Utc::now(),
            text: text.to_string(),
        }
    }

    #[test]
    fn renders_a_pdf_byte_stream() {
        let bytes = PdfSummaryRenderer
            .render_summary(&document("1) **Disclaimer**\nEducation only.\n2) Targets\n- A1C below 7%"))
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_documents_spill_onto_more_pages() {
        let body: String = (0..400).map(|i| format!("- bullet point number {i}\n")).collect();
        let bytes = PdfSummaryRenderer
            .render_summary(&document(&format!("1) Long\n{body}")))
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn text_without_headings_is_still_rendered() {
        let bytes = PdfSummaryRenderer.render_summary(&document("Just a paragraph.")).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn wrap_respects_width_and_indent() {
        let lines = wrap_text("   - one two three four", 12);
        assert_eq!(lines, vec!["   - one two", "three four"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn markdown_markers_are_stripped() {
        assert_eq!(plain("**Red Flags** & `Safety`"), "Red Flags & Safety");
    }
}
