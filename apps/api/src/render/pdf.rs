//! Plain-text → PDF rendering with builtin fonts.
//!
//! Layout: A4, centered bold title, wrapped body, automatic page breaks. CPU-bound;
//! call from `tokio::task::spawn_blocking`.

use anyhow::{anyhow, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use unicode_normalization::UnicodeNormalization;

use crate::render::metrics::{get_metrics, ReportFont};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const TITLE_SIZE_PT: f32 = 14.0;
const BODY_SIZE_PT: f32 = 11.0;
const TITLE_LINE_MM: f32 = 8.0;
const BODY_LINE_MM: f32 = 5.5;
const TITLE_GAP_MM: f32 = 6.0;
const MM_PER_PT: f32 = 25.4 / 72.0;
const LAYER_NAME: &str = "Layer 1";

/// Renders a report with `title` centered on the first page and `body` below it.
pub fn render_pdf(title: &str, body: &str) -> Result<Vec<u8>> {
    let title = fold_to_ascii(title);
    let body = fold_to_ascii(body);

    let (doc, page, layer) = PdfDocument::new(
        title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Failed to load Helvetica: {e:?}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("Failed to load Helvetica-Bold: {e:?}"))?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    let title_metrics = get_metrics(ReportFont::HelveticaBold);
    for line in title_metrics.wrap(&title, width_em(TITLE_SIZE_PT)) {
        let line_width_mm = title_metrics.measure_str(&line) * TITLE_SIZE_PT * MM_PER_PT;
        let x = ((PAGE_WIDTH_MM - line_width_mm) / 2.0).max(MARGIN_MM);
        current.use_text(line, TITLE_SIZE_PT, Mm(x), Mm(y), &bold);
        y -= TITLE_LINE_MM;
    }
    y -= TITLE_GAP_MM;

    let body_metrics = get_metrics(ReportFont::Helvetica);
    for line in body_metrics.wrap(&body, width_em(BODY_SIZE_PT)) {
        if y < MARGIN_MM {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            current = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        if !line.is_empty() {
            current.use_text(line, BODY_SIZE_PT, Mm(MARGIN_MM), Mm(y), &regular);
        }
        y -= BODY_LINE_MM;
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to serialize PDF: {e:?}"))
}

/// Usable text width in em units at `font_size_pt`.
fn width_em(font_size_pt: f32) -> f32 {
    let width_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / MM_PER_PT;
    width_pt / font_size_pt
}

/// Builtin PDF fonts only cover Latin-1-ish glyphs; fold accents away (NFKD) and replace
/// what is left with close ASCII or `?`.
pub fn fold_to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfkd() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push(' '),
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => out.push(c),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2022}' | '\u{00B7}' => out.push('-'),
            '\u{20AC}' => out.push_str("EUR"),
            '\u{00A0}' => out.push(' '),
            c if is_combining_mark(c) => {}
            _ => out.push('?'),
        }
    }
    out
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Análisis de CV – José"), "Analisis de CV - Jose");
        assert_eq!(fold_to_ascii("“quoted” • item"), "\"quoted\" - item");
        assert_eq!(fold_to_ascii("a\tb\r\nc"), "a b\nc");
        assert_eq!(fold_to_ascii("日本"), "??");
    }

    #[test]
    fn test_render_pdf_produces_pdf_bytes() {
        let bytes = render_pdf("CV analysis - Ana", "Date: 01/01/2025\n\nSkills: Rust").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_pdf_handles_long_bodies() {
        let body = "Experience line that keeps going on and on.\n".repeat(200);
        let bytes = render_pdf("Long report", &body).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
