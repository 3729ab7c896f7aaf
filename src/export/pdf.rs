//! PDF rendering on top of `printpdf`.

use alloc::borrow::Cow;
use core::fmt;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::{LedgerError, Result};

use super::layout::{Canvas, LayoutStats, PageGeometry, TextStyle, layout_with};
use super::report::{REPORT_TITLE, Report};

/// Name of the single layer on every page.
const LAYER_NAME: &str = "Layer 1";

/// A [`Canvas`] that draws into a PDF document with the built-in Helvetica
/// faces.
pub struct PdfCanvas {
    /// Document being built.
    document: PdfDocumentReference,
    /// Layer of the current page.
    layer: PdfLayerReference,
    /// Regular face.
    regular: IndirectFontRef,
    /// Bold face.
    bold: IndirectFontRef,
    /// Page size used for new pages.
    geometry: PageGeometry,
    /// Pages created so far.
    pages: usize,
}

impl fmt::Debug for PdfCanvas {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfCanvas")
            .field("geometry", &self.geometry)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

/// Stand-in for characters the built-in faces cannot encode.
const UNENCODABLE: char = '?';

/// Replaces characters outside Latin-1 with [`UNENCODABLE`].
///
/// The built-in faces are encoded as WinAnsi, so anything beyond U+00FF
/// would otherwise come out as unrelated glyphs.
pub(crate) fn encodable(text: &str) -> Cow<'_, str> {
    if text.chars().all(|ch| u32::from(ch) <= 0xFF) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|ch| if u32::from(ch) <= 0xFF { ch } else { UNENCODABLE })
                .collect(),
        )
    }
}

/// Wraps a document engine error.
fn document_error(err: &printpdf::Error) -> LedgerError {
    LedgerError::Document(err.to_string())
}

impl PdfCanvas {
    /// Creates a document with one empty page.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Document`] if the fonts cannot be registered.
    #[inline]
    pub fn new(title: &str, geometry: PageGeometry) -> Result<Self> {
        let (document, page, layer) = PdfDocument::new(
            title,
            Mm(geometry.width),
            Mm(geometry.height),
            LAYER_NAME,
        );
        let regular = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| document_error(&err))?;
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| document_error(&err))?;
        let layer = document.get_page(page).get_layer(layer);
        Ok(Self {
            document,
            layer,
            regular,
            bold,
            geometry,
            pages: 1,
        })
    }

    /// Number of pages in the document.
    #[inline]
    #[must_use]
    pub const fn pages(&self) -> usize {
        self.pages
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Document`] if serialization fails.
    #[inline]
    pub fn finish(self) -> Result<Vec<u8>> {
        self.document
            .save_to_bytes()
            .map_err(|err| document_error(&err))
    }
}

impl Canvas for PdfCanvas {
    fn new_page(&mut self) {
        let (page, layer) = self.document.add_page(
            Mm(self.geometry.width),
            Mm(self.geometry.height),
            LAYER_NAME,
        );
        self.layer = self.document.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        let font = if style.is_bold() {
            &self.bold
        } else {
            &self.regular
        };
        self.layer
            .use_text(encodable(text), style.font_size(), Mm(x), Mm(y), font);
    }
}

/// Renders `report` as a paginated A4 PDF table.
///
/// Text is set in the built-in Helvetica faces, which cover Latin-1 only.
/// Other characters, e.g. Amharic names, are printed as `?`. The CSV export
/// keeps them intact.
///
/// # Errors
///
/// Returns [`LedgerError::Document`] if the document engine fails.
#[tracing::instrument(skip_all, fields(rows = report.rows.len()))]
pub fn render_pdf(report: &Report) -> Result<Vec<u8>> {
    let mut canvas = PdfCanvas::new(REPORT_TITLE, PageGeometry::A4)?;
    let LayoutStats { pages, rows_drawn } = layout_with(&mut canvas, report, PageGeometry::A4);
    tracing::debug!(pages, rows_drawn, "laid out PDF");
    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterSet, NaiveDate, Transaction, TransactionId, TransactionKind};
    use rust_decimal::Decimal;

    fn report(count: usize) -> Report {
        let rows = (0..count)
            .map(|index| Transaction {
                id: TransactionId::new(i64::try_from(index).unwrap()),
                member_id: None,
                amount: Decimal::from(index),
                kind: if index % 2 == 0 {
                    TransactionKind::Income
                } else {
                    TransactionKind::Expense
                },
                category: "membership".to_owned(),
                description: Some("Monthly \"gold\" plan".to_owned()),
                payment_method: Some("cash".to_owned()),
                occurred_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                member: None,
            })
            .collect();
        let generated_at = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Report::new(rows, &FilterSet::new(), generated_at).unwrap()
    }

    #[test]
    fn empty_report_is_a_valid_pdf() {
        let bytes = render_pdf(&report(0)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn canvas_counts_pages() {
        let mut canvas = PdfCanvas::new("test", PageGeometry::A4).unwrap();
        let stats = layout_with(&mut canvas, &report(200), PageGeometry::A4);
        assert_eq!(stats.rows_drawn, 200);
        assert_eq!(canvas.pages(), stats.pages);
        assert!(stats.pages > 1);
        let bytes = canvas.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn debug_lists_geometry() {
        let canvas = PdfCanvas::new("test", PageGeometry::A4).unwrap();
        let rendered = format!("{canvas:?}");
        assert!(rendered.contains("PdfCanvas"));
        assert!(rendered.contains("pages: 1"));
    }

    #[test]
    fn latin1_text_is_kept() {
        assert!(matches!(encodable("Caf\u{e9} \"gold\" plan"), Cow::Borrowed(_)));
    }

    #[test]
    fn text_beyond_latin1_is_replaced() {
        assert_eq!(encodable("\u{12a0}\u{1260}\u{1260} Bekele"), "??? Bekele");
        assert_eq!(encodable("ETB \u{2014} 5"), "ETB ? 5");
    }

    #[test]
    fn non_latin1_rows_still_render() {
        let mut amharic = report(1);
        amharic.rows[0].description = Some("\u{12a0}\u{1260}\u{1260} monthly".to_owned());
        let bytes = render_pdf(&amharic).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
