//! Page layout for the tabular report.
//!
//! Layout is independent of the document engine: it drives a [`Canvas`],
//! which only knows how to start a page and place a line of text. The PDF
//! renderer implements it with a real document; tests use a recorder.

use super::report::{REPORT_TITLE, Report};
use super::text::{RowText, format_currency, sanitize, single_line, truncate};

/// Text styles used by the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    /// Report title.
    Title,
    /// Summary and totals lines.
    Body,
    /// Table header cells.
    Header,
    /// Table data cells.
    Cell,
}

impl TextStyle {
    /// Font size in points.
    #[inline]
    #[must_use]
    pub const fn font_size(self) -> f32 {
        match self {
            Self::Title => 16.0,
            Self::Body => 10.0,
            Self::Header => 8.5,
            Self::Cell => 8.0,
        }
    }

    /// Whether the style uses the bold face.
    #[inline]
    #[must_use]
    pub const fn is_bold(self) -> bool {
        matches!(self, Self::Title | Self::Header)
    }
}

/// Drawing surface for the layout.
pub trait Canvas {
    /// Starts a new page. The first page exists before layout begins.
    fn new_page(&mut self);

    /// Places one line of text with its baseline at `(x, y)`, in
    /// millimetres from the bottom-left corner of the current page.
    fn text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);
}

/// Page size, margin and line heights, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Margin on every side.
    pub margin: f32,
    /// Height of a title line.
    pub title_height: f32,
    /// Height of a summary or totals line.
    pub line_height: f32,
    /// Height of the table header block.
    pub header_height: f32,
    /// Height of a table row.
    pub row_height: f32,
}

impl PageGeometry {
    /// A4 portrait with a 14 mm margin.
    pub const A4: Self = Self {
        width: 210.0,
        height: 297.0,
        margin: 14.0,
        title_height: 10.0,
        line_height: 6.0,
        header_height: 8.0,
        row_height: 6.0,
    };

    /// Width available between the side margins.
    #[inline]
    #[must_use]
    pub fn printable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Vertical position of the top margin.
    #[inline]
    #[must_use]
    pub fn top(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageGeometry {
    #[inline]
    fn default() -> Self {
        Self::A4
    }
}

/// One table column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Header text.
    pub title: &'static str,
    /// Width in millimetres.
    pub width: f32,
    /// Cell text beyond this many characters is cut off.
    pub max_chars: usize,
}

/// Table columns, left to right.
pub const COLUMNS: [Column; 7] = [
    Column { title: "Date", width: 20.0, max_chars: 10 },
    Column { title: "Type", width: 22.0, max_chars: 12 },
    Column { title: "Description", width: 40.0, max_chars: 24 },
    Column { title: "Member", width: 30.0, max_chars: 18 },
    Column { title: "Payment", width: 20.0, max_chars: 11 },
    Column { title: "Category", width: 22.0, max_chars: 12 },
    Column { title: "Amount", width: 26.0, max_chars: 16 },
];

/// Outcome of a layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Pages used.
    pub pages: usize,
    /// Data rows drawn.
    pub rows_drawn: usize,
}

/// Vertical cursor over a canvas.
struct Cursor<'canvas, C> {
    /// Target surface.
    canvas: &'canvas mut C,
    /// Page geometry.
    geometry: PageGeometry,
    /// Current vertical position.
    y: f32,
    /// Pages started so far.
    pages: usize,
}

impl<C: Canvas> Cursor<'_, C> {
    /// Space left above the bottom margin.
    fn remaining(&self) -> f32 {
        self.y - self.geometry.margin
    }

    /// Moves to a fresh page.
    fn break_page(&mut self) {
        self.canvas.new_page();
        self.pages += 1;
        self.y = self.geometry.top();
        tracing::trace!(page = self.pages, "page break");
    }

    /// Starts a new page if less than `height` remains. Returns `true` if a
    /// page was started.
    fn ensure(&mut self, height: f32) -> bool {
        if self.remaining() < height {
            self.break_page();
            true
        } else {
            false
        }
    }

    /// Places a full-width line of `height`.
    fn line(&mut self, text: &str, height: f32, style: TextStyle) {
        _ = self.ensure(height);
        let x = self.geometry.margin;
        self.y -= height;
        self.canvas.text(text, x, self.y, style);
    }

    /// Places one cell per column at accumulated x offsets.
    fn cells(&mut self, cells: &[&str], height: f32, style: TextStyle) {
        self.y -= height;
        let mut x = self.geometry.margin;
        for (column, cell) in COLUMNS.iter().zip(cells) {
            let text = truncate(&single_line(cell), column.max_chars);
            self.canvas.text(&text, x, self.y, style);
            x += column.width;
        }
    }

    /// Draws the table header, breaking the page first if it does not fit.
    fn header(&mut self) {
        _ = self.ensure(self.geometry.header_height);
        let titles = COLUMNS.map(|column| column.title);
        self.cells(&titles, self.geometry.header_height, TextStyle::Header);
    }
}

/// Lays `report` out on `canvas`.
///
/// The table header is drawn after the summary block on the first page and
/// again at the top of every page a row spills onto.
pub fn layout_document<C: Canvas>(canvas: &mut C, report: &Report) -> LayoutStats {
    layout_with(canvas, report, PageGeometry::A4)
}

/// Lays `report` out on `canvas` with custom page geometry.
pub fn layout_with<C: Canvas>(canvas: &mut C, report: &Report, geometry: PageGeometry) -> LayoutStats {
    let mut cursor = Cursor {
        canvas,
        geometry,
        y: geometry.top(),
        pages: 1,
    };

    cursor.line(REPORT_TITLE, geometry.title_height, TextStyle::Title);
    let summary_lines = [
        format!("Generated: {}", report.timestamp()),
        format!("Filters: {}", single_line(&sanitize(&report.summary))),
        format!("Total Income: {}", format_currency(report.totals.income)),
        format!("Total Outflow: {}", format_currency(report.totals.outflow)),
        format!("Net: {}", format_currency(report.totals.net)),
    ];
    for line in &summary_lines {
        cursor.line(line, geometry.line_height, TextStyle::Body);
    }
    cursor.header();

    let mut rows_drawn = 0_usize;
    for tx in &report.rows {
        if cursor.ensure(geometry.row_height) {
            cursor.header();
        }
        let row = RowText::from_transaction(tx);
        cursor.cells(&row.table_cells(), geometry.row_height, TextStyle::Cell);
        rows_drawn += 1;
    }

    LayoutStats {
        pages: cursor.pages,
        rows_drawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FilterSet, NaiveDate, Transaction, TransactionId, TransactionKind};
    use rust_decimal::Decimal;

    /// Something drawn on a [`Recorder`].
    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        /// A page break.
        Page,
        /// A line of text.
        Text(String, f32, f32, TextStyle),
    }

    /// Canvas that records what it is asked to draw.
    #[derive(Debug, Default)]
    struct Recorder {
        /// Draw calls in order.
        events: Vec<Event>,
    }

    impl Canvas for Recorder {
        fn new_page(&mut self) {
            self.events.push(Event::Page);
        }

        fn text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
            self.events.push(Event::Text(text.to_owned(), x, y, style));
        }
    }

    impl Recorder {
        /// Text events grouped by page.
        fn pages(&self) -> Vec<Vec<(String, TextStyle)>> {
            let mut pages = vec![Vec::new()];
            for event in &self.events {
                match event {
                    Event::Page => pages.push(Vec::new()),
                    Event::Text(text, _, _, style) => {
                        pages.last_mut().unwrap().push((text.clone(), *style));
                    }
                }
            }
            pages
        }
    }

    fn report(count: usize) -> Report {
        let rows = (0..count)
            .map(|index| Transaction {
                id: TransactionId::new(i64::try_from(index).unwrap()),
                member_id: None,
                amount: Decimal::from(index),
                kind: TransactionKind::Income,
                category: "membership".to_owned(),
                description: Some(format!("row {index}")),
                payment_method: None,
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

    fn render(count: usize) -> (Recorder, LayoutStats) {
        let mut recorder = Recorder::default();
        let stats = layout_document(&mut recorder, &report(count));
        (recorder, stats)
    }

    fn descriptions(page: &[(String, TextStyle)]) -> Vec<String> {
        page.iter()
            .filter(|(text, style)| *style == TextStyle::Cell && text.starts_with("row "))
            .map(|(text, _)| text.clone())
            .collect()
    }

    fn header_cells(page: &[(String, TextStyle)]) -> usize {
        page.iter()
            .filter(|(_, style)| *style == TextStyle::Header)
            .count()
    }

    fn first_page_capacity() -> usize {
        let (recorder, _) = render(500);
        descriptions(&recorder.pages()[0]).len()
    }

    #[test]
    fn columns_fit_printable_width() {
        let total: f32 = COLUMNS.iter().map(|column| column.width).sum();
        assert!(total < PageGeometry::A4.printable_width());
    }

    #[test]
    fn empty_report_has_header_without_rows() {
        let (recorder, stats) = render(0);
        assert_eq!(stats, LayoutStats { pages: 1, rows_drawn: 0 });
        let pages = recorder.pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(header_cells(&pages[0]), COLUMNS.len());
        assert!(pages[0].iter().all(|(_, style)| *style != TextStyle::Cell));
        assert_eq!(pages[0][0], ("Finance Report".to_owned(), TextStyle::Title));
        assert!(pages[0].iter().any(|(text, _)| text == "Filters: All filters"));
        assert!(pages[0].iter().any(|(text, _)| text == "Net: ETB 0.00"));
    }

    #[test]
    fn overflow_by_one_row_repeats_header() {
        let capacity = first_page_capacity();
        assert!(capacity > 0);

        let (full, full_stats) = render(capacity);
        assert_eq!(full_stats.pages, 1);
        assert_eq!(full.pages().len(), 1);

        let (recorder, stats) = render(capacity + 1);
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.rows_drawn, capacity + 1);
        let pages = recorder.pages();
        assert_eq!(pages.len(), 2);

        let second = &pages[1];
        let titles: Vec<&str> = second
            .iter()
            .take(COLUMNS.len())
            .map(|(text, _)| text.as_str())
            .collect();
        let expected: Vec<&str> = COLUMNS.iter().map(|column| column.title).collect();
        assert_eq!(titles, expected);
        assert!(second.iter().take(COLUMNS.len()).all(|(_, style)| *style == TextStyle::Header));
        assert_eq!(second[COLUMNS.len()].0, "2024-01-01");
        assert_eq!(descriptions(second), vec![format!("row {capacity}")]);
    }

    #[test]
    fn every_row_drawn_exactly_once() {
        let (recorder, stats) = render(180);
        assert_eq!(stats.rows_drawn, 180);
        let drawn: Vec<String> = recorder.pages().iter().flat_map(|page| descriptions(page)).collect();
        let expected: Vec<String> = (0..180).map(|index| format!("row {index}")).collect();
        assert_eq!(drawn, expected);
        for page in recorder.pages() {
            assert_eq!(header_cells(&page), COLUMNS.len());
        }
    }

    #[test]
    fn nothing_drawn_below_the_margin() {
        let (recorder, _) = render(120);
        let margin = PageGeometry::A4.margin;
        for event in &recorder.events {
            if let Event::Text(_, x, y, _) = event {
                assert!(*y >= margin, "baseline {y} below margin");
                assert!(*x >= margin);
                assert!(*x < PageGeometry::A4.width - margin);
            }
        }
    }

    #[test]
    fn long_cells_are_truncated() {
        let mut report = report(1);
        report.rows[0].description = Some("Annual membership with personal trainer sessions".to_owned());
        report.rows[0].category = "supplements\nand drinks".to_owned();
        let mut recorder = Recorder::default();
        let _stats = layout_document(&mut recorder, &report);
        let cells: Vec<String> = recorder.pages()[0]
            .iter()
            .filter(|(_, style)| *style == TextStyle::Cell)
            .map(|(text, _)| text.clone())
            .collect();
        assert_eq!(cells[2], "Annual membership with p");
        assert_eq!(cells[2].chars().count(), COLUMNS[2].max_chars);
        assert_eq!(cells[5], "supplements ");
    }

    #[test]
    fn column_offsets_accumulate() {
        let (recorder, _) = render(1);
        let xs: Vec<f32> = recorder
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Text(_, x, _, TextStyle::Cell) => Some(*x),
                Event::Text(..) | Event::Page => None,
            })
            .collect();
        assert_eq!(xs, vec![14.0, 34.0, 56.0, 96.0, 126.0, 146.0, 168.0]);
    }
}
