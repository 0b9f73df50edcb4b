//! Fixed-grid table layout.
//!
//! Every column gets the same width, `page_width / column_count - column_margin`,
//! whatever its content. Rows are stacked from the top margin and a new page
//! starts whenever the next row would cross the page-break line. The header row
//! is placed once, at the top of the first page.

use crate::utils::{config::PageLayout, types::TabularData};

/// A laid-out report, lengths in millimetres with the origin at the top-left corner
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<PageRow>,
}

/// One table row at a fixed vertical position
#[derive(Debug, Clone, PartialEq)]
pub struct PageRow {
    pub y: f32,
    pub height: f32,
    pub is_header: bool,
    pub cells: Vec<Cell>,
}

/// One bordered cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub width: f32,
    pub text: String,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Data rows across all pages, header excluded
    pub fn data_row_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| page.rows.iter())
            .filter(|row| !row.is_header)
            .count()
    }
}

/// Width shared by every column
pub fn column_width(page_width: f32, column_count: usize, column_margin: f32) -> f32 {
    page_width / column_count.max(1) as f32 - column_margin
}

/// Lay out the header and every data row of `data`
pub fn layout_report(data: &TabularData, layout: &PageLayout) -> ReportDocument {
    let (page_width, page_height) = layout.page_dimensions();
    let width = column_width(page_width, data.column_count(), layout.column_margin);

    let mut builder = LayoutBuilder {
        layout,
        width,
        y: layout.margin_top,
        document: ReportDocument {
            page_width,
            page_height,
            pages: vec![Page::default()],
        },
    };

    builder.place_row(data.column_names().map(str::to_string), true);
    for row in &data.rows {
        builder.place_row(row.values.iter().map(|value| value.to_string()), false);
    }

    builder.document
}

struct LayoutBuilder<'a> {
    layout: &'a PageLayout,
    width: f32,
    y: f32,
    document: ReportDocument,
}

impl LayoutBuilder<'_> {
    fn place_row(&mut self, texts: impl Iterator<Item = String>, is_header: bool) {
        let height = self.layout.row_height;
        if self.y + height > self.layout.page_break_trigger() {
            self.document.pages.push(Page::default());
            self.y = self.layout.margin_top;
        }

        let cells = texts
            .enumerate()
            .map(|(index, text)| Cell {
                x: self.layout.margin_left + index as f32 * self.width,
                width: self.width,
                text,
            })
            .collect();

        let row = PageRow {
            y: self.y,
            height,
            is_header,
            cells,
        };
        if let Some(page) = self.document.pages.last_mut() {
            page.rows.push(row);
        }
        self.y += height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::PageSize;
    use crate::utils::types::{Row, Value};

    fn numbered_table(columns: usize, rows: usize) -> TabularData {
        let mut table = TabularData::with_column_names((0..columns).map(|c| format!("col{}", c)));
        for r in 0..rows {
            let values = (0..columns).map(|c| Value::Integer((r * columns + c) as i64)).collect();
            table.push_row(Row::new(values)).unwrap();
        }
        table
    }

    #[test]
    fn test_column_width() {
        assert_eq!(column_width(210.0, 3, 1.0), 69.0);
        assert_eq!(column_width(210.0, 1, 1.0), 209.0);
        assert_eq!(column_width(200.0, 4, 0.0), 50.0);
    }

    #[test]
    fn test_every_row_has_equal_width_cells() {
        let table = numbered_table(4, 5);
        let document = layout_report(&table, &PageLayout::default());
        let expected_width = 210.0 / 4.0 - 1.0;

        let rows: Vec<&PageRow> = document.pages.iter().flat_map(|p| p.rows.iter()).collect();
        assert_eq!(rows.len(), 6);
        for row in rows {
            assert_eq!(row.cells.len(), 4);
            for (index, cell) in row.cells.iter().enumerate() {
                assert_eq!(cell.width, expected_width);
                assert_eq!(cell.x, 10.0 + index as f32 * expected_width);
            }
        }
    }

    #[test]
    fn test_header_comes_first() {
        let table = numbered_table(2, 1);
        let document = layout_report(&table, &PageLayout::default());
        let first_page = &document.pages[0];

        assert!(first_page.rows[0].is_header);
        assert_eq!(first_page.rows[0].y, 10.0);
        let header: Vec<&str> = first_page.rows[0].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(header, vec!["col0", "col1"]);

        let data: Vec<&str> = first_page.rows[1].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(data, vec!["0", "1"]);
        assert_eq!(first_page.rows[1].y, 20.0);
    }

    #[test]
    fn test_pagination_on_a4() {
        // Header plus 26 data rows fill the first page exactly
        let document = layout_report(&numbered_table(2, 26), &PageLayout::default());
        assert_eq!(document.page_count(), 1);
        assert_eq!(document.pages[0].rows.len(), 27);
        assert_eq!(document.pages[0].rows[26].y, 270.0);

        let document = layout_report(&numbered_table(2, 27), &PageLayout::default());
        assert_eq!(document.page_count(), 2);
        assert_eq!(document.pages[1].rows.len(), 1);
        assert_eq!(document.pages[1].rows[0].y, 10.0);
        assert!(!document.pages[1].rows[0].is_header);
    }

    #[test]
    fn test_all_rows_are_kept_in_order() {
        let table = numbered_table(1, 100);
        let document = layout_report(&table, &PageLayout::default());

        assert_eq!(document.data_row_count(), 100);
        assert_eq!(document.page_count(), 4);

        let texts: Vec<String> = document
            .pages
            .iter()
            .flat_map(|p| p.rows.iter())
            .filter(|r| !r.is_header)
            .map(|r| r.cells[0].text.clone())
            .collect();
        let expected: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_custom_page_size() {
        let layout = PageLayout {
            page_size: PageSize::Custom { width: 100.0, height: 60.0 },
            ..PageLayout::default()
        };
        // Break line at 45mm: rows at 10, 20, 30 fit, the fourth starts a page
        let document = layout_report(&numbered_table(5, 5), &layout);

        assert_eq!(document.pages[0].rows.len(), 3);
        assert_eq!(document.pages[0].rows[0].cells[0].width, 19.0);
        assert_eq!(document.page_count(), 2);
    }
}
