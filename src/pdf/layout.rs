//! Page planning for the quote template.
//!
//! The planner decides, before anything is drawn, which table rows go on
//! which page and where the totals and conditions blocks start. It only
//! deals in vertical positions (millimetres from the bottom edge of an A4
//! page), which keeps pagination testable without parsing PDF output.

use std::ops::Range;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 15.0;

pub const HEADER_BAND_HEIGHT: f32 = 45.0;
pub const PARTIES_TOP: f32 = 237.0;
pub const PARTIES_BOX_HEIGHT: f32 = 42.0;

/// Top of the line-item table on the first page, below the parties blocks.
pub const FIRST_TABLE_TOP: f32 = 190.0;
/// Top of content on continuation pages, below the header band.
pub const NEXT_CONTENT_TOP: f32 = 245.0;
/// Nothing but the footer may be drawn below this line.
pub const CONTENT_BOTTOM: f32 = 40.0;

pub const TABLE_HEADER_HEIGHT: f32 = 10.0;
pub const ROW_HEIGHT: f32 = 8.0;
pub const SECTION_GAP: f32 = 6.0;

/// Heights of the blocks that follow the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionHeights {
    /// Totals and signature box.
    pub summary: f32,
    pub conditions: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub index: usize,
    /// Top edge of the table header band, when this page carries table rows.
    pub table_top: Option<f32>,
    pub rows: Range<usize>,
    pub summary_top: Option<f32>,
    pub conditions_top: Option<f32>,
}

impl PageLayout {
    fn new(index: usize) -> Self {
        Self {
            index,
            table_top: None,
            rows: 0..0,
            summary_top: None,
            conditions_top: None,
        }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    fn content_top(&self) -> f32 {
        if self.is_first() {
            FIRST_TABLE_TOP
        } else {
            NEXT_CONTENT_TOP
        }
    }
}

/// Bottom edge of the `position`-th row drawn under a table header at `table_top`.
pub fn row_bottom(table_top: f32, position: usize) -> f32 {
    table_top - TABLE_HEADER_HEIGHT - (position as f32 + 1.0) * ROW_HEIGHT
}

/// Lay `row_count` table rows out over as many pages as needed.
///
/// A page break happens whenever the next row, the summary block or the
/// conditions block would cross [`CONTENT_BOTTOM`]. The first page always
/// carries the table header, even without rows.
pub fn plan_pages(row_count: usize, heights: SectionHeights) -> Vec<PageLayout> {
    let mut pages = Vec::new();
    let mut page = PageLayout::new(0);
    let mut cursor = page.content_top();
    let mut next_row = 0;

    loop {
        page.table_top = Some(cursor);
        let mut y = cursor - TABLE_HEADER_HEIGHT;
        let start = next_row;
        while next_row < row_count && y - ROW_HEIGHT >= CONTENT_BOTTOM {
            y -= ROW_HEIGHT;
            next_row += 1;
        }
        page.rows = start..next_row;
        cursor = y;

        if next_row >= row_count {
            break;
        }
        let index = page.index + 1;
        pages.push(page);
        page = PageLayout::new(index);
        cursor = page.content_top();
    }

    cursor -= SECTION_GAP;
    if cursor - heights.summary < CONTENT_BOTTOM {
        let index = page.index + 1;
        pages.push(page);
        page = PageLayout::new(index);
        cursor = page.content_top();
    }
    page.summary_top = Some(cursor);
    cursor -= heights.summary + SECTION_GAP;

    if cursor - heights.conditions < CONTENT_BOTTOM {
        let index = page.index + 1;
        pages.push(page);
        page = PageLayout::new(index);
        cursor = page.content_top();
    }
    page.conditions_top = Some(cursor);
    pages.push(page);

    pages
}
