use std::path::Path;

use crate::error::{DbError, Result};
use crate::pager::Pager;
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_ROWS};

/// An append-only table of fixed-width rows.
///
/// Rows live in pages at `page_num * PAGE_SIZE`; a page holds
/// `ROWS_PER_PAGE` rows and any tail past the last slot is unused.
/// Nothing is written to disk until [`Table::close`].
pub struct Table {
    pager: Pager,
    num_rows: usize,
}

impl Table {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pager = Pager::open(path)?;
        let file_length = pager.file_length() as usize;

        let full_pages = file_length / PAGE_SIZE;
        let tail_rows = (file_length % PAGE_SIZE) / ROW_SIZE;
        let num_rows = (full_pages * ROWS_PER_PAGE + tail_rows).min(TABLE_MAX_ROWS);

        Ok(Self { pager, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn insert(&mut self, row: &Row) -> Result<()> {
        if self.num_rows >= TABLE_MAX_ROWS {
            return Err(DbError::TableFull);
        }

        let slot = self.row_slot(self.num_rows)?;
        row.serialize(slot);
        self.num_rows += 1;
        Ok(())
    }

    pub fn select(&mut self) -> Cursor<'_> {
        Cursor {
            table: self,
            row_num: 0,
        }
    }

    /// Writes every row back to disk and releases the file.
    pub fn close(mut self) -> Result<()> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        for page_num in 0..num_full_pages {
            self.pager.flush(page_num, PAGE_SIZE)?;
        }

        let additional_rows = self.num_rows % ROWS_PER_PAGE;
        if additional_rows > 0 {
            self.pager.flush(num_full_pages, additional_rows * ROW_SIZE)?;
        }

        self.pager.sync()
    }

    fn row_slot(&mut self, row_num: usize) -> Result<&mut [u8]> {
        let (page_num, byte_offset) = row_location(row_num);
        let page = self.pager.get_page(page_num)?;
        Ok(&mut page[byte_offset..byte_offset + ROW_SIZE])
    }
}

/// Maps a row number to its page and the byte offset inside that page.
pub fn row_location(row_num: usize) -> (usize, usize) {
    let page_num = row_num / ROWS_PER_PAGE;
    let row_offset = row_num % ROWS_PER_PAGE;
    (page_num, row_offset * ROW_SIZE)
}

/// Sequential scan over the rows present when the cursor was created.
pub struct Cursor<'a> {
    table: &'a mut Table,
    row_num: usize,
}

impl Iterator for Cursor<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row_num >= self.table.num_rows {
            return None;
        }

        let row = self.table.row_slot(self.row_num).map(|slot| Row::deserialize(slot));
        self.row_num += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.num_rows.saturating_sub(self.row_num);
        (remaining, Some(remaining))
    }
}
