use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{DbError, Result};
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

type Page = Box<[u8; PAGE_SIZE]>;

/// Owns the database file and a cache of its pages.
///
/// Pages are loaded on first use and stay resident until the pager is
/// dropped.
pub struct Pager {
    file: File,
    file_length: u64,
    pages: Vec<Option<Page>>,
}

impl Pager {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let file_length = file.metadata()?.len();

        Ok(Self {
            file,
            file_length,
            pages: vec![None; TABLE_MAX_PAGES],
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn get_page(&mut self, page_num: usize) -> Result<&mut [u8]> {
        if page_num >= TABLE_MAX_PAGES {
            return Err(DbError::CapacityExceeded {
                page_num,
                max: TABLE_MAX_PAGES,
            });
        }

        let page = match &mut self.pages[page_num] {
            Some(page) => page,
            slot @ None => slot.insert(load_page(&mut self.file, self.file_length, page_num)?),
        };
        Ok(&mut page[..])
    }

    /// Writes the first `size` bytes of a cached page back to its
    /// page-aligned position. Uncached pages are already on disk.
    pub(crate) fn flush(&mut self, page_num: usize, size: usize) -> Result<()> {
        let Some(page) = self.pages.get(page_num).and_then(Option::as_deref) else {
            return Ok(());
        };

        let offset = (page_num * PAGE_SIZE) as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&page[..size])?;
        self.file_length = self.file_length.max(offset + size as u64);
        Ok(())
    }

    pub(crate) fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

fn load_page(file: &mut File, file_length: u64, page_num: usize) -> Result<Page> {
    let mut page: Page = Box::new([0; PAGE_SIZE]);

    let mut num_pages = file_length / PAGE_SIZE as u64;
    if file_length % PAGE_SIZE as u64 != 0 {
        num_pages += 1;
    }

    if (page_num as u64) < num_pages {
        file.seek(SeekFrom::Start((page_num * PAGE_SIZE) as u64))?;
        read_until_eof(file, &mut page[..])?;
    }

    Ok(page)
}

// A short read at the end of the file leaves the rest of `buf` untouched.
fn read_until_eof(file: &mut File, mut buf: &mut [u8]) -> Result<()> {
    while !buf.is_empty() {
        match file.read(buf) {
            Ok(0) => break,
            Ok(n) => buf = &mut buf[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
