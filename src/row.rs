use std::fmt;

use crate::{EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Encodes the row into the first `ROW_SIZE` bytes of `slot`.
    ///
    /// Strings longer than their column are truncated to the column width.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is shorter than `ROW_SIZE`.
    pub fn serialize(&self, slot: &mut [u8]) {
        let slot = &mut slot[..ROW_SIZE];
        slot[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        write_fixed(
            &mut slot[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            &self.username,
        );
        write_fixed(&mut slot[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE], &self.email);
    }

    /// Decodes a row from the first `ROW_SIZE` bytes of `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is shorter than `ROW_SIZE`.
    pub fn deserialize(slot: &[u8]) -> Self {
        let slot = &slot[..ROW_SIZE];
        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(&slot[ID_OFFSET..ID_OFFSET + ID_SIZE]);

        Self {
            id: u32::from_le_bytes(id),
            username: read_fixed(&slot[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_fixed(&slot[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn write_fixed(column: &mut [u8], value: &str) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(column.len());
    column[..len].copy_from_slice(&bytes[..len]);
    column[len..].fill(0);
}

// NUL is the padding byte, so everything from the last non-NUL onwards is dropped.
fn read_fixed(column: &[u8]) -> String {
    let end = column.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&column[..end]).into_owned()
}
