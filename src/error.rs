use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tried to fetch page number out of bounds. {page_num} >= {max}")]
    CapacityExceeded { page_num: usize, max: usize },

    #[error("Table full.")]
    TableFull,
}

/// Failures while turning an input line into a [`crate::command::Statement`].
/// None of them touch the table.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Unrecognized command: {0}")]
    UnrecognizedStatement(String),

    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("String is too long.")]
    StringTooLong,

    #[error("ID must be positive.")]
    NegativeId,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MetaCommandError {
    #[error("Unrecognized meta-command: {0}")]
    Unrecognized(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
