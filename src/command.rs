use std::io::Write;

use crate::error::{DbError, MetaCommandError, PrepareError, Result};
use crate::row::Row;
use crate::table::Table;
use crate::{EMAIL_SIZE, USERNAME_SIZE};

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
}

impl MetaCommand {
    /// Returns `None` when the line is not a meta-command at all.
    pub fn parse(input: &str) -> Option<std::result::Result<MetaCommand, MetaCommandError>> {
        match input {
            ".exit" => Some(Ok(MetaCommand::Exit)),
            _ if input.starts_with('.') => {
                Some(Err(MetaCommandError::Unrecognized(input.to_string())))
            }
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

impl Statement {
    pub fn prepare(input: &str) -> std::result::Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        match tokens.next() {
            Some("insert") => prepare_insert(tokens.collect()),
            Some("select") if tokens.next().is_none() => Ok(Statement::Select),
            Some("select") => Err(PrepareError::SyntaxError),
            _ => Err(PrepareError::UnrecognizedStatement(input.to_string())),
        }
    }
}

fn prepare_insert(args: Vec<&str>) -> std::result::Result<Statement, PrepareError> {
    let [id, username, email] = args[..] else {
        return Err(PrepareError::SyntaxError);
    };

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    if username.len() > USERNAME_SIZE || email.len() > EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }

    Ok(Statement::Insert(Row::new(id, username, email)))
}

#[derive(Debug, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    Rows(Vec<Row>),
}

pub fn execute(statement: Statement, table: &mut Table) -> Result<ExecuteResult> {
    match statement {
        Statement::Insert(row) => {
            table.insert(&row)?;
            Ok(ExecuteResult::Inserted)
        }
        Statement::Select => {
            let rows = table.select().collect::<Result<Vec<_>>>()?;
            Ok(ExecuteResult::Rows(rows))
        }
    }
}

/// What the driver should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Runs input lines against a table, reporting to `out`.
pub struct Interpreter<W: Write> {
    table: Table,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(table: Table, out: W) -> Self {
        Self { table, out }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Handles one line. Only I/O failures and page-capacity errors are
    /// returned; everything else is reported to the sink.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        match MetaCommand::parse(line) {
            Some(Ok(MetaCommand::Exit)) => return Ok(Flow::Exit),
            Some(Err(err)) => {
                writeln!(self.out, "{err}")?;
                return Ok(Flow::Continue);
            }
            None => {}
        }

        let statement = match Statement::prepare(line) {
            Ok(statement) => statement,
            Err(err) => {
                writeln!(self.out, "{err}")?;
                return Ok(Flow::Continue);
            }
        };

        match execute(statement, &mut self.table) {
            Ok(ExecuteResult::Inserted) => {}
            Ok(ExecuteResult::Rows(rows)) => {
                for row in rows {
                    writeln!(self.out, "{row}")?;
                }
            }
            Err(DbError::TableFull) => {
                writeln!(self.out, "Error: {}", DbError::TableFull)?;
                return Ok(Flow::Continue);
            }
            Err(err) => return Err(err),
        }
        writeln!(self.out, "Executed.")?;
        Ok(Flow::Continue)
    }

    /// Flushes the table to disk and hands back the sink.
    pub fn close(self) -> Result<W> {
        let Self { table, mut out } = self;
        table.close()?;
        out.flush()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn interpreter(file: &NamedTempFile) -> Interpreter<Vec<u8>> {
        Interpreter::new(Table::open(file.path()).unwrap(), Vec::new())
    }

    fn take_output(interp: &mut Interpreter<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(interp.out())).unwrap()
    }

    #[test]
    fn it_parses_meta_commands() {
        assert_eq!(MetaCommand::parse(".exit"), Some(Ok(MetaCommand::Exit)));
        assert_eq!(
            MetaCommand::parse(".tables"),
            Some(Err(MetaCommandError::Unrecognized(".tables".into())))
        );
        assert_eq!(MetaCommand::parse("select"), None);
    }

    #[test]
    fn it_prepares_statements() {
        assert_eq!(
            Statement::prepare("insert 1 alice alice@example.com"),
            Ok(Statement::Insert(Row::new(1, "alice", "alice@example.com")))
        );
        assert_eq!(Statement::prepare("select"), Ok(Statement::Select));
        assert_eq!(
            Statement::prepare("foo"),
            Err(PrepareError::UnrecognizedStatement("foo".into()))
        );
    }

    #[test]
    fn it_rejects_malformed_inserts() {
        assert_eq!(Statement::prepare("insert 1 alice"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("insert"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("insert 1 a b c"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("insert one a b"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("insert 4294967296 a b"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("select *"), Err(PrepareError::SyntaxError));
        assert_eq!(Statement::prepare("insert -1 a b"), Err(PrepareError::NegativeId));
        assert_eq!(
            Statement::prepare(&format!("insert 1 {} b", "a".repeat(USERNAME_SIZE + 1))),
            Err(PrepareError::StringTooLong)
        );
    }

    #[test]
    fn it_inserts_and_selects_a_row() {
        let file = NamedTempFile::new().unwrap();
        let mut interp = interpreter(&file);

        assert_eq!(interp.handle_line("insert 1 alice alice@example.com").unwrap(), Flow::Continue);
        assert_eq!(take_output(&mut interp), "Executed.\n");

        interp.handle_line("select").unwrap();
        assert_eq!(take_output(&mut interp), "(1, alice, alice@example.com)\nExecuted.\n");
    }

    #[test]
    fn it_reports_syntax_errors_without_touching_the_table() {
        let file = NamedTempFile::new().unwrap();
        let mut interp = interpreter(&file);

        interp.handle_line("insert 1 alice").unwrap();
        assert_eq!(take_output(&mut interp), "Syntax error. Could not parse statement.\n");
        assert_eq!(interp.table().num_rows(), 0);
    }

    #[test]
    fn it_echoes_unrecognized_input() {
        let file = NamedTempFile::new().unwrap();
        let mut interp = interpreter(&file);

        interp.handle_line("foo").unwrap();
        interp.handle_line(".foo").unwrap();
        assert_eq!(
            take_output(&mut interp),
            "Unrecognized command: foo\nUnrecognized meta-command: .foo\n"
        );
    }

    #[test]
    fn it_ignores_empty_lines() {
        let file = NamedTempFile::new().unwrap();
        let mut interp = interpreter(&file);

        assert_eq!(interp.handle_line("   ").unwrap(), Flow::Continue);
        assert_eq!(take_output(&mut interp), "");
    }

    #[test]
    fn it_exits_and_flushes_on_close() {
        let file = NamedTempFile::new().unwrap();
        let mut interp = interpreter(&file);

        interp.handle_line("insert 2 bob bob@example.com").unwrap();
        assert_eq!(interp.handle_line(".exit").unwrap(), Flow::Exit);
        interp.close().unwrap();

        let mut table = Table::open(file.path()).unwrap();
        let rows = table.select().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![Row::new(2, "bob", "bob@example.com")]);
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn it_saves_rows_even_when_the_sink_fails_to_flush() {
        let file = NamedTempFile::new().unwrap();
        let mut interp = Interpreter::new(Table::open(file.path()).unwrap(), BrokenSink);

        interp.handle_line("insert 5 eve eve@example.com").unwrap();
        assert!(interp.close().is_err());

        let mut table = Table::open(file.path()).unwrap();
        let rows = table.select().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows, vec![Row::new(5, "eve", "eve@example.com")]);
    }
}
