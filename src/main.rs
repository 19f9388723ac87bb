use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_sqlite::{Flow, Interpreter, Table};

#[derive(Parser, Debug)]
#[command(version, about = "A tiny persistent row store")]
struct Cli {
    /// Database file, created if it does not exist
    #[arg(default_value = "scratch.db")]
    filename: PathBuf,
}

fn print_prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "db > ")?;
    out.flush()
}

fn run<R: BufRead, W: Write>(input: &mut R, interpreter: &mut Interpreter<W>) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        print_prompt(interpreter.out())?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        // Invalid UTF-8 ends up as an unrecognized command.
        let line = String::from_utf8_lossy(&buf);
        if interpreter.handle_line(&line)? == Flow::Exit {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let table = Table::open(&cli.filename)
        .with_context(|| format!("failed to open {}", cli.filename.display()))?;
    let mut interpreter = Interpreter::new(table, io::stdout().lock());

    let session = run(&mut io::stdin().lock(), &mut interpreter);

    // The table is closed even when the session failed.
    let closed = interpreter
        .close()
        .with_context(|| format!("failed to close {}", cli.filename.display()));
    session?;
    closed?;
    Ok(())
}
