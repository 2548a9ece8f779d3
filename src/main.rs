//! Frond CLI and REPL
//!
//! Usage:
//!   frond              - Start REPL
//!   frond <file>       - Run a file
//!   frond -e <expr>    - Evaluate an expression

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use frond::interpreter::{Interpreter, Value};

#[derive(Parser, Debug)]
#[command(name = "frond")]
#[command(version)]
#[command(about = "The Frond programming language", long_about = None)]
struct Args {
    /// Source file to execute
    #[arg()]
    file: Option<PathBuf>,

    /// Evaluate an expression
    #[arg(short, long)]
    eval: Option<String>,

    /// Print the resolved AST instead of evaluating
    #[arg(long)]
    ast: bool,

    /// Indentation width of a tab character
    #[arg(long, default_value_t = 4)]
    tab_width: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut interpreter = Interpreter::new()
        .map_err(|err| anyhow::anyhow!("{err}"))?
        .with_tab_width(args.tab_width);

    if let Some(expr) = args.eval.as_deref() {
        return run_source(&mut interpreter, expr, args.ast);
    }
    if let Some(file) = &args.file {
        let source = fs::read_to_string(file)?;
        return run_source(&mut interpreter, &source, args.ast);
    }
    run_repl(&mut interpreter)
}

fn run_source(interpreter: &mut Interpreter, source: &str, show_ast: bool) -> anyhow::Result<()> {
    if show_ast {
        match interpreter.resolve_only(source) {
            Ok(expr) => println!("{expr:#?}"),
            Err(err) => {
                eprintln!("{}", err.to_string().as_str().red());
                std::process::exit(1);
            }
        }
        return Ok(());
    }
    match interpreter.evaluate_program(source) {
        Ok(value) => {
            println!("{value}");
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.to_string().as_str().red());
            std::process::exit(1);
        }
    }
}

fn run_repl(interpreter: &mut Interpreter) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(">>> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                match interpreter.evaluate_line(&line) {
                    Ok(Value::Unit) => {}
                    Ok(value) => println!("{value}"),
                    Err(err) => eprintln!("{}", err.to_string().as_str().red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
