use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser as ClapParser;
use env_logger::Builder;
use log::{debug, info};

use glpc::ast_printer::AstPrinter;
use glpc::parser::Parser;
use glpc::scanner::Scanner;
use glpc::token::Token;
use glpc::{GlpcError, Interpreter};

const EXIT_SYNTAX: i32 = 65;
const EXIT_NO_MAIN: i32 = 66;
const EXIT_RUNTIME: i32 = 70;
const EXIT_IO: i32 = 74;

#[derive(ClapParser, Debug)]
#[command(version, about = "glpc language interpreter", long_about = None)]
pub struct Cli {
    /// Script to run; its top-level `main` function is called after loading
    script: PathBuf,

    /// Enable logging to glpc.log
    #[arg(long)]
    log: bool,

    /// Print the token stream as JSON lines and exit
    #[arg(long)]
    tokens: bool,

    /// Print the parsed program in prefix form and exit
    #[arg(long, conflicts_with = "tokens")]
    ast: bool,
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: &Path) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("glpc.log").context("Failed to create glpc.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("glpc::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{} {}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to glpc.log");
    Ok(())
}

fn print_tokens(source: &[u8], file: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for token in Scanner::new(source, file) {
        debug!("Scanned token: {}", token);
        let line = serde_json::to_string(&token).context("Failed to serialise token")?;
        writeln!(out, "{}", line)?;
    }

    Ok(())
}

fn print_ast(source: &[u8], file: &str) -> i32 {
    let tokens: Vec<Token> = Scanner::new(source, file).collect();

    match Parser::new(tokens).parse() {
        Ok(program) => {
            println!("{}", AstPrinter::print_program(&program.statements));
            0
        }
        Err(errors) => {
            eprintln!("{}", errors);
            EXIT_SYNTAX
        }
    }
}

fn run(script: &Path) -> i32 {
    let mut interpreter = Interpreter::new();

    let result = interpreter
        .run_file(script)
        .and_then(|env| interpreter.run_main(&env));

    match result {
        Ok(value) => {
            info!("Program finished, main returned {}", value);
            0
        }
        Err(error) => {
            debug!("Program failed: {:?}", error);
            eprintln!("{}", error);
            match error {
                GlpcError::Syntax(_) => EXIT_SYNTAX,
                GlpcError::Runtime(_) => EXIT_RUNTIME,
                GlpcError::Io(_) => EXIT_IO,
                GlpcError::MissingMain | GlpcError::MainNotFunction => EXIT_NO_MAIN,
                _ => EXIT_RUNTIME,
            }
        }
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let source = match read_file(&args.script) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(EXIT_IO);
        }
    };
    let file = args.script.display().to_string();

    if args.tokens {
        return print_tokens(&source, &file);
    }

    if args.ast {
        process::exit(print_ast(&source, &file));
    }

    process::exit(run(&args.script));
}
