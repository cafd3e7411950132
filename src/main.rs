use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use ze::ast_printer::AstPrinter;
use ze::{RunError, Ze, ZeError};

const EXIT_STATIC: i32 = 64;
const EXIT_IO: i32 = 74;

#[derive(ClapParser, Debug)]
#[command(version, about = "Ze language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to ze.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print tokens as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints every statement's syntax tree
    Parse { filename: PathBuf },

    /// Runs a Ze program, or starts the REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// Reads a whole source file as UTF-8 text.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf).map_err(ZeError::from)?;

    Ok(source)
}

/// Like [`read_file`], but a failure ends the process with the I/O exit code.
fn load_source(filename: &Path) -> String {
    match read_file(filename) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(EXIT_IO);
        }
    }
}

fn init_logger() -> Result<()> {
    let log_file = File::create("ze.log").context("Failed to create ze.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("ze::").unwrap_or(module);

            writeln!(
                buf,
                "{} [{}:{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to ze.log");
    Ok(())
}

fn report(error: &RunError) {
    for e in error.errors() {
        eprintln!("{}", e);
    }
}

fn run_file(filename: &Path) {
    let source = load_source(filename);
    let mut ze = Ze::new();

    if let Err(e) = ze.run(&source) {
        debug!("Run failed: {}", e);
        report(&e);
        std::process::exit(e.exit_code());
    }

    info!("Program executed successfully");
}

fn run_repl() -> Result<()> {
    info!("Starting REPL");

    let mut rl = DefaultEditor::new().context("Failed to start the REPL")?;
    let mut ze = Ze::new();

    loop {
        match rl.readline("-> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    debug!("Could not record REPL history: {}", e);
                }

                if let Err(e) = ze.run(&line) {
                    report(&e);
                }
            }

            // Ctrl-C drops the current line only.
            Err(ReadlineError::Interrupted) => continue,

            Err(ReadlineError::Eof) => break,

            Err(err) => return Err(err).context("REPL input failed"),
        }
    }

    info!("REPL finished");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");
            let source = load_source(&filename);
            let (tokens, errors) = ze::tokenize(&source);

            for e in &errors {
                eprintln!("{}", e);
            }

            for token in &tokens {
                if json {
                    println!("{}", serde_json::to_string(token)?);
                } else {
                    println!("{}", token);
                }
            }

            if !errors.is_empty() {
                debug!("Tokenization failed with {} error(s)", errors.len());
                std::process::exit(EXIT_STATIC);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");
            let source = load_source(&filename);

            match ze::parse(&source) {
                Ok(statements) => {
                    for stmt in &statements {
                        println!("{}", AstPrinter::print_stmt(stmt));
                    }
                }

                Err(errors) => {
                    for e in &errors {
                        eprintln!("{}", e);
                    }
                    std::process::exit(EXIT_STATIC);
                }
            }

            info!("Parse subcommand completed");
        }

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                run_file(&filename);
            }

            None => run_repl()?,
        },
    }

    Ok(())
}
