//! Ze: a small dynamically‑typed scripting language.
//!
//! Source text goes through the [`scanner`], the [`parser`], the static
//! [`resolver`] and finally the tree‑walking [`interpreter`]. A [`Ze`] session
//! owns the interpreter, so globals survive from one [`Ze::run`] call to the
//! next (one call per REPL line, or one for a whole file).

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod natives;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::Write;

use log::{debug, info};

pub use ast::{Expr, Stmt};
pub use error::{RunError, ZeError};
pub use interpreter::Interpreter;
pub use token::{Token, TokenType};
pub use value::Value;

use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// Scan `source` completely. Lexical errors are collected alongside the
/// tokens; scanning never stops early.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<ZeError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<ZeError> = Vec::new();

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    (tokens, errors)
}

/// Scan and parse `source`, returning every lexical and syntax error found.
pub fn parse(source: &str) -> Result<Vec<Stmt>, Vec<ZeError>> {
    let (tokens, mut errors) = tokenize(source);

    match Parser::new(tokens).parse() {
        Ok(statements) if errors.is_empty() => Ok(statements),
        Ok(_) => Err(errors),
        Err(parse_errors) => {
            errors.extend(parse_errors);
            Err(errors)
        }
    }
}

/// An interpreter session.
pub struct Ze {
    interpreter: Interpreter,
}

impl Default for Ze {
    fn default() -> Self {
        Self::new()
    }
}

impl Ze {
    /// A session whose `print` output goes to stdout.
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    /// A session whose `print` output goes to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    /// Names currently defined in the global scope (natives included).
    pub fn global_names(&self) -> Vec<String> {
        self.interpreter.global_names()
    }

    /// Scan, parse, resolve and execute `source`.
    ///
    /// Execution never starts when a lexical, syntax or resolution error was
    /// found; the first runtime error aborts the remaining statements.
    pub fn run(&mut self, source: &str) -> Result<(), RunError> {
        info!("Running {} bytes of source", source.len());

        let statements: Vec<Stmt> = parse(source).map_err(RunError::Static)?;

        debug!("Parsed {} statement(s)", statements.len());

        Resolver::new(&mut self.interpreter)
            .resolve(&statements)
            .map_err(RunError::Static)?;

        self.interpreter
            .interpret(&statements)
            .map_err(RunError::Runtime)
    }
}
