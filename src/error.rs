//! Centralised error hierarchy for the **Ze interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here. This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself: callers decide where the
//! rendered messages go.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ZeError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        line: usize,
        /// `""`, `" at end"` or `" at '<lexeme>'"`.
        location: String,
    },

    /// Static scope violation found by the resolver.
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        line: usize,
        location: String,
    },

    /// Runtime evaluation error, reported against the offending token's line.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl ZeError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Lex error: line={}, msg={}", line, message);

        ZeError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", token.line, message);

        ZeError::Parse {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Resolve error: line={}, msg={}", token.line, message);

        ZeError::Resolve {
            message,
            line: token.line,
            location: location(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", token.line, message);

        ZeError::Runtime {
            message,
            line: token.line,
        }
    }

    /// The bare message, without the line decoration.
    pub fn message(&self) -> String {
        match self {
            ZeError::Lex { message, .. }
            | ZeError::Parse { message, .. }
            | ZeError::Resolve { message, .. }
            | ZeError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Source line the error points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ZeError::Lex { line, .. }
            | ZeError::Parse { line, .. }
            | ZeError::Resolve { line, .. }
            | ZeError::Runtime { line, .. } => Some(*line),
            _ => None,
        }
    }
}

fn location(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

/// Outcome of a failed pipeline run.
///
/// Static diagnostics are accumulated for the whole run; a runtime error
/// aborts execution at the first failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{}", render(.0))]
    Static(Vec<ZeError>),

    #[error(transparent)]
    Runtime(ZeError),
}

impl RunError {
    /// Process exit code conventionally associated with the failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Static(_) => 64,
            RunError::Runtime(_) => 70,
        }
    }

    /// Every diagnostic carried by this failure, in report order.
    pub fn errors(&self) -> Vec<&ZeError> {
        match self {
            RunError::Static(errors) => errors.iter().collect(),
            RunError::Runtime(error) => vec![error],
        }
    }
}

fn render(errors: &[ZeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, ZeError>;
