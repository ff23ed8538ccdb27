//! Centralised error hierarchy for the **Hi interpreter**.
//!
//! Every phase (scanner, parser, resolver, runtime) converts its failure modes
//! into one of the variants defined here.  Static phases hand back *lists* of
//! [`HiError`]s so a host can report every diagnostic of one pass; the runtime
//! raises a single [`RuntimeError`] that unwinds the current execution unit.
//!
//! All variants render as `[line N] Error: message`.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HiError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// Static scope misuse found by the resolver.
    #[error("[line {line}] Error: {message}")]
    Resolve { message: String, line: usize },

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl HiError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        HiError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        HiError::Parse { message, line }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", line, message);

        HiError::Resolve { message, line }
    }

    /// Did this error happen while the program was running (as opposed to
    /// while it was being scanned, parsed or resolved)?
    pub fn is_runtime(&self) -> bool {
        matches!(self, HiError::Runtime(_))
    }
}

/// Failure raised while evaluating a program.  Every variant except `Io`
/// carries the line of the token that triggered it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    /// Operand or operation applied to a value of the wrong type.
    #[error("[line {line}] Error: {message}")]
    Type { message: String, line: usize },

    #[error("[line {line}] Error: Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("[line {line}] Error: Undefined property '{name}'.")]
    UndefinedProperty { name: String, line: usize },

    #[error("[line {line}] Error: Can only call functions and classes.")]
    NotCallable { line: usize },

    #[error("[line {line}] Error: Expected {expected} arguments but got {actual}.")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        line: usize,
    },

    /// A native function (or array method) rejected its arguments.
    #[error("[line {line}] Error: {error}")]
    Native {
        #[source]
        error: NativeError,
        line: usize,
    },

    /// The configured maximum call depth was exceeded.
    #[error("[line {line}] Error: Stack overflow.")]
    StackOverflow { line: usize },

    /// Writing program output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RuntimeError {
    /// Helper constructor for type errors.
    pub fn type_error<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Type error: line={}, msg={}", line, message);

        RuntimeError::Type { message, line }
    }
}

/// Error produced by host‑provided callables.  These know nothing about the
/// call site, so the interpreter attaches the line when it wraps them into a
/// [`RuntimeError::Native`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// Operand of the wrong type or shape.
    #[error("{0}")]
    Argument(String),

    /// Array index that is not a whole number inside `0..length`.
    #[error("Index {index} is out of range for an array of length {length}.")]
    IndexOutOfRange { index: f64, length: usize },
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, HiError>;
