//! One interpreter fed a sequence of source units (a file, or REPL lines).
//!
//! Each unit goes scan → parse → resolve → interpret.  A phase that reports
//! errors stops the unit before the next phase starts; globals defined by
//! earlier units stay visible to later ones.

use log::{debug, info};

use crate::ast::{Expr, Stmt};
use crate::error::HiError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::scan_tokens;
use crate::value::Value;

pub struct Session {
    interpreter: Interpreter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Resolver that knows every global defined so far.
    fn resolver(&self) -> Resolver {
        Resolver::with_globals(self.interpreter.globals().borrow().names())
    }

    /// Run `source` as a program.
    pub fn run(&mut self, source: &str) -> Result<(), Vec<HiError>> {
        let statements: Vec<Stmt> = parse_program(source)?;

        info!("Parsed {} statements", statements.len());

        let locals = self.resolver().resolve(&statements)?;

        self.interpreter.resolve(locals);

        self.interpreter
            .interpret(&statements)
            .map_err(|error| vec![HiError::from(error)])
    }

    /// Evaluate `source` as a single expression and return its value.
    pub fn evaluate(&mut self, source: &str) -> Result<Value, Vec<HiError>> {
        let tokens = scan_tokens(source).map_err(|error| vec![error])?;

        let expr: Expr = Parser::new(tokens)
            .parse_expression()
            .map_err(|error| vec![error])?;

        let locals = self.resolver().resolve_expression(&expr)?;

        self.interpreter.resolve(locals);

        let value: Value = self
            .interpreter
            .evaluate(&expr)
            .map_err(|error| vec![HiError::from(error)])?;

        debug!("Evaluated to: {}", value);

        Ok(value)
    }
}

/// Scan and parse `source` without running it.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, Vec<HiError>> {
    let tokens = scan_tokens(source).map_err(|error| vec![error])?;

    Parser::new(tokens).parse()
}
