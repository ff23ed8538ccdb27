//! The Callable capability and its two function-shaped implementors: host
//! natives and user functions/closures.  Classes are callable too; see
//! [`crate::class`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::HiInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::{NativeError, RuntimeError};
use crate::interpreter::{Flow, Interpreter};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Anything a call expression can invoke.
///
/// The interpreter checks `arguments.len() == arity()` before calling, so
/// implementations may index `arguments` freely.
pub trait Callable {
    fn arity(&self) -> usize;

    /// `paren` is the call site's closing parenthesis, for diagnostics.
    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Natives
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a native: sees the interpreter and the evaluated arguments.
pub type NativeFn = dyn Fn(&mut Interpreter, &[Value]) -> Result<Value, NativeError>;

/// A host‑provided callable (`clock`, `sin`, array methods, ...).
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: &str, arity: usize, func: F) -> Self
    where
        F: Fn(&mut Interpreter, &[Value]) -> Result<Value, NativeError> + 'static,
    {
        Self {
            name: name.to_string(),
            arity,
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}/{}>", self.name, self.arity)
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(interpreter, &arguments).map_err(|error| RuntimeError::Native {
            error,
            line: paren.line,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User functions
// ─────────────────────────────────────────────────────────────────────────────

/// A user function: its declaration plus the scope it was declared in.
///
/// Methods are stored unbound on their class; [`HiFunction::bind`] makes the
/// bound copy handed out on property access.
pub struct HiFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl HiFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Same declaration, closing over a fresh scope that binds `self`.
    pub fn bind(&self, instance: Rc<RefCell<HiInstance>>) -> HiFunction {
        let environment: EnvRef = Environment::child_of(&self.closure);

        environment
            .borrow_mut()
            .define("self", Value::Instance(instance));

        HiFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        }
    }

    /// The bound `self`, which an initializer yields no matter how it ends.
    fn bound_self(&self) -> Result<Value, RuntimeError> {
        let keyword = Token::new(TokenType::SELF, "self", self.declaration.name.line);

        Environment::get_at(&self.closure, 0, &keyword)
    }
}

impl fmt::Debug for HiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}/{}>", self.name(), self.arity())
    }
}

impl Callable for HiFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        _paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Calling user-defined function '{}'", self.name());

        let environment: EnvRef = Environment::child_of(&self.closure);

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        let flow: Flow = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            return self.bound_self();
        }

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}
