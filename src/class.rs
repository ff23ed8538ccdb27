//! Classes and their instances.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, HiFunction};
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Name of the method run when a class is called.
pub const INITIALIZER: &str = "init";

/// A class: its own methods and an optional superclass.
pub struct HiClass {
    pub name: String,
    superclass: Option<Rc<HiClass>>,
    methods: HashMap<String, Rc<HiFunction>>,
}

impl HiClass {
    pub fn new(
        name: &str,
        superclass: Option<Rc<HiClass>>,
        methods: HashMap<String, Rc<HiFunction>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            superclass,
            methods,
        }
    }

    /// Own methods first, then up the superclass chain; first match wins.
    pub fn find_method(&self, name: &str) -> Option<Rc<HiFunction>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }
}

impl fmt::Debug for HiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

/// Calling a class builds an instance and runs `init` on it, if any.
impl Callable for Rc<HiClass> {
    fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Constructing instance of '{}'", self.name);

        let instance = Rc::new(RefCell::new(HiInstance::new(Rc::clone(self))));

        if let Some(initializer) = self.find_method(INITIALIZER) {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments, paren)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// An object: its class (fixed at creation) and its fields.
pub struct HiInstance {
    class: Rc<HiClass>,
    fields: HashMap<String, Value>,
}

impl HiInstance {
    pub fn new(class: Rc<HiClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Field if present, otherwise a method bound to this instance.
    pub fn get(instance: &Rc<RefCell<HiInstance>>, name: &Token) -> Result<Value, RuntimeError> {
        let class: Rc<HiClass> = {
            let this = instance.borrow();

            if let Some(value) = this.fields.get(&name.lexeme) {
                return Ok(value.clone());
            }

            Rc::clone(&this.class)
        };

        match class.find_method(&name.lexeme) {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(Rc::clone(instance))))),
            None => Err(RuntimeError::UndefinedProperty {
                name: name.lexeme.clone(),
                line: name.line,
            }),
        }
    }

    /// Create or overwrite a field.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Display for HiInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
