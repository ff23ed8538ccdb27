//! Runtime values and their textual form.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::array::HiArray;
use crate::ast::LiteralValue;
use crate::callable::{Callable, HiFunction, NativeFunction};
use crate::class::{HiClass, HiInstance};

/// Every value a Hi program can produce.  Objects (functions, classes,
/// instances, arrays) are reference types: cloning a `Value` clones the
/// handle, not the object.
#[derive(Clone)]
pub enum Value {
    /// `nada`
    Nil,

    Bool(bool),

    Number(f64),

    String(Rc<str>),

    /// Host‑provided function, including methods of a built‑in array.
    Native(Rc<NativeFunction>),

    /// User function, closure or bound method.
    Function(Rc<HiFunction>),

    Class(Rc<HiClass>),

    Instance(Rc<RefCell<HiInstance>>),

    Array(Rc<RefCell<HiArray>>),
}

impl Value {
    /// Only `nada` and `nahh` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// `==` semantics: primitives by value, objects by identity, different
    /// kinds never equal.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The Callable capability, if this value has it.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::Native(native) => Some(native.as_ref()),
            Value::Function(function) => Some(function.as_ref()),
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Short kind name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nada",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Native(_) | Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Array(_) => "array",
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::Str(s) => Value::String(Rc::from(s.as_str())),
            LiteralValue::True => Value::Bool(true),
            LiteralValue::False => Value::Bool(false),
            LiteralValue::Nil => Value::Nil,
        }
    }
}

/// Whole numbers print without a fractional part (`3`, not `3.0`); anything
/// else uses the shortest round‑tripping decimal form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        let mut buf = itoa::Buffer::new();
        buf.format(n as i64).to_owned()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nada"),

            Value::Bool(true) => write!(f, "yerr"),

            Value::Bool(false) => write!(f, "nahh"),

            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::Native(native) => write!(f, "<native fn {}>", native.name),

            Value::Function(function) => write!(f, "<fn {}>", function.name()),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{}", instance.borrow()),

            Value::Array(array) => HiArray::write(array, f, &mut Vec::new()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}
