//! The built-in growable array.
//!
//! Arrays have no class; their members are reached through the same
//! property syntax as instance members:
//!
//! | member     | kind   | behaviour                                        |
//! |------------|--------|--------------------------------------------------|
//! | `length`   | field  | current element count                            |
//! | `get(i)`   | method | element `i`, bounds-checked                      |
//! | `set(i,v)` | method | overwrite element `i`, bounds-checked            |
//! | `add(v)`   | method | append, growing the storage                      |
//! | `sort()`   | method | ascending sort; every element must be a number   |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::NativeFunction;
use crate::error::{NativeError, RuntimeError};
use crate::token::Token;
use crate::value::Value;

/// Largest size `Array(n)` will allocate up front.
pub const MAX_LEN: usize = 1 << 28;

#[derive(Debug, Default)]
pub struct HiArray {
    elements: Vec<Value>,
}

impl HiArray {
    /// `len` slots, all `nada`.  Fails instead of aborting when the storage
    /// cannot be allocated.
    pub fn with_len(len: usize) -> Result<Self, NativeError> {
        let too_large = || NativeError::Argument(format!("Array size {} is too large.", len));

        if len > MAX_LEN {
            return Err(too_large());
        }

        let mut elements: Vec<Value> = Vec::new();

        elements.try_reserve_exact(len).map_err(|_| too_large())?;
        elements.resize(len, Value::Nil);

        Ok(Self { elements })
    }

    pub fn from_elements(elements: Vec<Value>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Validate `index` against the current length.
    fn slot(&self, index: &Value) -> Result<usize, NativeError> {
        let Value::Number(i) = index else {
            return Err(NativeError::Argument(format!(
                "Array index must be a number, got {}.",
                index.type_name()
            )));
        };

        if i.fract() != 0.0 || *i < 0.0 || *i >= self.len() as f64 {
            return Err(NativeError::IndexOutOfRange {
                index: *i,
                length: self.len(),
            });
        }

        Ok(*i as usize)
    }

    pub fn get(&self, index: &Value) -> Result<Value, NativeError> {
        let slot: usize = self.slot(index)?;

        Ok(self.elements[slot].clone())
    }

    pub fn set(&mut self, index: &Value, value: Value) -> Result<(), NativeError> {
        let slot: usize = self.slot(index)?;

        self.elements[slot] = value;

        Ok(())
    }

    pub fn add(&mut self, value: Value) {
        self.elements.push(value);
    }

    /// Ascending numeric sort.  Contents are checked before anything moves,
    /// so a rejected sort leaves the array untouched.
    pub fn sort(&mut self) -> Result<(), NativeError> {
        let mut numbers: Vec<f64> = Vec::with_capacity(self.len());

        for element in &self.elements {
            match element {
                Value::Number(n) => numbers.push(*n),
                other => {
                    return Err(NativeError::Argument(format!(
                        "Can only sort an array of numbers, found a {}.",
                        other.type_name()
                    )))
                }
            }
        }

        numbers.sort_by(f64::total_cmp);

        self.elements = numbers.into_iter().map(Value::Number).collect();

        Ok(())
    }

    /// Property read on an array value: `length` or a method bound to it.
    pub fn get_property(
        array: &Rc<RefCell<HiArray>>,
        name: &Token,
    ) -> Result<Value, RuntimeError> {
        debug!("Array property '{}'", name.lexeme);

        let this = Rc::clone(array);

        let method: NativeFunction = match name.lexeme.as_str() {
            "length" => return Ok(Value::Number(array.borrow().len() as f64)),

            "get" => NativeFunction::new("get", 1, move |_, args| this.borrow().get(&args[0])),

            "set" => NativeFunction::new("set", 2, move |_, args| {
                this.borrow_mut().set(&args[0], args[1].clone())?;
                Ok(Value::Nil)
            }),

            "add" => NativeFunction::new("add", 1, move |_, args| {
                this.borrow_mut().add(args[0].clone());
                Ok(Value::Nil)
            }),

            "sort" => NativeFunction::new("sort", 0, move |_, _| {
                this.borrow_mut().sort()?;
                Ok(Value::Nil)
            }),

            _ => {
                return Err(RuntimeError::UndefinedProperty {
                    name: name.lexeme.clone(),
                    line: name.line,
                })
            }
        };

        Ok(Value::Native(Rc::new(method)))
    }

    /// `[a, b, c]`.  `seen` holds the arrays currently being printed, so an
    /// array that contains itself prints as `[...]` instead of recursing.
    pub fn write(
        array: &Rc<RefCell<HiArray>>,
        f: &mut fmt::Formatter<'_>,
        seen: &mut Vec<*const RefCell<HiArray>>,
    ) -> fmt::Result {
        let ptr: *const RefCell<HiArray> = Rc::as_ptr(array);

        if seen.contains(&ptr) {
            return write!(f, "[...]");
        }

        seen.push(ptr);

        write!(f, "[")?;

        for (i, element) in array.borrow().elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            match element {
                Value::Array(inner) => HiArray::write(inner, f, seen)?,
                other => write!(f, "{}", other)?,
            }
        }

        seen.pop();

        write!(f, "]")
    }
}
