//! Globals every program starts with.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::array::HiArray;
use crate::callable::NativeFunction;
use crate::environment::Environment;
use crate::error::NativeError;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Define the native functions and constants in `globals`.
pub fn install(globals: &mut Environment) {
    info!("Installing native globals");

    define(globals, "clock", 0, |_, _| {
        let seconds: f64 = Utc::now().timestamp_micros() as f64 / 1_000_000.0;

        debug!("Native function 'clock' returned: {}", seconds);

        Ok(Value::Number(seconds))
    });

    define(globals, "sin", 1, |_, args| Ok(Value::Number(number(&args[0])?.sin())));

    define(globals, "cos", 1, |_, args| Ok(Value::Number(number(&args[0])?.cos())));

    define(globals, "tan", 1, |_, args| Ok(Value::Number(number(&args[0])?.tan())));

    define(globals, "round", 1, |_, args| {
        Ok(Value::Number(number(&args[0])?.round()))
    });

    define(globals, "Array", 1, |_, args| {
        let n: f64 = number(&args[0])?;

        if n < 0.0 || n.fract() != 0.0 {
            return Err(NativeError::Argument(
                "Array size must be a non-negative integer.".to_string(),
            ));
        }

        let array = HiArray::with_len(n as usize)?;

        Ok(Value::Array(Rc::new(RefCell::new(array))))
    });

    globals.define("PI", Value::Number(std::f64::consts::PI));
}

fn define<F>(globals: &mut Environment, name: &str, arity: usize, func: F)
where
    F: Fn(&mut Interpreter, &[Value]) -> Result<Value, NativeError> + 'static,
{
    debug!("Defining native function '{}'", name);

    globals.define(
        name,
        Value::Native(Rc::new(NativeFunction::new(name, arity, func))),
    );
}

fn number(value: &Value) -> Result<f64, NativeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(NativeError::Argument("Operand must be a number.".to_string())),
    }
}
