#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use hi_interpreter::error::HiError;
use hi_interpreter::interpreter::Interpreter;
use hi_interpreter::session::Session;

/// In-memory `print` sink that stays readable after the interpreter takes
/// ownership of a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A session printing into the returned buffer.
pub fn session() -> (Session, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let interpreter = Interpreter::with_output(Box::new(buffer.clone()));

    (Session::with_interpreter(interpreter), buffer)
}

/// Run `source` in a fresh session; returns the printed output and the result.
pub fn run(source: &str) -> (String, Result<(), Vec<HiError>>) {
    let (mut session, buffer) = session();
    let result = session.run(source);

    (buffer.contents(), result)
}

/// Run `source`, which must succeed, and return what it printed.
pub fn run_ok(source: &str) -> String {
    let (output, result) = run(source);

    if let Err(errors) = result {
        panic!("program failed: {:?}\noutput so far:\n{}", errors, output);
    }

    output
}

/// Run `source`, which must fail, and return the rendered diagnostics.
pub fn run_err(source: &str) -> Vec<String> {
    let (output, result) = run(source);

    match result {
        Ok(()) => panic!("program unexpectedly succeeded; output:\n{}", output),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}
