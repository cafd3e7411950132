#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use ze::{RunError, Ze};

/// In-memory `print` sink that stays readable after the session takes it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
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

/// A session printing into a fresh buffer.
pub fn session() -> (Ze, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (Ze::with_output(Box::new(buffer.clone())), buffer)
}

/// Run `source` in a fresh session, returning what it printed and how it
/// ended.
pub fn run(source: &str) -> (String, Result<(), RunError>) {
    let (mut ze, buffer) = session();
    let result = ze.run(source);
    (buffer.contents(), result)
}

/// Run `source`, expecting success, and return its output.
pub fn output(source: &str) -> String {
    let (out, result) = run(source);
    if let Err(e) = result {
        panic!("program failed: {}\noutput so far:\n{}", e, out);
    }
    out
}

/// Run `source`, expecting static errors, and return their messages.
pub fn static_errors(source: &str) -> Vec<String> {
    match run(source).1 {
        Err(RunError::Static(errors)) => errors.iter().map(|e| e.to_string()).collect(),
        other => panic!("expected static errors, got {:?}", other),
    }
}

/// Run `source`, expecting a runtime error. Returns the rendered error and
/// whatever was printed before it.
pub fn runtime_error(source: &str) -> (String, String) {
    match run(source) {
        (out, Err(RunError::Runtime(e))) => (e.to_string(), out),
        (out, other) => panic!("expected a runtime error, got {:?} (output {:?})", other, out),
    }
}
