//! Byte-buffer host module: create_writer, read_string
//!
//! Writers accumulate the inspected text of strings and integers for sending
//! over a connection; readers wrap received text and are consumed by
//! `read_string`. Both inspect as their current length in bytes.

use crate::builtins::{builtin, Registry};
use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE};
use crate::value::{EvalCallback, ModuleValue, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub struct Writer {
    data: RefCell<String>,
}

impl Writer {
    pub fn contents(&self) -> String {
        self.data.borrow().clone()
    }
}

impl fmt::Display for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data.borrow().len())
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("len", &self.data.borrow().len())
            .finish()
    }
}

pub struct Reader {
    data: RefCell<String>,
}

impl fmt::Display for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data.borrow().len())
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("len", &self.data.borrow().len())
            .finish()
    }
}

/// Wraps received text as a reader value for message callbacks.
pub fn reader_from_string(text: impl Into<String>) -> Value {
    Value::Reader(Rc::new(Reader {
        data: RefCell::new(text.into()),
    }))
}

pub fn builtin_create_writer(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    let mut data = String::new();
    for (position, value) in args.iter().enumerate() {
        match value {
            Value::Str(text) => data.push_str(text),
            Value::Integer(number) => data.push_str(&number.to_string()),
            other => {
                return Err(EvalError::type_error(
                    "bytes::create_writer",
                    "string or integer",
                    other,
                    position + 1,
                ));
            }
        }
    }
    Ok(Value::Writer(Rc::new(Writer {
        data: RefCell::new(data),
    })))
}

/// Consumes and returns the buffered text; a second read yields the empty
/// string.
pub fn builtin_read_string(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(
            "bytes::read_string",
            ARITY_ONE,
            args.len(),
        ));
    }
    let Value::Reader(reader) = &args[0] else {
        return Err(EvalError::type_error(
            "bytes::read_string",
            "reader buffer",
            &args[0],
            1,
        ));
    };
    let text = std::mem::take(&mut *reader.data.borrow_mut());
    Ok(Value::string(text))
}

pub fn module() -> Value {
    let env = Environment::new();
    env.set("create_writer", builtin("create_writer", builtin_create_writer));
    env.set("read_string", builtin("read_string", builtin_read_string));
    Value::Module(Rc::new(ModuleValue {
        name: "bytes".to_string(),
        path: "/bytes".to_string(),
        env,
    }))
}
