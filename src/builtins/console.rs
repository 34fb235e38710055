//! Console output: print
//!
//! `print` concatenates the inspect forms of its arguments, writes them to
//! standard output with a trailing newline, and returns the concatenation as
//! a string.

use crate::builtins::{builtin, Registry};
use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{EvalCallback, Value};
use std::collections::HashMap;
use std::rc::Rc;

pub fn builtin_print(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    let mut output = String::new();
    for arg in args {
        output.push_str(&arg.to_string());
    }
    println!("{}", output);
    Ok(Value::string(output))
}

pub fn register(symbols: &mut HashMap<&'static str, Value>) {
    symbols.insert("print", builtin("print", builtin_print));
}
