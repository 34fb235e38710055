//! # Built-in Functions Module
//!
//! The process-wide registry mapping names to host-implemented values, plus
//! the uniform calling convention shared by the evaluator and the built-ins.
//!
//! ## Categories
//!
//! - **[collections]** (7): len, list, append, map, filter, zip, reduce
//! - **[console]** (1): print
//! - **[net]** (module): listen, get_clients, get_client_id, write_to_client
//! - **[bytes]** (module): create_writer, read_string
//!
//! Every built-in receives `(caller_env, registry, eval_callback, args)` and
//! returns a value; the eval callback lets higher-order built-ins invoke user
//! closures through the same application path the evaluator uses.

use crate::error::EvalError;
use crate::value::{BuiltinFn, BuiltinValue, EvalCallback, FunctionValue, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

pub mod bytes;
pub mod collections;
pub mod console;
pub mod net;

/// Name-to-value registry plus the ordered module search paths. Built once
/// per interpreter instance and treated as immutable afterwards.
pub struct Registry {
    symbols: HashMap<&'static str, Value>,
    paths: Vec<PathBuf>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_paths(Vec::new())
    }

    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        let mut symbols = HashMap::new();
        collections::register(&mut symbols);
        console::register(&mut symbols);
        symbols.insert("net", net::module());
        symbols.insert("bytes", bytes::module());
        Registry { symbols, paths }
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.symbols.get(name).cloned()
    }

    /// Module search directories, in resolution order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a host callback as a built-in value.
pub fn builtin(name: &'static str, function: BuiltinFn) -> Value {
    Value::Builtin(Rc::new(BuiltinValue { name, function }))
}

/// Applies a user function to already-evaluated arguments, implementing the
/// partial-application contract: more arguments than parameters is an error,
/// an exact match evaluates the body (unwrapping one Return), and fewer
/// arguments yield a residual function over the remaining parameters whose
/// capture is the argument-augmented environment itself.
pub fn apply_function(
    function: &Rc<FunctionValue>,
    args: Vec<Value>,
    registry: &Registry,
    eval: EvalCallback,
) -> Result<Value, EvalError> {
    if args.len() > function.params.len() {
        return Err(EvalError::ArityOverflow {
            expected: function.params.len(),
            given: args.len(),
        });
    }
    let call_env = function.env.extend();
    for (param, arg) in function.params.iter().zip(args.iter()) {
        call_env.set(param.name.clone(), arg.clone());
    }
    if args.len() == function.params.len() {
        let result = eval(&function.body, call_env, registry)?;
        if let Value::Return(inner) = result {
            return Ok(*inner);
        }
        return Ok(result);
    }
    Ok(Value::Function(Rc::new(FunctionValue {
        params: function.params[args.len()..].to_vec(),
        body: Rc::clone(&function.body),
        env: call_env,
    })))
}
