//! Collection operations: len, list, append, map, filter, zip, reduce
//!
//! The higher-order operations (`map`, `filter`, `reduce`) call user
//! functions back through the evaluator callback, so they share the
//! partial-application machinery with ordinary calls.
//!
//! - `len`: length of a string (in characters) or a list
//! - `list`: build a list from the arguments
//! - `append`: push values onto a list in place, returning the same list
//! - `map`: apply a function across one or more collections, concatenated
//! - `filter`: keep the elements whose predicate result is truthy
//! - `zip`: per-index tuples across lists, cut to the shortest input
//! - `reduce`: left fold with an optional initial accumulator

use crate::error::{
    EvalError, ARITY_AT_LEAST_ONE, ARITY_AT_LEAST_TWO, ARITY_ONE, ARITY_TWO_OR_THREE,
};
use crate::value::{EvalCallback, FunctionValue, Value};
use crate::builtins::{apply_function, builtin, Registry};
use crate::env::Environment;
use std::collections::HashMap;
use std::rc::Rc;

pub fn builtin_len(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error("len", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Str(text) => Ok(Value::Integer(text.chars().count() as i64)),
        Value::List(values) => Ok(Value::Integer(values.borrow().len() as i64)),
        other => Err(EvalError::type_error("len", "string or list", other, 1)),
    }
}

pub fn builtin_list(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    Ok(Value::list(args.to_vec()))
}

/// Mutates the list in place and returns the same list value.
pub fn builtin_append(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity_error("append", ARITY_AT_LEAST_ONE, 0));
    }
    let Value::List(values) = &args[0] else {
        return Err(EvalError::type_error("append", "list", &args[0], 1));
    };
    values.borrow_mut().extend_from_slice(&args[1..]);
    Ok(args[0].clone())
}

pub fn builtin_map(
    _env: Rc<Environment>,
    registry: &Registry,
    eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error("map", ARITY_AT_LEAST_TWO, args.len()));
    }
    let Value::Function(function) = &args[0] else {
        return Err(EvalError::type_error("map", "function", &args[0], 1));
    };
    let mut results = Vec::new();
    for collection in &args[1..] {
        for (result, _) in call_on_collection(function, collection, registry, eval)? {
            results.push(result);
        }
    }
    Ok(Value::list(results))
}

pub fn builtin_filter(
    _env: Rc<Environment>,
    registry: &Registry,
    eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity_error(
            "filter",
            ARITY_AT_LEAST_TWO,
            args.len(),
        ));
    }
    let Value::Function(predicate) = &args[0] else {
        return Err(EvalError::type_error("filter", "function", &args[0], 1));
    };
    let mut kept = Vec::new();
    for collection in &args[1..] {
        for (result, original) in call_on_collection(predicate, collection, registry, eval)? {
            if result.is_truthy() {
                kept.push(original);
            }
        }
    }
    Ok(Value::list(kept))
}

pub fn builtin_zip(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    let mut inputs = Vec::with_capacity(args.len());
    for (position, arg) in args.iter().enumerate() {
        let Value::List(values) = arg else {
            return Err(EvalError::type_error("zip", "list", arg, position + 1));
        };
        inputs.push(values.borrow().clone());
    }
    let shortest = inputs.iter().map(|list| list.len()).min().unwrap_or(0);
    let mut tuples = Vec::with_capacity(shortest);
    for index in 0..shortest {
        let tuple: Vec<Value> = inputs.iter().map(|list| list[index].clone()).collect();
        tuples.push(Value::list(tuple));
    }
    Ok(Value::list(tuples))
}

pub fn builtin_reduce(
    _env: Rc<Environment>,
    registry: &Registry,
    eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if !(2..=3).contains(&args.len()) {
        return Err(EvalError::arity_error(
            "reduce",
            ARITY_TWO_OR_THREE,
            args.len(),
        ));
    }
    let Value::Function(function) = &args[0] else {
        return Err(EvalError::type_error("reduce", "function", &args[0], 1));
    };
    if function.params.len() != 2 {
        return Err(EvalError::runtime_error(
            "reduce",
            "function must take exactly 2 arguments",
        ));
    }
    let Value::List(values) = &args[1] else {
        return Err(EvalError::type_error("reduce", "list", &args[1], 2));
    };
    let elements = values.borrow().clone();
    let (mut accumulator, rest) = match args.get(2) {
        Some(initial) => (initial.clone(), &elements[..]),
        None => {
            let Some((first, rest)) = elements.split_first() else {
                return Err(EvalError::runtime_error(
                    "reduce",
                    "empty list requires an initial value",
                ));
            };
            (first.clone(), rest)
        }
    };
    for element in rest {
        accumulator = apply_function(
            function,
            vec![accumulator, element.clone()],
            registry,
            eval,
        )?;
    }
    Ok(accumulator)
}

/// Applies `function` across a collection argument: element-wise for lists,
/// directly for any other value. Yields `(result, original)` pairs so `map`
/// keeps results and `filter` keeps originals.
fn call_on_collection(
    function: &Rc<FunctionValue>,
    collection: &Value,
    registry: &Registry,
    eval: EvalCallback,
) -> Result<Vec<(Value, Value)>, EvalError> {
    let mut pairs = Vec::new();
    match collection {
        Value::List(values) => {
            let elements = values.borrow().clone();
            for element in elements {
                let result = apply_function(function, vec![element.clone()], registry, eval)?;
                pairs.push((result, element));
            }
        }
        other => {
            let result = apply_function(function, vec![other.clone()], registry, eval)?;
            pairs.push((result, other.clone()));
        }
    }
    Ok(pairs)
}

pub fn register(symbols: &mut HashMap<&'static str, Value>) {
    symbols.insert("len", builtin("len", builtin_len));
    symbols.insert("list", builtin("list", builtin_list));
    symbols.insert("append", builtin("append", builtin_append));
    symbols.insert("map", builtin("map", builtin_map));
    symbols.insert("filter", builtin("filter", builtin_filter));
    symbols.insert("zip", builtin("zip", builtin_zip));
    symbols.insert("reduce", builtin("reduce", builtin_reduce));
}
