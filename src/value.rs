// ABOUTME: Runtime value model: tagged variants with inspect strings

use crate::ast::{Block, Identifier};
use crate::builtins::bytes::{Reader, Writer};
use crate::builtins::net::{Client, Server};
use crate::builtins::Registry;
use crate::env::Environment;
use crate::error::EvalError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Evaluator hook handed to built-in functions so higher-order built-ins can
/// run user closures.
pub type EvalCallback = fn(&Block, Rc<Environment>, &Registry) -> Result<Value, EvalError>;

/// Host callback implementing a built-in: `(caller_env, registry,
/// eval_callback, args)`.
pub type BuiltinFn =
    fn(Rc<Environment>, &Registry, EvalCallback, &[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Str(Rc<String>),
    Null,
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinValue>),
    Module(Rc<ModuleValue>),
    /// Sentinel that unwinds blocks until the nearest call site unwraps it.
    /// Never observed by user programs.
    Return(Box<Value>),
    Server(Rc<Server>),
    Client(Rc<Client>),
    Reader(Rc<Reader>),
    Writer(Rc<Writer>),
}

pub struct FunctionValue {
    pub params: Vec<Identifier>,
    pub body: Rc<Block>,
    pub env: Rc<Environment>,
}

impl fmt::Debug for FunctionValue {
    // The captured environment can reference this function back; leave it out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub struct BuiltinValue {
    pub name: &'static str,
    pub function: BuiltinFn,
}

impl fmt::Debug for BuiltinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinValue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

pub struct ModuleValue {
    pub name: String,
    pub path: String,
    pub env: Rc<Environment>,
}

impl fmt::Debug for ModuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleValue")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn string(text: impl Into<String>) -> Value {
        Value::Str(Rc::new(text.into()))
    }

    pub fn list(values: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(values)))
    }

    /// Kind tag used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin function",
            Value::Module(_) => "module",
            Value::Return(_) => "return",
            Value::Server(_) => "server",
            Value::Client(_) => "client",
            Value::Reader(_) => "reader buffer",
            Value::Writer(_) => "writer buffer",
        }
    }

    /// The single truthiness rule shared by `if` and `filter`: booleans by
    /// value, integers when non-zero, strings when non-empty, all else falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(value) => *value,
            Value::Integer(value) => *value != 0,
            Value::Str(value) => !value.is_empty(),
            _ => false,
        }
    }

    /// `==` semantics: integers by value, booleans and null by their
    /// singleton identity, everything else by reference identity of the
    /// underlying object. Two structurally equal lists built separately
    /// compare unequal.
    pub fn identical(left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Integer(l), Value::Integer(r)) => l == r,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::Null, Value::Null) => true,
            (Value::Str(l), Value::Str(r)) => Rc::ptr_eq(l, r),
            (Value::List(l), Value::List(r)) => Rc::ptr_eq(l, r),
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::Builtin(l), Value::Builtin(r)) => Rc::ptr_eq(l, r),
            (Value::Module(l), Value::Module(r)) => Rc::ptr_eq(l, r),
            (Value::Server(l), Value::Server(r)) => Rc::ptr_eq(l, r),
            (Value::Client(l), Value::Client(r)) => Rc::ptr_eq(l, r),
            (Value::Reader(l), Value::Reader(r)) => Rc::ptr_eq(l, r),
            (Value::Writer(l), Value::Writer(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::Null => write!(f, "null"),
            Value::List(values) => {
                let rendered: Vec<String> =
                    values.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Function(function) => {
                let params: Vec<String> =
                    function.params.iter().map(|p| p.name.clone()).collect();
                write!(f, "({})=>{}", params.join(","), function.body)
            }
            Value::Builtin(builtin) => write!(f, "{}", builtin.name),
            Value::Module(module) => write!(f, "{}", module.name),
            Value::Return(value) => write!(f, "{}", value),
            Value::Server(server) => write!(f, "{}", server),
            Value::Client(client) => write!(f, "{}", client),
            Value::Reader(reader) => write!(f, "{}", reader),
            Value::Writer(writer) => write!(f, "{}", writer),
        }
    }
}
