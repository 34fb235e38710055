// ABOUTME: Recursive tree-walking evaluator over the AST

use crate::ast::{Block, Expression, Program, Statement};
use crate::builtins::{apply_function, Registry};
use crate::env::Environment;
use crate::error::EvalError;
use crate::importer::import_module;
use crate::value::{FunctionValue, Value};
use std::rc::Rc;

/// Evaluates a whole program. Like a block, but a terminal Return unwraps to
/// its inner value.
pub fn eval_program(
    program: &Program,
    env: Rc<Environment>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for statement in &program.statements {
        result = eval_statement(statement, env.clone(), registry)?;
        if let Value::Return(inner) = result {
            return Ok(*inner);
        }
    }
    Ok(result)
}

/// Evaluates a block's statements in order; a Return carrier stops the block
/// and propagates upward intact.
pub fn eval_block(
    block: &Block,
    env: Rc<Environment>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env.clone(), registry)?;
        if matches!(result, Value::Return(_)) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_statement(
    statement: &Statement,
    env: Rc<Environment>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    match statement {
        Statement::Let { name, value, .. } => {
            let value = eval_expression(value, env.clone(), registry)?;
            env.set(name.name.clone(), value);
            // Declarations have no value of their own.
            Ok(Value::Null)
        }
        Statement::Return { value, .. } => {
            let value = eval_expression(value, env, registry)?;
            Ok(Value::Return(Box::new(value)))
        }
        Statement::Expression { expression } => eval_expression(expression, env, registry),
        Statement::Block(block) => eval_block(block, env, registry),
        Statement::Import { path, name, .. } => {
            import_module(path, &name.name, &env, registry)?;
            Ok(Value::Null)
        }
    }
}

pub fn eval_expression(
    expression: &Expression,
    env: Rc<Environment>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    match expression {
        Expression::Integer { value, .. } => Ok(Value::Integer(*value)),
        Expression::Str { value, .. } => Ok(Value::string(value.clone())),
        Expression::Bool { value, .. } => Ok(Value::Boolean(*value)),
        Expression::Identifier(identifier) => env
            .get(&identifier.name)
            .or_else(|| registry.lookup(&identifier.name))
            .ok_or_else(|| EvalError::UndeclaredIdentifier {
                name: identifier.name.clone(),
            }),
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(right, env, registry)?;
            eval_prefix(operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
            ..
        } => {
            if operator == "::" {
                return eval_module_access(left, right, env, registry);
            }
            let left = eval_expression(left, env.clone(), registry)?;
            let right = eval_expression(right, env, registry)?;
            eval_infix(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let condition = eval_expression(condition, env.clone(), registry)?;
            if condition.is_truthy() {
                eval_block(consequence, env, registry)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env, registry)
            } else {
                Ok(Value::Null)
            }
        }
        Expression::Function { params, body, .. } => Ok(Value::Function(Rc::new(FunctionValue {
            params: params.clone(),
            body: Rc::clone(body),
            env: env.extend(),
        }))),
        Expression::Call {
            callee, arguments, ..
        } => {
            let args = eval_expressions(arguments, env.clone(), registry)?;
            let callee = eval_expression(callee, env.clone(), registry)?;
            call_value(callee, args, &env, registry)
        }
        // A parameter list that never met `=>`; the original yielded nothing.
        Expression::Params { .. } => Ok(Value::Null),
    }
}

fn eval_expressions(
    expressions: &[Expression],
    env: Rc<Environment>,
    registry: &Registry,
) -> Result<Vec<Value>, EvalError> {
    let mut values = Vec::with_capacity(expressions.len());
    for expression in expressions {
        values.push(eval_expression(expression, env.clone(), registry)?);
    }
    Ok(values)
}

fn call_value(
    callee: Value,
    args: Vec<Value>,
    env: &Rc<Environment>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    match callee {
        Value::Function(function) => apply_function(&function, args, registry, eval_block),
        Value::Builtin(builtin) => (builtin.function)(env.clone(), registry, eval_block, &args),
        other => Err(EvalError::NotAFunction {
            callee: other.to_string(),
        }),
    }
}

/// `::` access: the left side must evaluate to a module. A member identifier
/// is looked up inside the module environment; a member call evaluates its
/// callee inside the module environment while the arguments are evaluated in
/// the caller's environment.
fn eval_module_access(
    left: &Expression,
    right: &Expression,
    env: Rc<Environment>,
    registry: &Registry,
) -> Result<Value, EvalError> {
    let left = eval_expression(left, env.clone(), registry)?;
    let Value::Module(module) = left else {
        return Err(EvalError::ModuleExpected);
    };
    match right {
        Expression::Identifier(_) => eval_expression(right, module.env.clone(), registry),
        Expression::Call {
            callee, arguments, ..
        } => {
            let args = eval_expressions(arguments, env.clone(), registry)?;
            let callee = eval_expression(callee, module.env.clone(), registry)?;
            call_value(callee, args, &env, registry)
        }
        _ => Err(EvalError::InvalidModuleAccess),
    }
}

fn eval_prefix(operator: &str, right: Value) -> Result<Value, EvalError> {
    match operator {
        "-" => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
            other => Err(EvalError::UnknownPrefixOperator {
                operator: "-".to_string(),
                operand: other.to_string(),
            }),
        },
        "!" => Ok(eval_bang(right)),
        _ => Err(EvalError::UnknownPrefixOperator {
            operator: operator.to_string(),
            operand: right.to_string(),
        }),
    }
}

fn eval_bang(right: Value) -> Value {
    match right {
        Value::Integer(value) => Value::Boolean(value == 0),
        Value::Boolean(value) => Value::Boolean(!value),
        Value::Null => Value::Boolean(true),
        _ => Value::Boolean(false),
    }
}

fn eval_infix(operator: &str, left: Value, right: Value) -> Result<Value, EvalError> {
    if let (Value::Integer(l), Value::Integer(r)) = (&left, &right) {
        return eval_integer_infix(operator, *l, *r);
    }
    let has_string = matches!(left, Value::Str(_)) || matches!(right, Value::Str(_));
    if has_string && operator == "+" {
        return Ok(Value::string(format!("{}{}", left, right)));
    }
    if has_string && operator == "!=" {
        return Ok(Value::Boolean(left.to_string() != right.to_string()));
    }
    match operator {
        "==" => Ok(Value::Boolean(Value::identical(&left, &right))),
        "!=" => Ok(Value::Boolean(!Value::identical(&left, &right))),
        _ => Err(EvalError::UnknownInfixOperator {
            operator: operator.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }),
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64) -> Result<Value, EvalError> {
    match operator {
        "+" => Ok(Value::Integer(left.wrapping_add(right))),
        "-" => Ok(Value::Integer(left.wrapping_sub(right))),
        "*" => Ok(Value::Integer(left.wrapping_mul(right))),
        "/" => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Integer(left.wrapping_div(right)))
        }
        "%" => {
            if right == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Integer(left.wrapping_rem(right)))
        }
        "==" => Ok(Value::Boolean(left == right)),
        "!=" => Ok(Value::Boolean(left != right)),
        "<" => Ok(Value::Boolean(left < right)),
        ">" => Ok(Value::Boolean(left > right)),
        _ => Err(EvalError::UnknownInfixOperator {
            operator: operator.to_string(),
            left: left.to_string(),
            right: right.to_string(),
        }),
    }
}
