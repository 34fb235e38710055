// ABOUTME: Module importer: lazy source-to-module evaluation with namespace access

use crate::builtins::Registry;
use crate::config::MODULE_EXTENSION;
use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::eval_program;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::{ModuleValue, Value};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Resolves an import and binds the resulting module under `name` in the
/// caller's environment. Built-in modules registered under the bound name
/// win over the filesystem; otherwise `<path>.rl` is resolved against the
/// registry's search directories (first match wins), read, parsed, and
/// evaluated in a fresh root environment. Re-importing re-evaluates.
pub fn import_module(
    path: &str,
    name: &str,
    env: &Rc<Environment>,
    registry: &Registry,
) -> Result<(), EvalError> {
    if let Some(value @ Value::Module(_)) = registry.lookup(name) {
        env.set(name, value);
        return Ok(());
    }

    let Some(file) = resolve_module_path(path, registry.paths()) else {
        return Err(EvalError::ModuleNotFound {
            path: path.to_string(),
        });
    };
    let source = std::fs::read_to_string(&file).map_err(|error| EvalError::ModuleUnreadable {
        path: path.to_string(),
        reason: error.to_string(),
    })?;

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse_program();
    if parser.has_errors() {
        return Err(EvalError::ModuleParseFailed {
            path: path.to_string(),
            errors: parser.all_errors().join("\n"),
        });
    }

    let module_env = Environment::new();
    eval_program(&program, module_env.clone(), registry)?;

    env.set(
        name,
        Value::Module(Rc::new(ModuleValue {
            name: name.to_string(),
            path: path.to_string(),
            env: module_env,
        })),
    );
    Ok(())
}

fn resolve_module_path(path: &str, directories: &[PathBuf]) -> Option<PathBuf> {
    let file_name = format!("{}.{}", path, MODULE_EXTENSION);
    directories
        .iter()
        .map(|directory| directory.join(&file_name))
        .find(|candidate| Path::is_file(candidate))
}
