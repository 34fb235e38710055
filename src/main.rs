use clap::Parser as ClapParser;
use rootlang::builtins::{apply_function, Registry};
use rootlang::config;
use rootlang::env::Environment;
use rootlang::eval::{eval_block, eval_program};
use rootlang::lexer::Lexer;
use rootlang::parser::Parser;
use rootlang::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Interpreter for the rootlang scripting language
#[derive(ClapParser, Debug)]
#[command(name = "rootlang")]
#[command(version = config::VERSION)]
#[command(about = "A dynamically-typed scripting language with partial application and modules")]
struct CliArgs {
    /// Module file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "MODULE")]
    module: Option<PathBuf>,

    /// Add a module search directory (can be repeated)
    #[arg(long = "module-path", value_name = "DIR", action = clap::ArgAction::Append)]
    module_paths: Vec<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let registry = Registry::with_paths(build_module_paths(&args));

    match args.module {
        Some(module) => run_module(&module, &registry),
        None => run_repl(&registry),
    }
}

/// Search directories in resolution order: explicit flags, then the batch
/// module's own directory, then the working directory.
fn build_module_paths(args: &CliArgs) -> Vec<PathBuf> {
    let mut paths = args.module_paths.clone();
    if let Some(parent) = args.module.as_deref().and_then(|module| module.parent()) {
        if !parent.as_os_str().is_empty() {
            paths.push(parent.to_path_buf());
        }
    }
    paths.push(PathBuf::from("."));
    paths
}

/// Batch mode: evaluate the file as the principal module, then call its
/// top-level `main` with zero arguments. Any error goes to stderr with a
/// non-zero exit status.
fn run_module(path: &Path, registry: &Registry) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|error| format!("cannot read module {}: {}", path.display(), error))?;

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse_program();
    if parser.has_errors() {
        return Err(parser.all_errors().join("\n").into());
    }

    let env = Environment::new();
    eval_program(&program, env.clone(), registry)?;

    let Some(main_value) = env.get(config::MAIN_FUNCTION) else {
        return Err(format!("no main function declared in {}", path.display()).into());
    };
    let Value::Function(main_function) = main_value else {
        return Err(format!("main must be a function in {}", path.display()).into());
    };
    apply_function(&main_function, Vec::new(), registry, eval_block)?;
    Ok(())
}

/// REPL mode: read a line, parse it, print either the collected parse errors
/// or the result's inspect form. Declarations evaluate to an invisible null
/// and print nothing.
fn run_repl(registry: &Registry) -> Result<(), Box<dyn std::error::Error>> {
    let editor_config = Config::builder().auto_add_history(true).build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|error| format!("failed to initialize REPL: {}", error))?;
    let _ = editor.load_history(config::HISTORY_FILE);

    let env = Environment::new();
    loop {
        match editor.readline(config::PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                evaluate_line(&line, &env, registry);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("Error: {}", error);
                break;
            }
        }
    }
    let _ = editor.save_history(config::HISTORY_FILE);
    Ok(())
}

fn evaluate_line(line: &str, env: &Rc<Environment>, registry: &Registry) {
    let mut parser = Parser::new(Lexer::new(line));
    let program = parser.parse_program();
    if parser.has_errors() {
        for error in parser.all_errors() {
            eprintln!("{}", error);
        }
        return;
    }
    match eval_program(&program, env.clone(), registry) {
        Ok(Value::Null) => {}
        Ok(value) => println!("{}", value),
        Err(error) => eprintln!("{}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_paths_default_to_working_directory() {
        let args = CliArgs {
            module: None,
            module_paths: vec![],
        };
        assert_eq!(build_module_paths(&args), vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_module_paths_include_module_parent() {
        let args = CliArgs {
            module: Some(PathBuf::from("scripts/server.rl")),
            module_paths: vec![PathBuf::from("lib")],
        };
        assert_eq!(
            build_module_paths(&args),
            vec![
                PathBuf::from("lib"),
                PathBuf::from("scripts"),
                PathBuf::from("."),
            ]
        );
    }

    #[test]
    fn test_module_in_working_directory_has_no_parent_entry() {
        let args = CliArgs {
            module: Some(PathBuf::from("server.rl")),
            module_paths: vec![],
        };
        assert_eq!(build_module_paths(&args), vec![PathBuf::from(".")]);
    }
}
