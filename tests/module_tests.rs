// ABOUTME: Importer tests running programs against real module files

use rootlang::builtins::Registry;
use rootlang::env::Environment;
use rootlang::error::EvalError;
use rootlang::eval::eval_program;
use rootlang::lexer::Lexer;
use rootlang::parser::Parser;
use rootlang::value::Value;
use std::path::Path;

fn run_with_paths(input: &str, paths: &[&Path]) -> Result<Value, EvalError> {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    assert!(
        !parser.has_errors(),
        "parse errors for {:?}: {:?}",
        input,
        parser.all_errors()
    );
    let registry = Registry::with_paths(paths.iter().map(|p| p.to_path_buf()).collect());
    eval_program(&program, Environment::new(), &registry)
}

fn write_module(dir: &Path, name: &str, source: &str) {
    std::fs::write(dir.join(format!("{}.rl", name)), source).unwrap();
}

#[test]
fn test_module_shadowing_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "mod", "let y = 5; let addY = x => x + y;");

    let result = run_with_paths(
        r#"import "mod" as m; let y = 99; m::addY(10);"#,
        &[dir.path()],
    );
    match result {
        Ok(Value::Integer(n)) => assert_eq!(n, 15),
        other => panic!("expected Integer(15), got {:?}", other),
    }
}

#[test]
fn test_member_access_without_call() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "constants", "let answer = 42;");

    let result = run_with_paths(r#"import "constants"; constants::answer;"#, &[dir.path()]);
    match result {
        Ok(Value::Integer(n)) => assert_eq!(n, 42),
        other => panic!("expected Integer(42), got {:?}", other),
    }
}

#[test]
fn test_default_binding_uses_last_path_segment() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("tools");
    std::fs::create_dir(&nested).unwrap();
    write_module(&nested, "math", "let double = x => x * 2;");

    let result = run_with_paths(r#"import "tools/math"; math::double(21);"#, &[dir.path()]);
    match result {
        Ok(Value::Integer(n)) => assert_eq!(n, 42),
        other => panic!("expected Integer(42), got {:?}", other),
    }
}

#[test]
fn test_module_arguments_evaluate_in_caller_environment() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "apply", "let call = f => f(10);");

    // The lambda argument closes over the caller's scope, not the module's.
    let result = run_with_paths(
        r#"import "apply" as a; let base = 100; a::call(x => x + base);"#,
        &[dir.path()],
    );
    match result {
        Ok(Value::Integer(n)) => assert_eq!(n, 110),
        other => panic!("expected Integer(110), got {:?}", other),
    }
}

#[test]
fn test_module_member_miss_reports_undeclared() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "tiny", "let present = 1;");

    let error = run_with_paths(r#"import "tiny"; tiny::absent;"#, &[dir.path()]).unwrap_err();
    assert_eq!(error.to_string(), "absent was not declared");
}

#[test]
fn test_missing_module_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = run_with_paths(r#"import "ghost";"#, &[dir.path()]).unwrap_err();
    assert_eq!(error.to_string(), "no module ghost found");
}

#[test]
fn test_module_with_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "broken", "let = oops");

    let error = run_with_paths(r#"import "broken";"#, &[dir.path()]).unwrap_err();
    assert!(error
        .to_string()
        .starts_with("error parsing the module broken:"));
}

#[test]
fn test_module_evaluation_error_propagates() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "faulty", "let x = missing;");

    let error = run_with_paths(r#"import "faulty";"#, &[dir.path()]).unwrap_err();
    assert_eq!(error.to_string(), "missing was not declared");
}

#[test]
fn test_transitive_imports() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "inner", "let base = 7;");
    write_module(
        dir.path(),
        "outer",
        r#"import "inner"; let plus = x => x + inner::base;"#,
    );

    let result = run_with_paths(r#"import "outer" as o; o::plus(3);"#, &[dir.path()]);
    match result {
        Ok(Value::Integer(n)) => assert_eq!(n, 10),
        other => panic!("expected Integer(10), got {:?}", other),
    }
}

#[test]
fn test_reimport_re_evaluates() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "fresh", "let marker = list(1);");

    // Each import builds a new module environment, so the two bindings hold
    // distinct list objects.
    let result = run_with_paths(
        r#"import "fresh" as a; import "fresh" as b; a::marker == b::marker;"#,
        &[dir.path()],
    );
    match result {
        Ok(Value::Boolean(equal)) => assert!(!equal),
        other => panic!("expected Boolean(false), got {:?}", other),
    }
}

#[test]
fn test_builtin_module_wins_over_files() {
    let dir = tempfile::tempdir().unwrap();
    // A file named net.rl must not shadow the builtin net module.
    write_module(dir.path(), "net", "let listen = 1;");

    let result = run_with_paths(r#"import "net"; net::get_clients;"#, &[dir.path()]);
    match result {
        Ok(Value::Builtin(builtin)) => assert_eq!(builtin.name, "get_clients"),
        other => panic!("expected builtin, got {:?}", other),
    }
}

#[test]
fn test_module_functions_keep_module_scope_under_partial_application() {
    let dir = tempfile::tempdir().unwrap();
    write_module(
        dir.path(),
        "adder",
        "let offset = 1000; let add3 = (a, b, c) => a + b + c + offset;",
    );

    let result = run_with_paths(
        r#"import "adder"; let f = adder::add3; f(1)(2)(3);"#,
        &[dir.path()],
    );
    match result {
        Ok(Value::Integer(n)) => assert_eq!(n, 1006),
        other => panic!("expected Integer(1006), got {:?}", other),
    }
}
