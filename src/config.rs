// ABOUTME: Configuration and constants for the interpreter

pub const VERSION: &str = "1.0.0";

/// REPL prompt, printed without a trailing newline.
pub const PROMPT: &str = "rootlang>";

/// REPL history file persisted across sessions.
pub const HISTORY_FILE: &str = ".rootlang_history";

/// File extension appended when resolving import paths.
pub const MODULE_EXTENSION: &str = "rl";

/// Name of the function a batch-mode module must declare at its top level.
pub const MAIN_FUNCTION: &str = "main";
