pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod reporter;
pub mod resolver;
pub mod scanner;
pub mod types;

use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::reporter::Reporter;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Runs one chunk of source through the whole pipeline. Each stage only
/// starts if the previous ones left the reporter clean; runtime errors
/// are reported and flagged but do not panic or exit here, so the REPL
/// can keep going with the same interpreter.
pub fn run(source: &str, interpreter: &mut Interpreter, reporter: &mut Reporter, repl: bool) {
    let tokens = Scanner::new(source).scan_tokens(reporter);
    if reporter.had_error {
        return;
    }
    let statements = {
        let mut parser = Parser::new(tokens, &mut interpreter.id, reporter);
        parser.parse()
    };
    if reporter.had_error {
        return;
    }
    Resolver::new(interpreter, reporter).resolve(&statements);
    if reporter.had_error {
        return;
    }
    if let Err(error) = interpreter.interpret(&statements, repl) {
        reporter.runtime_error(&error);
    }
}
