use crate::interpreter::RuntimeError;
use crate::scanner::{Token, TokenType};
use log::debug;

/// Shared diagnostic sink for every pipeline stage. Diagnostics go to
/// stderr; the driver consults the flags between stages and picks the
/// process exit code from them.
#[derive(Debug, Default)]
pub struct Reporter {
    pub had_error: bool,
    pub had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A diagnostic with no token context, e.g. from the scanner.
    pub fn error(&mut self, line: usize, msg: &str) {
        self.report(line, "", msg);
    }

    /// A diagnostic anchored at a token, e.g. from the parser or resolver.
    pub fn token_error(&mut self, token: &Token, msg: &str) {
        if token.token_type == TokenType::Eof {
            self.report(token.line, " at end", msg);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), msg);
        }
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        debug!("runtime error: {:?}", error);
        eprintln!("{}", error);
        self.had_runtime_error = true;
    }

    fn report(&mut self, line: usize, location: &str, msg: &str) {
        debug!("error at line {}: {}", line, msg);
        eprintln!("[line {}] Error{}: {}", line, location, msg);
        self.had_error = true;
    }
}
