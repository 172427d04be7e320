use crate::reporter::Reporter;
use log::{debug, trace};
use phf::phf_map;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and" => TokenType::And,
    "class" => TokenType::Class,
    "else" => TokenType::Else,
    "false" => TokenType::False,
    "for" => TokenType::For,
    "fun" => TokenType::Fun,
    "if" => TokenType::If,
    "nil" => TokenType::Nil,
    "or" => TokenType::Or,
    "print" => TokenType::Print,
    "return" => TokenType::Return,
    "this" => TokenType::This,
    "true" => TokenType::True,
    "var" => TokenType::Var,
    "while" => TokenType::While,
};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    String(Literal),
    Number(Literal),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    This,
    True,
    Var,
    While,

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(Arc<String>),
    Number(f64),
    Boolean(bool),
    Nil,
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: Arc<String>,
    pub line: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Scanner {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the whole source, reporting lexical errors as it goes. The
    /// scanner never aborts: offending characters are skipped and the
    /// token stream always ends with an `Eof` token.
    pub fn scan_tokens(mut self, reporter: &mut Reporter) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token(reporter);
        }
        self.tokens.push(Token {
            token_type: TokenType::Eof,
            lexeme: Arc::new(String::new()),
            line: self.line,
        });
        debug!("scanned {} tokens", self.tokens.len());
        self.tokens
    }

    fn scan_token(&mut self, reporter: &mut Reporter) {
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return,
        };
        let token = match ch {
            '(' => Some(TokenType::LeftParen),
            ')' => Some(TokenType::RightParen),
            '{' => Some(TokenType::LeftBrace),
            '}' => Some(TokenType::RightBrace),
            ',' => Some(TokenType::Comma),
            '.' => Some(TokenType::Dot),
            '-' => Some(TokenType::Minus),
            '+' => Some(TokenType::Plus),
            ';' => Some(TokenType::Semicolon),
            '*' => Some(TokenType::Star),
            '!' => Some(if self.match_char('=') {
                TokenType::BangEqual
            } else {
                TokenType::Bang
            }),
            '=' => Some(if self.match_char('=') {
                TokenType::EqualEqual
            } else {
                TokenType::Equal
            }),
            '<' => Some(if self.match_char('=') {
                TokenType::LessEqual
            } else {
                TokenType::Less
            }),
            '>' => Some(if self.match_char('=') {
                TokenType::GreaterEqual
            } else {
                TokenType::Greater
            }),
            '/' => {
                if self.match_char('/') {
                    // A comment goes until the end of the line.
                    while self.peek().filter(|&c| c != '\n').is_some() {
                        self.advance();
                    }
                    None
                } else {
                    Some(TokenType::Slash)
                }
            }
            ' ' | '\r' | '\t' => None,
            '\n' => {
                self.line += 1;
                None
            }
            '"' => {
                self.string(reporter);
                None
            }
            ch => {
                if ch.is_ascii_digit() {
                    self.number();
                } else if ch.is_ascii_alphabetic() || ch == '_' {
                    self.identifier();
                } else {
                    reporter.error(self.line, "Unexpected character.");
                }
                None
            }
        };
        if let Some(token) = token {
            self.add_token(token);
        }
    }

    fn identifier(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' => {
                    self.advance();
                }
                _ => break,
            }
        }
        let text = self.lexeme();
        let token_type = KEYWORDS
            .get(text.as_str())
            .cloned()
            .unwrap_or(TokenType::Identifier);
        self.add_token(token_type);
    }

    fn number(&mut self) {
        while self.peek().filter(char::is_ascii_digit).is_some() {
            self.advance();
        }
        // A fractional part requires at least one digit after the dot.
        if let (Some('.'), Some(next)) = (self.peek(), self.peek_next()) {
            if next.is_ascii_digit() {
                self.advance();
                while self.peek().filter(char::is_ascii_digit).is_some() {
                    self.advance();
                }
            }
        }
        let value: f64 = self.lexeme().parse().expect("lexeme is a valid number");
        self.add_token(TokenType::Number(Literal::Number(value)));
    }

    fn string(&mut self, reporter: &mut Reporter) {
        while let Some(ch) = self.peek() {
            if ch == '"' {
                break;
            }
            if ch == '\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            reporter.error(self.line, "Unterminated string.");
            return;
        }
        // The closing quote.
        self.advance();
        let value: String = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.add_token(TokenType::String(Literal::String(Arc::new(value))));
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.current).copied();
        self.current += 1;
        ch
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.current += 1;
                true
            }
            _ => false,
        }
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme = self.lexeme();
        trace!("token {:?} '{}' at line {}", token_type, lexeme, self.line);
        self.tokens.push(Token {
            token_type,
            lexeme: Arc::new(lexeme),
            line: self.line,
        });
    }
}
