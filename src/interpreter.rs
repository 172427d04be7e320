use crate::ast_printer::print_ast;
use crate::class::{Constructor, Instance, LoxClass};
use crate::environment::Environment;
use crate::expr::{Expr, Stmt};
use crate::function::{Callable, Clock, LoxFunction};
use crate::scanner::{Literal, Token, TokenType};
use crate::types::{create_shared, Shared};
use log::{debug, trace};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

/// A Lox runtime value. Callables and instances compare by identity;
/// everything else by value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Arc<String>),
    Callable(Rc<dyn Callable>),
    Instance(Shared<Instance>),
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{}", b),
            // `{}` on f64 already drops a zero fractional part, so
            // 1.0 prints as "1" and 1.5 as "1.5".
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Callable(c) => write!(f, "{}", c),
            Self::Instance(i) => write!(f, "{}", &*i.borrow()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            // IEEE-754 comparison: NaN is not equal to itself.
            (Self::Number(l), Self::Number(r)) => l == r,
            (Self::String(l), Self::String(r)) => l == r,
            (Self::Callable(l), Self::Callable(r)) => Rc::ptr_eq(l, r),
            (Self::Instance(l), Self::Instance(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Nil => Value::Nil,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

#[derive(Debug, Error)]
#[error("{msg}\n[line {line}]")]
pub struct RuntimeError {
    pub msg: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new<T>(token: &Token, msg: &str) -> Result<T, Self> {
        Err(Self::new_err(token, msg))
    }

    pub fn new_err(token: &Token, msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
            line: token.line,
        }
    }
}

pub struct Interpreter {
    pub environment: Shared<Environment>,
    pub globals: Shared<Environment>,
    locals: HashMap<usize, usize>,
    /// Next expression id to hand to a parser. Ids key the resolution
    /// map, so one counter must span every parse fed to this
    /// interpreter (the REPL parses many chunks).
    pub id: usize,
    repl: bool,
    out: Shared<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(create_shared(io::stdout()))
    }

    /// An interpreter writing program output to the given sink instead
    /// of stdout. Diagnostics still go through the reporter.
    pub fn with_output(out: Shared<dyn Write>) -> Self {
        let globals = Environment::new(None);
        let clock = Clock;
        globals
            .borrow_mut()
            .define(&clock.name(), Value::Callable(Rc::new(clock)));
        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            id: 0,
            repl: false,
            out,
        }
    }

    /// Records the scope distance for an expression id. Called by the
    /// resolver; `lookup_variable` and assignment consult the map.
    pub fn resolve(&mut self, id: usize, distance: usize) {
        self.locals.insert(id, distance);
    }

    /// Runs a program. In REPL mode expression statements echo their
    /// value. Parse failures show up as `None` entries and are skipped;
    /// the driver never gets here with `had_error` set anyway.
    pub fn interpret(&mut self, statements: &[Option<Stmt>], repl: bool) -> Result<(), RuntimeError> {
        self.repl = repl;
        for statement in statements.iter().flatten() {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// Executes one statement. `Ok(Some(value))` is a `return` on its
    /// way up to the nearest enclosing function call.
    pub fn execute(&mut self, statement: &Stmt) -> Result<Option<Value>, RuntimeError> {
        match statement {
            Stmt::Expression(expr) => {
                debug!("eval {}", print_ast(expr));
                let value = self.evaluate(expr)?;
                if self.repl {
                    let mut out = self.out.borrow_mut();
                    let _ = writeln!(out, "=> {}", value);
                }
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let mut out = self.out.borrow_mut();
                let _ = writeln!(out, "{}", value);
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(&name.lexeme, value);
            }
            Stmt::Block { statements } => {
                let environment = Environment::new(Some(self.environment.clone()));
                return self.execute_block(statements, environment);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let signal = if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?
                } else {
                    None
                };
                if signal.is_some() {
                    return Ok(signal);
                }
            }
            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    let signal = self.execute(body)?;
                    if signal.is_some() {
                        return Ok(signal);
                    }
                }
            }
            Stmt::Function { name, params, body } => {
                let function =
                    LoxFunction::new(name, params, body, self.environment.clone(), false);
                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Callable(function));
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                return Ok(Some(value));
            }
            Stmt::Class { name, methods } => {
                // The name is bound before the methods are built so the
                // class body can refer to the class itself.
                self.environment.borrow_mut().define(&name.lexeme, Value::Nil);
                let mut method_map = HashMap::new();
                for method in methods {
                    if let Stmt::Function {
                        name: method_name,
                        params,
                        body,
                    } = method
                    {
                        let is_initializer = method_name.lexeme.as_str() == "init";
                        let function = LoxFunction::new(
                            method_name,
                            params,
                            body,
                            self.environment.clone(),
                            is_initializer,
                        );
                        method_map.insert(method_name.lexeme.to_string(), function);
                    }
                }
                let class = LoxClass::new(&name.lexeme, method_map);
                self.environment
                    .borrow_mut()
                    .assign(name, Value::Callable(Rc::new(Constructor::new(class))))?;
            }
        }
        Ok(None)
    }

    /// Runs `statements` in `environment`, restoring the previous
    /// environment on every exit path, including errors. Return signals
    /// pass through untouched.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Shared<Environment>,
    ) -> Result<Option<Value>, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Option<Value>, RuntimeError> {
        for statement in statements {
            let signal = self.execute(statement)?;
            if signal.is_some() {
                return Ok(signal);
            }
        }
        Ok(None)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let value = match expr {
            Expr::Literal(literal) => Value::from(literal),
            Expr::Grouping(inner) => self.evaluate(inner)?,
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.token_type {
                    TokenType::Minus => match right {
                        Value::Number(n) => Value::Number(-n),
                        _ => RuntimeError::new(operator, "Operand must be a number.")?,
                    },
                    TokenType::Bang => Value::Boolean(!is_truthy(&right)),
                    _ => RuntimeError::new(operator, "Invalid unary operator.")?,
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(&left, operator, &right)?
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator.token_type {
                    TokenType::Or => {
                        if is_truthy(&left) {
                            left
                        } else {
                            self.evaluate(right)?
                        }
                    }
                    TokenType::And => {
                        if is_truthy(&left) {
                            self.evaluate(right)?
                        } else {
                            left
                        }
                    }
                    _ => RuntimeError::new(operator, "Invalid logical operator.")?,
                }
            }
            Expr::Variable { name, id } => self.lookup_variable(name, *id)?,
            Expr::This { keyword, id } => self.lookup_variable(keyword, *id)?,
            Expr::Assign { name, value, id } => {
                let value = self.evaluate(value)?;
                if let Some(&distance) = self.locals.get(id) {
                    self.environment
                        .borrow_mut()
                        .assign_at(distance, name, value.clone())?;
                } else {
                    self.globals.borrow_mut().assign(name, value.clone())?;
                }
                value
            }
            Expr::Call {
                callee,
                paren,
                args,
            } => {
                let callee = self.evaluate(callee)?;
                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.evaluate(arg)?);
                }
                let function = match &callee {
                    Value::Callable(function) => function.clone(),
                    _ => RuntimeError::new(paren, "Can only call functions and classes.")?,
                };
                if arguments.len() != function.arity() {
                    return RuntimeError::new(
                        paren,
                        &format!(
                            "Expected {} arguments but got {}.",
                            function.arity(),
                            arguments.len()
                        ),
                    );
                }
                function.call(self, &arguments)?
            }
            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = instance.borrow().get(name, instance.clone())?;
                        value
                    }
                    _ => RuntimeError::new(name, "Only instances have properties.")?,
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                match object {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.borrow_mut().set(name, value.clone());
                        value
                    }
                    _ => RuntimeError::new(name, "Only instances have fields.")?,
                }
            }
        };
        Ok(value)
    }

    fn binary(&self, left: &Value, operator: &Token, right: &Value) -> Result<Value, RuntimeError> {
        let value = match operator.token_type {
            TokenType::BangEqual => Value::Boolean(left != right),
            TokenType::EqualEqual => Value::Boolean(left == right),
            TokenType::Plus => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Value::Number(l + r),
                (Value::String(l), Value::String(r)) => {
                    Value::String(Arc::new(format!("{}{}", l, r)))
                }
                _ => RuntimeError::new(operator, "Operands must be two numbers or two strings.")?,
            },
            TokenType::Minus => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Number(l - r)
            }
            TokenType::Slash => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Number(l / r)
            }
            TokenType::Star => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Number(l * r)
            }
            TokenType::Greater => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Boolean(l > r)
            }
            TokenType::GreaterEqual => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Boolean(l >= r)
            }
            TokenType::Less => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Boolean(l < r)
            }
            TokenType::LessEqual => {
                let (l, r) = number_operands(operator, left, right)?;
                Value::Boolean(l <= r)
            }
            _ => RuntimeError::new(operator, "Invalid binary operator.")?,
        };
        Ok(value)
    }

    fn lookup_variable(&self, name: &Token, id: usize) -> Result<Value, RuntimeError> {
        if let Some(&distance) = self.locals.get(&id) {
            trace!("lookup '{}' at distance {}", name.lexeme, distance);
            self.environment
                .borrow()
                .get_at(distance, name.lexeme.as_str())
                .ok_or_else(|| {
                    RuntimeError::new_err(
                        name,
                        &format!("Undefined variable '{}'.", name.lexeme),
                    )
                })
        } else {
            self.globals.borrow().get(name)
        }
    }
}

pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Boolean(false))
}

fn number_operands(
    operator: &Token,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), RuntimeError> {
    if let (Value::Number(l), Value::Number(r)) = (left, right) {
        Ok((*l, *r))
    } else {
        RuntimeError::new(operator, "Operands must be numbers.")
    }
}
