use crate::expr::{Expr, Stmt};
use crate::interpreter::Interpreter;
use crate::reporter::Reporter;
use crate::scanner::Token;
use log::trace;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy)]
enum ClassType {
    Class,
}

/// Static pass between parsing and execution. Walks every declaration,
/// maps each local variable reference to a scope distance (recorded on
/// the interpreter), and reports the semantic errors that do not need
/// runtime state. Errors never stop the walk.
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    reporter: &'a mut Reporter,
    // false = declared but not yet usable. Globals are not on the stack.
    scopes: Vec<HashMap<String, bool>>,
    current_function: Option<FunctionType>,
    current_class: Option<ClassType>,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter, reporter: &'a mut Reporter) -> Self {
        Self {
            interpreter,
            reporter,
            scopes: vec![],
            current_function: None,
            current_class: None,
        }
    }

    pub fn resolve(&mut self, statements: &[Option<Stmt>]) {
        for statement in statements.iter().flatten() {
            self.resolve_statement(statement);
        }
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_statement(statement);
        }
    }

    fn resolve_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Block { statements } => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Function { name, params, body } => {
                self.declare(name);
                self.define(name);
                self.resolve_function(params, body, FunctionType::Function);
            }
            Stmt::Class { name, methods } => {
                self.declare(name);
                self.define(name);
                let enclosing = self.current_class.replace(ClassType::Class);
                self.begin_scope();
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert("this".to_string(), true);
                }
                for method in methods {
                    if let Stmt::Function {
                        name: method_name,
                        params,
                        body,
                    } = method
                    {
                        let function_type = if method_name.lexeme.as_str() == "init" {
                            FunctionType::Initializer
                        } else {
                            FunctionType::Method
                        };
                        self.resolve_function(params, body, function_type);
                    }
                }
                self.end_scope();
                self.current_class = enclosing;
            }
            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }
            Stmt::Return { keyword, value } => {
                if self.current_function.is_none() {
                    self.reporter
                        .token_error(keyword, "Cannot return from top-level code.");
                }
                if let Some(expr) = value {
                    if self.current_function == Some(FunctionType::Initializer) {
                        self.reporter
                            .token_error(keyword, "Cannot return a value from an initializer.");
                    }
                    self.resolve_expr(expr);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_statement(body);
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable { name, id } => {
                if self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(name.lexeme.as_str()))
                    .is_some_and(|defined| !defined)
                {
                    self.reporter.token_error(
                        name,
                        "Cannot read local variable in its own initializer.",
                    );
                }
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Assign { name, value, id } => {
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::This { keyword, id } => {
                if self.current_class.is_none() {
                    self.reporter
                        .token_error(keyword, "Cannot use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, &keyword.lexeme);
            }
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => {
                // Properties are looked up dynamically; only the object
                // expression resolves statically.
                self.resolve_expr(object);
            }
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::Grouping(inner) => {
                self.resolve_expr(inner);
            }
            Expr::Unary { right, .. } => {
                self.resolve_expr(right);
            }
            Expr::Literal(_) => {}
        }
    }

    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], function_type: FunctionType) {
        let enclosing = self.current_function.replace(function_type);
        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_statements(body);
        self.end_scope();
        self.current_function = enclosing;
    }

    fn resolve_local(&mut self, id: usize, name: &str) {
        for i in (0..self.scopes.len()).rev() {
            if self.scopes[i].contains_key(name) {
                let distance = self.scopes.len() - 1 - i;
                trace!("resolved '{}' at distance {}", name, distance);
                self.interpreter.resolve(id, distance);
                return;
            }
        }
        // Not found in any scope: assumed global.
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name.lexeme.as_str()) {
                self.reporter.token_error(
                    name,
                    "Variable with this name already declared in this scope.",
                );
            }
            scope.insert(name.lexeme.to_string(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.to_string(), true);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }
}
