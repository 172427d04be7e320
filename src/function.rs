use crate::class::Instance;
use crate::environment::Environment;
use crate::expr::Stmt;
use crate::interpreter::{Interpreter, RuntimeError, Value};
use crate::scanner::Token;
use crate::types::Shared;
use std::fmt::Display;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Anything invocable with `()`: user functions, class constructors and
/// the native `clock`. The `Display` bound supplies stringification.
pub trait Callable: Display {
    fn arity(&self) -> usize;
    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError>;
    fn name(&self) -> String;
}

/// The single builtin: wall-clock seconds since the epoch, as a double.
pub struct Clock;

impl Callable for Clock {
    fn arity(&self) -> usize {
        0
    }

    fn call(&self, _: &mut Interpreter, _: &[Value]) -> Result<Value, RuntimeError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        Ok(Value::Number(now.as_secs_f64()))
    }

    fn name(&self) -> String {
        "clock".to_string()
    }
}

impl Display for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn clock>")
    }
}

pub struct LoxFunction {
    name: Token,
    params: Vec<Token>,
    body: Vec<Stmt>,
    closure: Shared<Environment>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        name: &Token,
        params: &[Token],
        body: &[Stmt],
        closure: Shared<Environment>,
        is_initializer: bool,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: name.clone(),
            params: params.to_vec(),
            body: body.to_vec(),
            closure,
            is_initializer,
        })
    }

    /// A copy of this function whose closure chain starts with a frame
    /// binding `this` to the instance. Method access goes through here.
    pub fn bind(&self, instance: Shared<Instance>) -> Rc<LoxFunction> {
        let environment = Environment::new(Some(self.closure.clone()));
        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));
        Rc::new(Self {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            closure: environment,
            is_initializer: self.is_initializer,
        })
    }

    fn this(&self) -> Value {
        self.closure
            .borrow()
            .get_at(0, "this")
            .unwrap_or(Value::Nil)
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
        let environment = Environment::new(Some(self.closure.clone()));
        {
            let mut frame = environment.borrow_mut();
            for (param, arg) in self.params.iter().zip(args) {
                frame.define(&param.lexeme, arg.clone());
            }
        }
        let signal = interpreter.execute_block(&self.body, environment)?;
        // An initializer always hands back its instance, even on an
        // early bare `return`.
        if self.is_initializer {
            return Ok(self.this());
        }
        Ok(signal.unwrap_or(Value::Nil))
    }

    fn name(&self) -> String {
        self.name.lexeme.to_string()
    }
}

impl Display for LoxFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}
