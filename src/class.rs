use crate::function::{Callable, LoxFunction};
use crate::interpreter::{Interpreter, RuntimeError, Value};
use crate::scanner::Token;
use crate::types::{create_shared, Shared};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub struct LoxClass {
    name: String,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(name: &str, methods: HashMap<String, Rc<LoxFunction>>) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            methods,
        })
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        self.methods.get(name).cloned()
    }
}

impl Display for LoxClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The callable face of a class: invoking it allocates an instance and
/// runs `init` on it when the class has one.
pub struct Constructor {
    class: Rc<LoxClass>,
}

impl Constructor {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self { class }
    }
}

impl Callable for Constructor {
    fn arity(&self) -> usize {
        self.class
            .find_method("init")
            .map(|init| init.arity())
            .unwrap_or(0)
    }

    fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> Result<Value, RuntimeError> {
        let instance = Instance::new(self.class.clone());
        if let Some(init) = self.class.find_method("init") {
            init.bind(instance.clone()).call(interpreter, args)?;
        }
        Ok(Value::Instance(instance))
    }

    fn name(&self) -> String {
        self.class.name.clone()
    }
}

impl Display for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.class)
    }
}

pub struct Instance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<LoxClass>) -> Shared<Self> {
        create_shared(Self {
            class,
            fields: HashMap::default(),
        })
    }

    /// Property lookup: fields shadow methods. A method comes back
    /// bound to `handle`, the shared pointer to this very instance.
    pub fn get(&self, name: &Token, handle: Shared<Instance>) -> Result<Value, RuntimeError> {
        if let Some(value) = self.fields.get(name.lexeme.as_str()) {
            return Ok(value.clone());
        }
        if let Some(method) = self.class.find_method(&name.lexeme) {
            return Ok(Value::Callable(method.bind(handle)));
        }
        RuntimeError::new(name, &format!("Undefined property '{}'.", name.lexeme))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.to_string(), value);
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class)
    }
}
