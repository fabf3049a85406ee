use core::fmt;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    environment::Environment,
    error::SlinkError,
    interpreter::{evaluate, EvaluationResult},
    value::{List, Value},
};


/// An object owned by the embedding program, reachable from lisp code through
/// name-and-arity method dispatch.
pub trait HostObject {
    fn type_name(&self) -> &str;

    fn invoke(&self, method: &str, arguments: &[Value]) -> Result<HostReturn, SlinkError>;
}

/// What a host method hands back; lifted into a [Value] by the bridge
pub enum HostReturn {
    Unit,
    Integer(i64),
    Text(String),
    Object(Rc<dyn HostObject>),
}

impl From<HostReturn> for Value {
    fn from(value: HostReturn) -> Self {
        match value {
            HostReturn::Unit => Value::NIL,
            HostReturn::Integer(value) => Value::Integer(value),
            HostReturn::Text(text) => Value::string(&text),
            HostReturn::Object(object) => Value::Host(HostValue(object)),
        }
    }
}

#[derive(Clone)]
pub struct HostValue(pub(crate) Rc<dyn HostObject>);

impl HostValue {
    pub fn new(object: impl HostObject + 'static) -> Self {
        Self(Rc::new(object))
    }

    pub fn object(&self) -> &dyn HostObject {
        &*self.0
    }

    /// `(object method arguments...)`: the method name is a symbol or string,
    /// every argument is evaluated in the caller's environment
    pub(crate) fn call(&self, arguments: &List, environment: &Environment) -> EvaluationResult {
        let mut arguments = arguments.iter();
        let method = match arguments.next() {
            Some(method) => evaluate(method, environment)?,
            None => return Err(SlinkError::arity(self.0.type_name(), "at least 1", 0)),
        };
        let method = match &method {
            Value::Symbol(name) | Value::String(name) => name.clone(),
            other => return Err(SlinkError::TypeMismatch(format!("method name must be a symbol or string, got {}", other))),
        };
        let arguments = arguments
            .map(|argument| evaluate(argument, environment))
            .collect::<Result<Vec<_>, _>>()?;

        self.0.invoke(&method, &arguments).map(Value::from)
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#<{}@{:p}>", self.0.type_name(), Rc::as_ptr(&self.0) as *const ())
    }
}

pub type HostConstructor = dyn Fn(&[Value]) -> Result<Rc<dyn HostObject>, SlinkError>;

/// Host types that `new` can instantiate, by name
#[derive(Default)]
pub struct HostRegistry {
    constructors: HashMap<String, Box<HostConstructor>>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock_types() -> Self {
        let mut registry = Self::new();
        registry.register("buffer", |arguments| TextBuffer::construct(arguments).map(|buffer| Rc::new(buffer) as Rc<dyn HostObject>));
        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        constructor: impl Fn(&[Value]) -> Result<Rc<dyn HostObject>, SlinkError> + 'static,
    ) {
        self.constructors.insert(name.to_owned(), Box::new(constructor));
    }

    pub fn construct(&self, name: &str, arguments: &[Value]) -> Result<HostValue, SlinkError> {
        let constructor = self.constructors.get(name)
            .ok_or_else(|| SlinkError::KeyNotFound(format!("no host type named '{}'", name)))?;
        constructor(arguments).map(HostValue)
    }
}

/// `(new type arguments...)`
pub(crate) fn builtin_new(registry: &RefCell<HostRegistry>, arguments: &List, environment: &Environment) -> EvaluationResult {
    let arguments = arguments.iter()
        .map(|argument| evaluate(argument, environment))
        .collect::<Result<Vec<_>, _>>()?;
    let (name, rest) = arguments.split_first()
        .ok_or_else(|| SlinkError::arity("new", "at least 1", 0))?;
    let name = match name {
        Value::Symbol(name) | Value::String(name) => name,
        other => return Err(SlinkError::TypeMismatch(format!("host type name must be a symbol or string, got {}", other))),
    };

    registry.borrow().construct(name, rest).map(Value::Host)
}

fn no_such_method(type_name: &str, method: &str, arity: usize) -> SlinkError {
    SlinkError::KeyNotFound(format!("{} has no method {}/{}", type_name, method, arity))
}

/// A growable piece of text
pub struct TextBuffer {
    text: RefCell<String>,
}

impl TextBuffer {
    fn construct(arguments: &[Value]) -> Result<Self, SlinkError> {
        let buffer = Self { text: RefCell::new(String::new()) };
        for argument in arguments {
            buffer.append(argument);
        }
        Ok(buffer)
    }

    fn append(&self, value: &Value) {
        match value {
            Value::String(text) => self.text.borrow_mut().push_str(text),
            other => self.text.borrow_mut().push_str(&other.to_string()),
        }
    }
}

impl HostObject for TextBuffer {
    fn type_name(&self) -> &str {
        "buffer"
    }

    fn invoke(&self, method: &str, arguments: &[Value]) -> Result<HostReturn, SlinkError> {
        match (method, arguments) {
            ("append", [value]) => {
                self.append(value);
                Ok(HostReturn::Unit)
            },
            ("text", []) => Ok(HostReturn::Text(self.text.borrow().clone())),
            ("length", []) => Ok(HostReturn::Integer(self.text.borrow().chars().count() as i64)),
            ("clear", []) => {
                self.text.borrow_mut().clear();
                Ok(HostReturn::Unit)
            },
            ("fork", []) => Ok(HostReturn::Object(Rc::new(Self { text: RefCell::new(self.text.borrow().clone()) }))),
            (method, arguments) => Err(no_such_method(self.type_name(), method, arguments.len())),
        }
    }
}
