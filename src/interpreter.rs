use std::rc::Rc;

use crate::{
    environment::Environment,
    error::SlinkError,
    value::{List, Macro, Procedure, Value},
};

pub type EvaluationResult = Result<Value, SlinkError>;


fn parameter_name(parameter: &Value) -> Result<&str, SlinkError> {
    match parameter {
        Value::Symbol(name) => Ok(&**name),
        other => Err(SlinkError::TypeMismatch(format!("parameter must be a symbol, got {}", other))),
    }
}

/// Checks that a parameter list only holds symbols
pub(crate) fn check_parameters(parameters: &Value) -> Result<List, SlinkError> {
    let list = parameters.as_list()
        .ok_or_else(|| SlinkError::TypeMismatch(format!("parameter list must be a list, got {}", parameters)))?;
    for parameter in list.iter() {
        parameter_name(parameter)?;
    }
    Ok(list.clone())
}

// Walks parameters and arguments in lockstep, binding each parameter in `frame`.
// Bindings made before an arity mismatch is noticed stay in place.
fn bind_arguments(
    parameters: &List,
    arguments: &List,
    frame: &Environment,
    mut argument_value: impl FnMut(&Value) -> EvaluationResult,
) -> Result<(), SlinkError> {
    let (mut parameters, mut arguments) = (parameters.iter(), arguments.iter());
    loop {
        match (parameters.next(), arguments.next()) {
            (Some(parameter), Some(argument)) => frame.bind(parameter_name(parameter)?, argument_value(argument)?),
            (None, None) => return Ok(()),
            _ => return Err(SlinkError::ArityMismatch("wrong number of arguments".to_owned())),
        }
    }
}

impl Procedure {
    pub(crate) fn new(parameters: List, body: List) -> Self {
        Self { parameters, body }
    }

    pub fn parameters(&self) -> &List {
        &self.parameters
    }

    pub fn body(&self) -> &List {
        &self.body
    }

    fn call(&self, arguments: &List, environment: &Environment) -> EvaluationResult {
        // The new frame hangs off the caller's environment, not the one the procedure was created in
        let frame = environment.child();
        bind_arguments(&self.parameters, arguments, &frame, |argument| evaluate(argument, environment))?;

        let mut result = Value::NIL;
        for expression in self.body.iter() {
            result = evaluate(expression, &frame)?;
        }
        Ok(result)
    }
}

impl Macro {
    pub(crate) fn new(parameters: List, body: Value) -> Self {
        Self { parameters, body }
    }

    pub fn parameters(&self) -> &List {
        &self.parameters
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Binds the raw argument forms and evaluates the body once to get the expansion
    pub fn expand(&self, arguments: &List, environment: &Environment) -> Result<(Value, Environment), SlinkError> {
        let frame = environment.child();
        bind_arguments(&self.parameters, arguments, &frame, |argument| Ok(argument.clone()))?;
        let expansion = evaluate(&self.body, &frame)?;
        Ok((expansion, frame))
    }

    fn call(&self, arguments: &List, environment: &Environment) -> EvaluationResult {
        let (expansion, frame) = self.expand(arguments, environment)?;
        evaluate(&expansion, &frame)
    }
}

/// Applies a callable value to an unevaluated argument list. Each kind of
/// callee decides for itself which arguments get evaluated.
pub fn apply(callee: &Value, arguments: &List, environment: &Environment) -> EvaluationResult {
    match callee {
        Value::Native(native) => (native.function)(arguments, environment),
        Value::Procedure(procedure) => procedure.call(arguments, environment),
        Value::Macro(macro_) => macro_.call(arguments, environment),
        Value::Host(host) => host.call(arguments, environment),
        Value::List(_)
        | Value::True
        | Value::Integer(_)
        | Value::Symbol(_)
        | Value::String(_)
        | Value::Quoted(_) => Err(SlinkError::NotCallable(format!("'{}' does not evaluate to a function", callee))),
    }
}

pub fn evaluate(value: &Value, environment: &Environment) -> EvaluationResult {
    match value {
        Value::Symbol(name) => environment.lookup(name),
        Value::Quoted(inner) => Ok(Value::clone(inner)),
        Value::List(list) => match (list.first(), list.rest()) {
            (Some(head), Some(arguments)) => {
                let callee = evaluate(head, environment)?;
                apply(&callee, arguments, environment)
            },
            _ => Ok(Value::NIL),
        },
        Value::True
        | Value::Integer(_)
        | Value::String(_)
        | Value::Native(_)
        | Value::Procedure(_)
        | Value::Macro(_)
        | Value::Host(_) => Ok(value.clone()),
    }
}

pub(crate) fn procedure(parameters: List, body: List) -> Value {
    Value::Procedure(Rc::new(Procedure::new(parameters, body)))
}

pub(crate) fn macro_value(parameters: List, body: Value) -> Value {
    Value::Macro(Rc::new(Macro::new(parameters, body)))
}
