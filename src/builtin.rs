use std::{cell::RefCell, fs, path::Path, rc::Rc};

use itertools::Itertools;

use crate::{
    environment::Environment,
    error::SlinkError,
    host::{builtin_new, HostRegistry},
    interpreter::{check_parameters, evaluate, macro_value, procedure, EvaluationResult},
    parser::parse_all,
    value::{List, Native, Value},
};


type Builtin = fn(&List, &Environment) -> EvaluationResult;

fn argument<'l>(name: &str, arguments: &'l List) -> Result<&'l Value, SlinkError> {
    arguments.iter().collect_tuple()
        .map(|(value,)| value)
        .ok_or_else(|| SlinkError::arity(name, "1", arguments.len()))
}

fn argument_pair<'l>(name: &str, arguments: &'l List) -> Result<(&'l Value, &'l Value), SlinkError> {
    arguments.iter().collect_tuple()
        .ok_or_else(|| SlinkError::arity(name, "2", arguments.len()))
}

fn evaluate_list(arguments: &List, environment: &Environment) -> Result<Vec<Value>, SlinkError> {
    arguments.iter()
        .map(|argument| evaluate(argument, environment))
        .collect()
}

fn expect_list(name: &str, value: Value) -> Result<List, SlinkError> {
    match value {
        Value::List(list) => Ok(list),
        other => Err(SlinkError::TypeMismatch(format!("{} expects a list, got {} {}", name, other.type_name(), other))),
    }
}

fn expect_path(name: &str, value: &Value) -> Result<Rc<str>, SlinkError> {
    match value {
        Value::String(path) => Ok(path.clone()),
        other => Err(SlinkError::TypeMismatch(format!("{} expects a file name string, got {}", name, other))),
    }
}

fn builtin_add(arguments: &List, environment: &Environment) -> EvaluationResult {
    // Fixed-width arithmetic: overflow wraps around
    arguments.iter().try_fold(Value::Integer(0), |sum, argument| {
        match (sum, evaluate(argument, environment)?) {
            (Value::Integer(sum), Value::Integer(value)) => Ok(Value::Integer(sum.wrapping_add(value))),
            (_, other) => Err(SlinkError::TypeMismatch(format!("+ expects integers, got {} {}", other.type_name(), other))),
        }
    })
}

fn builtin_list(arguments: &List, environment: &Environment) -> EvaluationResult {
    Ok(evaluate_list(arguments, environment)?.into_iter().collect())
}

fn builtin_cons(arguments: &List, environment: &Environment) -> EvaluationResult {
    let (head, tail) = argument_pair("cons", arguments)?;
    let head = evaluate(head, environment)?;
    let tail = expect_list("cons", evaluate(tail, environment)?)?;
    Ok(Value::List(List::cons(head, tail)))
}

fn builtin_quote(arguments: &List, _environment: &Environment) -> EvaluationResult {
    argument("quote", arguments).cloned()
}

fn builtin_car(arguments: &List, environment: &Environment) -> EvaluationResult {
    let list = expect_list("car", evaluate(argument("car", arguments)?, environment)?)?;
    list.first()
        .cloned()
        .ok_or_else(|| SlinkError::TypeMismatch("car expects a pair, got nil".to_owned()))
}

fn builtin_cdr(arguments: &List, environment: &Environment) -> EvaluationResult {
    let list = expect_list("cdr", evaluate(argument("cdr", arguments)?, environment)?)?;
    list.rest()
        .map(|tail| Value::List(tail.clone()))
        .ok_or_else(|| SlinkError::TypeMismatch("cdr expects a pair, got nil".to_owned()))
}

fn builtin_if(arguments: &List, environment: &Environment) -> EvaluationResult {
    // Only the chosen branch is evaluated; a missing else-branch yields nil
    let (condition, then, otherwise) = match arguments.iter().collect_vec().as_slice() {
        [condition, then] => (*condition, *then, None),
        [condition, then, otherwise] => (*condition, *then, Some(*otherwise)),
        _ => return Err(SlinkError::arity("if", "2 or 3", arguments.len())),
    };

    if evaluate(condition, environment)?.is_truthy() {
        evaluate(then, environment)
    } else {
        otherwise.map_or(Ok(Value::NIL), |otherwise| evaluate(otherwise, environment))
    }
}

fn builtin_listp(arguments: &List, environment: &Environment) -> EvaluationResult {
    let value = evaluate(argument("listp", arguments)?, environment)?;
    Ok(Value::boolean(matches!(value, Value::List(_))))
}

fn builtin_lambda(arguments: &List, environment: &Environment) -> EvaluationResult {
    // Every form is evaluated once here, so quoted bodies are stored as code
    let mut values = evaluate_list(arguments, environment)?.into_iter();
    let parameters = values.next()
        .ok_or_else(|| SlinkError::arity("lambda", "at least 1", 0))?;
    Ok(procedure(check_parameters(&parameters)?, values.collect()))
}

fn builtin_let(arguments: &List, environment: &Environment) -> EvaluationResult {
    let (name, value) = argument_pair("let", arguments)?;
    let name = match evaluate(name, environment)? {
        Value::Symbol(name) => name,
        other => return Err(SlinkError::TypeMismatch(format!("let expects a symbol name, got {}", other))),
    };
    let value = evaluate(value, environment)?;
    environment.global().declare(&name, value.clone())?;
    Ok(value)
}

fn builtin_defmacro(arguments: &List, environment: &Environment) -> EvaluationResult {
    let (name, parameters, body) = arguments.iter().collect_tuple()
        .ok_or_else(|| SlinkError::arity("defmacro", "3", arguments.len()))?;
    let name = match name {
        Value::Symbol(name) => name,
        other => return Err(SlinkError::TypeMismatch(format!("defmacro expects a symbol name, got {}", other))),
    };
    let value = macro_value(check_parameters(parameters)?, body.clone());
    environment.global().declare(name, value.clone())?;
    Ok(value)
}

fn builtin_eq(arguments: &List, environment: &Environment) -> EvaluationResult {
    let (a, b) = argument_pair("eq", arguments)?;
    let a = evaluate(a, environment)?;
    let b = evaluate(b, environment)?;
    Ok(Value::boolean(a == b))
}

fn builtin_code(arguments: &List, environment: &Environment) -> EvaluationResult {
    match evaluate(argument("code", arguments)?, environment)? {
        Value::Procedure(procedure) => Ok([
            Value::List(procedure.parameters().clone()),
            Value::List(procedure.body().clone()),
        ].into_iter().collect()),
        Value::Macro(macro_) => Ok([
            Value::List(macro_.parameters().clone()),
            macro_.body().clone(),
        ].into_iter().collect()),
        other => Err(SlinkError::TypeMismatch(format!("code expects a procedure or macro, got {}", other))),
    }
}

fn builtin_eval(arguments: &List, environment: &Environment) -> EvaluationResult {
    let value = evaluate(argument("eval", arguments)?, environment)?;
    evaluate(&value, environment)
}

fn builtin_env(arguments: &List, environment: &Environment) -> EvaluationResult {
    if !arguments.is_nil() {
        return Err(SlinkError::arity("env", "0", arguments.len()))
    }

    Ok(environment.snapshot().into_iter()
        .map(|frame| frame.into_iter()
            .map(|(name, value)| [Value::Symbol(name), value].into_iter().collect::<Value>())
            .collect::<Value>())
        .collect())
}

fn builtin_reverse(arguments: &List, environment: &Environment) -> EvaluationResult {
    let list = expect_list("reverse", evaluate(argument("reverse", arguments)?, environment)?)?;
    Ok(Value::List(list.reversed()))
}

fn builtin_print(arguments: &List, environment: &Environment) -> EvaluationResult {
    match evaluate(argument("print", arguments)?, environment)? {
        Value::String(text) => println!("{}", text),
        other => println!("{}", other),
    }
    Ok(Value::NIL)
}

/// Every expression in the file at `path`, in order
pub(crate) fn read_forms(path: impl AsRef<Path>) -> Result<Vec<Value>, SlinkError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|error| SlinkError::Io(format!("could not read '{}': {}", path.display(), error)))?;
    parse_all(&source)
}

fn builtin_read(arguments: &List, environment: &Environment) -> EvaluationResult {
    let path = expect_path("read", &evaluate(argument("read", arguments)?, environment)?)?;
    Ok(read_forms(&*path)?.into_iter().collect())
}

fn builtin_save(arguments: &List, environment: &Environment) -> EvaluationResult {
    let (path, forms) = argument_pair("save", arguments)?;
    let path = expect_path("save", &evaluate(path, environment)?)?;
    let forms = expect_list("save", evaluate(forms, environment)?)?;

    let text: String = forms.iter().map(|form| format!("{}\n", form)).collect();
    fs::write(&*path, text)
        .map_err(|error| SlinkError::Io(format!("could not write '{}': {}", path, error)))?;
    Ok(Value::List(forms))
}

fn exit_status(arguments: &[Value]) -> Result<i32, SlinkError> {
    match arguments {
        [] => Ok(0),
        [Value::Integer(code)] => i32::try_from(*code)
            .map_err(|_| SlinkError::TypeMismatch(format!("exit status {} is out of range", code))),
        [other] => Err(SlinkError::TypeMismatch(format!("exit expects an integer status, got {}", other))),
        _ => Err(SlinkError::arity("exit", "0 or 1", arguments.len())),
    }
}

fn builtin_exit(arguments: &List, environment: &Environment) -> EvaluationResult {
    let code = exit_status(&evaluate_list(arguments, environment)?)?;
    std::process::exit(code)
}

/// The root frame with every native procedure declared in it
pub(crate) fn builtin_frame(hosts: Rc<RefCell<HostRegistry>>) -> Result<Environment, SlinkError> {
    let builtins: [(&str, Builtin); 20] = [
        ("+", builtin_add),
        ("list", builtin_list),
        ("cons", builtin_cons),
        ("quote", builtin_quote),
        ("car", builtin_car),
        ("cdr", builtin_cdr),
        ("if", builtin_if),
        ("listp", builtin_listp),
        ("lambda", builtin_lambda),
        ("let", builtin_let),
        ("defmacro", builtin_defmacro),
        ("eq", builtin_eq),
        ("code", builtin_code),
        ("eval", builtin_eval),
        ("env", builtin_env),
        ("reverse", builtin_reverse),
        ("print", builtin_print),
        ("read", builtin_read),
        ("save", builtin_save),
        ("exit", builtin_exit),
    ];

    let frame = Environment::root();
    for (name, function) in builtins {
        frame.declare(name, Value::Native(Native::new(name, function)))?;
    }
    frame.declare("new", Value::Native(Native::new("new", move |arguments, environment| {
        builtin_new(&hosts, arguments, environment)
    })))?;

    Ok(frame)
}
