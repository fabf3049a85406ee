#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Natives, bootstrap definitions and plain atoms. Side-effecting natives
// (print, read, save, exit) are left out.
#[derive(Arbitrary, Debug)]
enum SlinkAtom {
    Add, List, Car, Cdr,
    Listp, Eq, Code, Eval,
    Env, Reverse, Map,
    True, Nil,

    Identifier(String),
    Number(i64),
    Text(String),
}

impl fmt::Display for SlinkAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            SlinkAtom::Add => "+",
            SlinkAtom::List => "list",
            SlinkAtom::Car => "car",
            SlinkAtom::Cdr => "cdr",
            SlinkAtom::Listp => "listp",
            SlinkAtom::Eq => "eq",
            SlinkAtom::Code => "code",
            SlinkAtom::Eval => "eval",
            SlinkAtom::Env => "env",
            SlinkAtom::Reverse => "reverse",
            SlinkAtom::Map => "map",
            SlinkAtom::True => "t",
            SlinkAtom::Nil => "nil",
            SlinkAtom::Identifier(identifier) => identifier,
            SlinkAtom::Number(value) => return write!(f, "{}", value),
            SlinkAtom::Text(text) => return write!(f, "\"{}\"", text.replace('"', "")),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum SlinkCommand {
    Lambda(Vec<SlinkCommand>),
    Let(Vec<SlinkCommand>),
    Defun(Vec<SlinkCommand>),
    Defmacro(Vec<SlinkCommand>),
    If(Vec<SlinkCommand>),
    Cons(Vec<SlinkCommand>),
    Apply(Vec<SlinkCommand>),
    Quote(Box<SlinkCommand>),

    Atom(SlinkAtom),
}

fn stringify_arguments(values: &[SlinkCommand]) -> String {
    values.iter()
        .map(SlinkCommand::to_string)
        .join(" ")
}

impl fmt::Display for SlinkCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (head, arguments) = match self {
            SlinkCommand::Atom(atom) => return atom.fmt(f),
            SlinkCommand::Quote(inner) => return write!(f, "'{}", inner),
            SlinkCommand::Apply(arguments) => return write!(f, "({})", stringify_arguments(arguments)),
            SlinkCommand::Lambda(arguments) => ("lambda", arguments),
            SlinkCommand::Let(arguments) => ("let", arguments),
            SlinkCommand::Defun(arguments) => ("defun", arguments),
            SlinkCommand::Defmacro(arguments) => ("defmacro", arguments),
            SlinkCommand::If(arguments) => ("if", arguments),
            SlinkCommand::Cons(arguments) => ("cons", arguments),
        };

        write!(f, "({} {})", head, stringify_arguments(arguments))
    }
}

fuzz_target!(|commands: Vec<SlinkCommand>| {
    let Ok(mut context) = slink::EvaluationContext::new() else { return };

    for command in commands {
        let _ = context.evaluate_str(&command.to_string());
    }
});
