use core::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::{environment::Environment, host::HostValue, interpreter::EvaluationResult};


pub type NativeFn = dyn Fn(&List, &Environment) -> EvaluationResult;

/// A proper list: either empty (`nil`) or a pair whose tail is again a list.
#[derive(Clone, Default)]
pub struct List(pub(crate) Option<Rc<Pair>>);

pub struct Pair {
    pub head: Value,
    pub tail: List,
}

impl List {
    pub const fn nil() -> Self {
        Self(None)
    }

    pub fn cons(head: Value, tail: List) -> Self {
        Self(Some(Rc::new(Pair { head, tail })))
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.as_ref().map(|pair| &pair.head)
    }

    pub fn rest(&self) -> Option<&List> {
        self.0.as_ref().map(|pair| &pair.tail)
    }

    pub fn iter(&self) -> ListIter<'_> {
        ListIter(self)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.is_nil()
    }

    pub fn reversed(&self) -> Self {
        self.iter().fold(Self::nil(), |tail, value| Self::cons(value.clone(), tail))
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let mut values = iter.into_iter().collect_vec();
        let mut list = Self::nil();
        while let Some(value) = values.pop() {
            list = Self::cons(value, list);
        }
        list
    }
}

// Unlink the spine iteratively so dropping a long list does not recurse once per element
impl Drop for List {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(pair) = next {
            match Rc::try_unwrap(pair) {
                Ok(mut pair) => next = pair.tail.0.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct ListIter<'a>(&'a List);

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        let list: &'a List = self.0;
        let pair = list.0.as_ref()?;
        self.0 = &pair.tail;
        Some(&pair.head)
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            match (&a.0, &b.0) {
                (None, None) => return true,
                (Some(x), Some(y)) => {
                    if Rc::ptr_eq(x, y) { return true; }
                    if x.head != y.head { return false; }
                    a = &x.tail;
                    b = &y.tail;
                }
                _ => return false,
            }
        }
    }
}

#[derive(Clone)]
pub struct Native {
    pub(crate) name: Rc<str>,
    pub(crate) function: Rc<NativeFn>,
}

impl Native {
    pub fn new(name: &str, function: impl Fn(&List, &Environment) -> EvaluationResult + 'static) -> Self {
        Self { name: name.into(), function: Rc::new(function) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A user-defined function: parameter symbols plus a sequence of body forms
pub struct Procedure {
    pub(crate) parameters: List,
    pub(crate) body: List,
}

/// A user-defined macro: parameter symbols plus a single body form
pub struct Macro {
    pub(crate) parameters: List,
    pub(crate) body: Value,
}

#[derive(Clone)]
pub enum Value {
    /// `nil` when empty, a cons cell otherwise
    List(List),
    True,
    Integer(i64),
    Symbol(Rc<str>),
    String(Rc<str>),
    Quoted(Rc<Value>),
    Native(Native),
    Procedure(Rc<Procedure>),
    Macro(Rc<Macro>),
    Host(HostValue),
}

impl Value {
    pub const NIL: Value = Value::List(List::nil());

    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.into())
    }

    pub fn string(text: &str) -> Self {
        Self::String(text.into())
    }

    pub fn quoted(value: Value) -> Self {
        Self::Quoted(Rc::new(value))
    }

    pub fn boolean(value: bool) -> Self {
        if value { Self::True } else { Self::NIL }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::List(list) if list.is_nil())
    }

    /// Everything except `nil` counts as true
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::List(list) if list.is_nil() => "nil",
            Self::List(_) => "pair",
            Self::True => "t",
            Self::Integer(_) => "integer",
            Self::Symbol(_) => "symbol",
            Self::String(_) => "string",
            Self::Quoted(_) => "quoted",
            Self::Native(_) => "native procedure",
            Self::Procedure(_) => "procedure",
            Self::Macro(_) => "macro",
            Self::Host(_) => "host object",
        }
    }
}

impl From<List> for Value {
    fn from(list: List) -> Self {
        Self::List(list)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => a == b,
            (Self::True, Self::True) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Quoted(a), Self::Quoted(b)) => a == b,
            (Self::Native(a), Self::Native(b)) => std::ptr::addr_eq(Rc::as_ptr(&a.function), Rc::as_ptr(&b.function)),
            // Parameter names do not take part in procedure identity
            (Self::Procedure(a), Self::Procedure(b)) => a.body == b.body,
            (Self::Macro(a), Self::Macro(b)) => a.body == b.body,
            (Self::Host(a), Self::Host(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_nil() {
            return write!(f, "nil")
        }
        write!(f, "({})", self.iter().join(" "))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(list) => fmt::Display::fmt(list, f),
            Self::True => write!(f, "t"),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Symbol(name) => write!(f, "{}", name),
            Self::String(text) => write!(f, "\"{}\"", text),
            Self::Quoted(inner) => write!(f, "'{}", inner),
            Self::Native(native) => write!(f, "#<native {}>", native.name),
            Self::Procedure(procedure) => write!(f, "#<procedure@{:p}>", Rc::as_ptr(procedure)),
            Self::Macro(macro_) => write!(f, "#<macro@{:p}>", Rc::as_ptr(macro_)),
            Self::Host(host) => fmt::Display::fmt(host, f),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        values.iter().copied().map(Value::Integer).collect()
    }

    #[test]
    fn lists_compare_structurally() {
        assert_eq!(ints(&[1, 2, 3]), ints(&[1, 2, 3]));
        assert_ne!(ints(&[1, 2, 3]), ints(&[1, 2]));
        assert_ne!(ints(&[1, 2]), ints(&[1, 2, 3]));
        assert_eq!(Value::NIL, Value::List(List::nil()));
        assert_ne!(Value::NIL, Value::True);

        let nested: Value = [ints(&[1]), Value::string("a")].into_iter().collect();
        let same: Value = [ints(&[1]), Value::string("a")].into_iter().collect();
        assert_eq!(nested, same);
    }

    #[test]
    fn procedures_compare_by_body_only() {
        let body: List = [Value::symbol("x")].into_iter().collect();
        let a = Value::Procedure(Rc::new(Procedure { parameters: [Value::symbol("x")].into_iter().collect(), body: body.clone() }));
        let b = Value::Procedure(Rc::new(Procedure { parameters: [Value::symbol("y")].into_iter().collect(), body: body.clone() }));
        let m = Value::Macro(Rc::new(Macro { parameters: List::nil(), body: Value::List(body) }));
        assert_eq!(a, b);
        assert_ne!(a, m);
    }

    #[test]
    fn macros_compare_by_body_only() {
        let body = Value::quoted([Value::symbol("list"), Value::symbol("q")].into_iter().collect());
        let a = Value::Macro(Rc::new(Macro { parameters: [Value::symbol("a")].into_iter().collect(), body: body.clone() }));
        let b = Value::Macro(Rc::new(Macro { parameters: [Value::symbol("b")].into_iter().collect(), body }));
        let c = Value::Macro(Rc::new(Macro { parameters: [Value::symbol("a")].into_iter().collect(), body: Value::symbol("a") }));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn natives_compare_by_identity() {
        let a = Value::Native(Native::new("a", |_, _| Ok(Value::NIL)));
        let b = Value::Native(Native::new("a", |_, _| Ok(Value::NIL)));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn renders_canonically() {
        let value: Value = [
            Value::symbol("+"),
            Value::Integer(-3),
            Value::string("a b"),
            Value::quoted(ints(&[1, 2])),
            Value::NIL,
            Value::True,
        ].into_iter().collect();
        assert_eq!(value.to_string(), "(+ -3 \"a b\" '(1 2) nil t)");
        assert_eq!(Value::NIL.to_string(), "nil");
    }

    #[test]
    fn long_lists_drop_without_recursion() {
        let list: List = (0..200_000).map(Value::Integer).collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }

    #[test]
    fn reverses() {
        let list: List = (1..=3).map(Value::Integer).collect();
        assert_eq!(Value::List(list.reversed()), ints(&[3, 2, 1]));
    }
}
