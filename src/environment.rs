use std::{cell::RefCell, rc::Rc};

use crate::{error::SlinkError, value::Value};


pub type Binding = (Rc<str>, Value);

struct Frame {
    // Most recent binding last; scanned back to front
    bindings: RefCell<Vec<Binding>>,
    parent: Option<Environment>,
}

/// A chain of scope frames, shared by reference down the call stack.
#[derive(Clone)]
pub struct Environment(Rc<Frame>);

impl Environment {
    pub fn new(parent: Option<&Environment>) -> Self {
        Self(Rc::new(Frame {
            bindings: RefCell::new(Vec::new()),
            parent: parent.cloned(),
        }))
    }

    pub fn root() -> Self {
        Self::new(None)
    }

    pub fn child(&self) -> Self {
        Self::new(Some(self))
    }

    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    /// The outermost frame of the chain
    pub fn global(&self) -> Environment {
        let mut frame = self;
        while let Some(parent) = frame.parent() {
            frame = parent;
        }
        frame.clone()
    }

    fn find(&self, name: &str) -> Option<Value> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            let bindings = current.0.bindings.borrow();
            if let Some((_, value)) = bindings.iter().rev().find(|(key, _)| &**key == name) {
                return Some(value.clone())
            }
            frame = current.parent();
        }
        None
    }

    pub fn lookup(&self, name: &str) -> Result<Value, SlinkError> {
        self.find(name)
            .ok_or_else(|| SlinkError::KeyNotFound(format!("could not find key '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Adds a permanent definition to this frame. The name must not resolve
    /// anywhere in the chain yet.
    pub fn declare(&self, name: &str, value: Value) -> Result<(), SlinkError> {
        if self.contains(name) {
            return Err(SlinkError::DuplicateDefinition(format!("'{}' is already defined", name)))
        }
        self.0.bindings.borrow_mut().push((name.into(), value));
        Ok(())
    }

    /// Adds a binding to this frame, shadowing any earlier one with the same name.
    pub fn bind(&self, name: &str, value: Value) {
        self.0.bindings.borrow_mut().push((name.into(), value));
    }

    /// Every frame of the chain, innermost first, with its bindings most recent first.
    pub fn snapshot(&self) -> Vec<Vec<Binding>> {
        let mut frames = vec![];
        let mut frame = Some(self);
        while let Some(current) = frame {
            frames.push(current.0.bindings.borrow().iter().rev().cloned().collect());
            frame = current.parent();
        }
        frames
    }
}
