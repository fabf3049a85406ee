use std::{cell::RefCell, path::Path, rc::Rc};

use crate::{
    builtin::builtin_frame,
    environment::Environment,
    error::SlinkError,
    host::{HostObject, HostRegistry},
    interpreter::{apply, evaluate, EvaluationResult},
    parser::parse_all,
    value::{List, Native, Value},
};

const BOOTSTRAP: &str = include_str!("bootstrap.lisp");


/// An evaluation context that owns the top-level environment and evaluates
/// source text in it.
///
/// Besides the native procedures, [EvaluationContext::new] runs the bootstrap
/// program that defines `defun`, `map` and `load` in the language itself.
pub struct EvaluationContext {
    environment: Environment,
    hosts: Rc<RefCell<HostRegistry>>,
}

impl EvaluationContext {
    pub fn new() -> Result<Self, SlinkError> {
        let mut context = Self::bare()?;
        context.evaluate_str(BOOTSTRAP)?;
        Ok(context)
    }

    /// Only the native procedures, without the bootstrap definitions
    pub fn bare() -> Result<Self, SlinkError> {
        let hosts = Rc::new(RefCell::new(HostRegistry::with_stock_types()));
        let environment = builtin_frame(hosts.clone())?;
        Ok(Self { environment, hosts })
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluate(&self, value: &Value) -> EvaluationResult {
        evaluate(value, &self.environment)
    }

    /// Evaluates every expression in `input` in order and returns the last
    /// value, or `nil` when there is none. Evaluation stops at the first error;
    /// definitions made before it are kept.
    pub fn evaluate_str(&mut self, input: &str) -> EvaluationResult {
        parse_all(input)?
            .iter()
            .try_fold(Value::NIL, |_, expression| self.evaluate(expression))
    }

    /// Runs a file through the language-level `load` procedure
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> EvaluationResult {
        let path = path.as_ref();
        let path = path.to_str()
            .ok_or_else(|| SlinkError::Io(format!("file name is not valid UTF-8: {}", path.display())))?;
        let load = self.environment.lookup("load")?;
        let arguments: List = [Value::string(path)].into_iter().collect();
        apply(&load, &arguments, &self.environment)
    }

    pub fn register_native(
        &self,
        name: &str,
        function: impl Fn(&List, &Environment) -> EvaluationResult + 'static,
    ) -> Result<(), SlinkError> {
        self.environment.declare(name, Value::Native(Native::new(name, function)))
    }

    pub fn register_host_type(
        &self,
        name: &str,
        constructor: impl Fn(&[Value]) -> Result<Rc<dyn HostObject>, SlinkError> + 'static,
    ) {
        self.hosts.borrow_mut().register(name, constructor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_defines_the_library() -> anyhow::Result<()> {
        let context = EvaluationContext::new()?;
        for name in ["defun", "map", "load"] {
            assert!(context.environment().contains(name), "{} is missing", name);
        }
        assert!(matches!(context.environment().lookup("defun")?, Value::Macro(_)));

        let bare = EvaluationContext::bare()?;
        assert!(!bare.environment().contains("defun"));
        Ok(())
    }

    #[test]
    fn defun_is_a_macro_over_let_and_lambda() -> anyhow::Result<()> {
        let mut context = EvaluationContext::new()?;
        assert_eq!(context.evaluate_str("(code defun)")?.to_string(), "((name args body) '(let name (lambda args body)))");
        context.evaluate_str("(defun add3 (a b c) (+ a b c))")?;
        assert_eq!(context.evaluate_str("(add3 1 2 3)")?, Value::Integer(6));
        assert_eq!(context.evaluate_str("(eq add3 (lambda '(x y z) '(+ a b c)))")?, Value::True);
        Ok(())
    }

    #[test]
    fn map_applies_to_each_element() -> anyhow::Result<()> {
        let mut context = EvaluationContext::new()?;
        context.evaluate_str("(defun inc (x) (+ x 1))")?;
        assert_eq!(context.evaluate_str("(map inc (list 1 2 3))")?.to_string(), "(2 3 4)");
        assert_eq!(context.evaluate_str("(map inc nil)")?, Value::NIL);
        assert_eq!(context.evaluate_str("(map car '((1 2) (3 4)))")?.to_string(), "(1 3)");
        Ok(())
    }

    #[test]
    fn evaluate_str_returns_the_last_value() -> anyhow::Result<()> {
        let mut context = EvaluationContext::new()?;
        assert_eq!(context.evaluate_str("1 2 (+ 1 2)")?, Value::Integer(3));
        assert_eq!(context.evaluate_str("")?, Value::NIL);
        Ok(())
    }

    #[test]
    fn errors_keep_earlier_definitions() -> anyhow::Result<()> {
        let mut context = EvaluationContext::new()?;
        assert!(context.evaluate_str("(let 'kept 1) (car nil) (let 'skipped 2)").is_err());
        assert_eq!(context.evaluate_str("kept")?, Value::Integer(1));
        assert!(!context.environment().contains("skipped"));
        Ok(())
    }

    #[test]
    fn load_file_runs_every_form() -> anyhow::Result<()> {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("prelude.slink");
        std::fs::write(&path, "(defun twice (x) (+ x x))\n(twice 21)\n")?;

        let mut context = EvaluationContext::new()?;
        let loaded = context.load_file(&path)?;
        let results: Vec<&Value> = loaded.as_list().map(|list| list.iter().collect()).unwrap_or_default();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Value::Procedure(_)));
        assert_eq!(*results[1], Value::Integer(42));
        assert_eq!(context.evaluate_str("(twice 4)")?, Value::Integer(8));
        assert_eq!(context.load_file(directory.path().join("nope.slink")).map_err(|e| e.kind()), Err("Io"));
        Ok(())
    }
}
