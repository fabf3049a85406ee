mod builtin;
mod context;
mod environment;
mod error;
mod host;
mod interpreter;
mod parser;
mod reader;
mod value;

#[cfg(test)]
mod test_utils;

pub use error::{SlinkError, ReadError, ReadErrorKind};
pub use context::EvaluationContext;
pub use environment::Environment;
pub use host::{HostObject, HostReturn, HostValue, HostRegistry, TextBuffer};
pub use interpreter::{apply, evaluate, EvaluationResult};
pub use parser::{parse, parse_all, parse_str};
pub use reader::{Reader, Token};
pub use value::{List, Macro, Native, Procedure, Value};
