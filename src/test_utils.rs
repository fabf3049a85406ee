use std::{io::BufRead, path::{Path, PathBuf}};

use anyhow::bail;
use itertools::Itertools;
use serde::{de::{Visitor, Error}, Deserialize};

/// What a fixture line should evaluate to, compared by printed form
#[derive(Debug, PartialEq, Eq)]
pub enum TestOutput {
    /// `"_"`: any value is accepted, as long as evaluation succeeds
    Anything,
    Rendered(String),
}

impl From<String> for TestOutput {
    fn from(value: String) -> Self {
        if value == "_" { TestOutput::Anything } else { TestOutput::Rendered(value) }
    }
}

/// Either the expected output, or the kind of the expected error
pub struct ExpectedResult(Result<TestOutput, String>);

struct ExpectedResultVisitor {}

impl<'de> Deserialize<'de> for ExpectedResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de> {

        deserializer.deserialize_map(ExpectedResultVisitor {})
    }
}

impl<'de> Visitor<'de> for ExpectedResultVisitor {
    type Value = ExpectedResult;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "A structure containing the boolean key 'ok'. If it's okay, contains the key 'output', otherwise the key 'type'")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>, {

        if map.next_key::<String>()? != Some("ok".to_owned()) {
            return Err(A::Error::custom("First key should be 'ok'"))
        }

        let ok: bool = map.next_value()?;
        let expected_key = if ok { "output" } else { "type" };
        if map.next_key::<String>()?.as_ref()
            .ok_or(A::Error::custom("Must have two keys"))? != expected_key
        {
            return Err(A::Error::custom(format!("Second key should be '{}'", expected_key)))
        }

        let value: String = map.next_value()?;
        let result = if ok {
            ExpectedResult(Ok(TestOutput::from(value)))
        } else {
            match value.as_str() {
                "ReadError" | "KeyNotFound" | "DuplicateDefinition" | "TypeMismatch"
                | "ArityMismatch" | "NotCallable" | "Io" => ExpectedResult(Err(value)),
                other => return Err(A::Error::custom(format!("Unrecognized error kind: {}", other))),
            }
        };

        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("Only two keys should be present"));
        }

        Ok(result)
    }
}

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read(path)?;
    Ok(source.lines()
        .filter_ok(|line| !line.trim().is_empty())
        .collect::<Result<Vec<String>, _>>()?)
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ExpectedResult>> {
    let source = std::fs::read(path)?;
    let result: Vec<ExpectedResult> = serde_json::from_slice(&source)?;
    Ok(result)
}

/// Pairs each line of `test_inputs/<testcase>.slink` with the matching entry of
/// `test_outputs/<testcase>.json`
pub fn load_test_pair(testcase: &str) -> anyhow::Result<Vec<(String, Result<TestOutput, String>)>> {
    let base_path = fixture_root();
    let input = load_input_file(base_path.join("test_inputs").join(format!("{}.slink", testcase)))?;
    let output = load_output_file(base_path.join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() {
        bail!("Input and output of testcase {} does not match ({} lines, {} results)", testcase, input.len(), output.len());
    }
    Ok(input.into_iter().zip(output.into_iter().map(|expected| expected.0)).collect_vec())
}

pub fn all_testcases() -> anyhow::Result<Vec<String>> {
    let mut testcases = vec![];
    for entry in std::fs::read_dir(fixture_root().join("test_inputs"))? {
        let path = entry?.path();
        if path.extension().is_some_and(|extension| extension == "slink") {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                testcases.push(stem.to_owned());
            }
        }
    }
    if testcases.is_empty() { bail!("No testcases found"); }

    testcases.sort();
    Ok(testcases)
}
