// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use crate::common::*;

use std::env;

use anyhow::{bail, Result};
use info_providers::*;
use serde::Deserialize;
use test_generator::test_resources;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    expr: String,
    want_result: Option<Value>,
    want_display: Option<String>,
    error: Option<String>,
    skip: Option<bool>,
}

#[derive(Deserialize, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

// Records compare through their JSON form so that expected values can be
// written as plain YAML maps.
fn match_values(computed: &Value, expected: &Value) -> Result<()> {
    let (c, e) = (serde_json::to_value(computed)?, serde_json::to_value(expected)?);
    if c != e {
        bail!(
            "value mismatch:\nleft  = {}\nright = {}\n",
            serde_json::to_string_pretty(&c)?,
            serde_json::to_string_pretty(&e)?
        );
    }
    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;
    let interpreter = Interpreter::new(globals());

    init_tracing();
    println!("running {file}");

    for case in test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }

        match (
            interpreter.eval_str("BUILD", &case.expr),
            case.want_result.is_some() || case.want_display.is_some(),
            &case.error,
        ) {
            (Ok(actual), true, None) => {
                if let Some(expected) = &case.want_result {
                    match_values(&actual, expected)?;
                }
                if let Some(expected) = &case.want_display {
                    assert_eq!(&actual.to_string(), expected, "display of `{}`", case.expr);
                }
            }
            (Err(actual), false, Some(expected)) => {
                let actual = actual.to_string();
                if !actual.contains(expected.as_str()) {
                    bail!("Error message\n`{actual}\n`\ndoes not contain `{expected}`");
                }
            }
            (Ok(actual), _, Some(expected)) => {
                bail!("`{}` evaluated to {actual} instead of failing with `{expected}`", case.expr)
            }
            (Err(actual), _, None) => return Err(actual),
            _ => panic!("either want_result/want_display or error must be specified in test case."),
        }

        println!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/interpreter/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
#[ignore = "intended for running a single yaml file"]
fn one_yaml() -> Result<()> {
    let Some(file) = env::args().find(|a| a.ends_with(".yaml")) else {
        bail!("missing <yaml-file>");
    };
    yaml_test(&file)
}

#[test]
fn errors_point_at_the_call_site() {
    let interpreter = Interpreter::new(globals());
    let err = interpreter
        .eval_str("BUILD", "[\n  SomeInfo(),\n]")
        .unwrap_err()
        .to_string();
    assert!(err.contains("--> BUILD:2:3"), "{err}");
    assert!(err.ends_with("error: missing mandatory argument 'my_info' in call to SomeInfo"));
}

#[test]
fn records_are_values() -> Result<()> {
    let interpreter = Interpreter::new(globals());
    let list = interpreter.eval_str(
        "BUILD",
        "[SomeInfo(my_info = 1), SomeInfo('default value', 1), OtherInfo(str = 'x')]",
    )?;
    let items = list.as_list()?;
    assert_eq!(items[0], items[1]);
    assert_ne!(items[0], items[2]);

    let info = items[2].as_info()?;
    assert!(info.is::<OtherInfo>());
    assert_eq!(info.get_attr("str"), Some(Value::from("x")));
    assert_eq!(items[2].type_name(), "OtherInfo");

    // Attributes feed other calls.
    let value = interpreter.eval_str(
        "BUILD",
        "InfoWithSet(set = [OtherInfo(str = 'a').str, OtherInfo(str = 'a').str])",
    )?;
    let record = value.as_info()?.downcast_ref::<InfoWithSet>().cloned();
    assert_eq!(record.map(|r| r.set.len()), Some(1));
    Ok(())
}

#[test]
fn literal_evaluator_rejects_calls() {
    let interpreter = Interpreter::new(globals());
    let err = interpreter
        .eval_literal("SomeInfo(my_info = 1)")
        .unwrap_err()
        .to_string();
    assert!(err.contains("--> <default>:1:1"), "{err}");
    assert!(err.ends_with("error: default value must be a literal"));

    assert_eq!(
        interpreter.eval_literal("{'a': [1, None]}").ok().map(|v| v.to_string()),
        Some("{\"a\": [1, None]}".to_string())
    );
}

#[test]
fn nul_does_not_end_the_input() -> Result<()> {
    let interpreter = Interpreter::new(globals());
    let err = interpreter
        .eval_str("BUILD", "[1, 2]\0 SomeInfo(((")
        .unwrap_err()
        .to_string();
    assert!(err.contains("--> BUILD:1:7"), "{err}");
    assert!(err.ends_with("error: invalid character"), "{err}");

    assert!(interpreter.eval_literal("[]\0SomeInfo(").is_err());
    assert!(interpreter.eval_literal("'a\0b'").is_err());

    // Without the NUL both sources are fine.
    assert_eq!(interpreter.eval_str("BUILD", "[1, 2]")?.to_string(), "[1, 2]");
    Ok(())
}
