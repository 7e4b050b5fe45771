// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Records shared by the integration tests.

use info_providers::*;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;

#[derive(Debug, Clone, PartialEq)]
pub struct SomeInfo {
    pub str: String,
    pub my_info: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OtherInfo {
    pub str: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWithSet {
    pub set: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWithMap {
    pub map: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWithNoDefault {
    pub a: i64,
    pub b: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWithOptional {
    pub label: Option<String>,
    pub enabled: bool,
}

/// Built through a factory that keeps only the keys of `str_list` and
/// stringifies `my_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct SomeInfoWithInstantiate {
    pub str_list: Vec<String>,
    pub my_info: String,
}

fn instantiate(
    (str_list, my_info): (BTreeMap<String, Value>, i64),
) -> Result<SomeInfoWithInstantiate, EvalError> {
    for (key, value) in &str_list {
        if !matches!(value, Value::String(_)) {
            return Err(EvalError::new(format!(
                "str_list values must be strings, got {} for key \"{key}\"",
                value.type_name()
            )));
        }
    }
    Ok(SomeInfoWithInstantiate {
        str_list: str_list.into_keys().collect(),
        my_info: my_info.to_string(),
    })
}

lazy_static! {
    pub static ref SOME_INFO: Provider<SomeInfo> = Declaration::new(["str", "my_info"])
        .defaults(["\"default value\"", ""])
        .constructor(|(str, my_info): (String, i64)| SomeInfo { str, my_info })
        .build()
        .expect("SomeInfo declaration");

    pub static ref OTHER_INFO: Provider<OtherInfo> = Declaration::new(["str"])
        .constructor(|(str,): (String,)| OtherInfo { str })
        .build()
        .expect("OtherInfo declaration");

    pub static ref INFO_WITH_SET: Provider<InfoWithSet> = Declaration::new(["set"])
        .defaults(["[]"])
        .constructor(|(set,): (BTreeSet<String>,)| InfoWithSet { set })
        .build()
        .expect("InfoWithSet declaration");

    pub static ref INFO_WITH_MAP: Provider<InfoWithMap> = Declaration::new(["map"])
        .defaults(["{}"])
        .constructor(|(map,): (BTreeMap<String, i64>,)| InfoWithMap { map })
        .build()
        .expect("InfoWithMap declaration");

    pub static ref INFO_WITH_NO_DEFAULT: Provider<InfoWithNoDefault> = Declaration::new(["a", "b"])
        .constructor(|(a, b): (i64, Vec<String>)| InfoWithNoDefault { a, b })
        .build()
        .expect("InfoWithNoDefault declaration");

    pub static ref INFO_WITH_OPTIONAL: Provider<InfoWithOptional> =
        Declaration::new(["label", "enabled"])
            .defaults(["None", "True"])
            .constructor(|(label, enabled): (Option<String>, bool)| InfoWithOptional {
                label,
                enabled,
            })
            .build()
            .expect("InfoWithOptional declaration");

    pub static ref SOME_INFO_WITH_INSTANTIATE: Provider<SomeInfoWithInstantiate> =
        Declaration::new(["str_list", "my_info"])
            .defaults(["{\"foo\": \"bar\"}", "1"])
            .constructor(|(str_list, my_info): (Vec<String>, String)| {
                SomeInfoWithInstantiate { str_list, my_info }
            })
            .factory(instantiate)
            .build()
            .expect("SomeInfoWithInstantiate declaration");
}

impl Info for SomeInfo {
    fn provider() -> &'static Provider<Self> {
        &SOME_INFO
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("str", Value::from(self.str.as_str())),
            ("my_info", Value::from(self.my_info)),
        ]
    }
}

impl Info for OtherInfo {
    fn provider() -> &'static Provider<Self> {
        &OTHER_INFO
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("str", Value::from(self.str.as_str()))]
    }
}

impl Info for InfoWithSet {
    fn provider() -> &'static Provider<Self> {
        &INFO_WITH_SET
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("set", self.set.clone().into_value())]
    }
}

impl Info for InfoWithMap {
    fn provider() -> &'static Provider<Self> {
        &INFO_WITH_MAP
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![("map", self.map.clone().into_value())]
    }
}

impl Info for InfoWithNoDefault {
    fn provider() -> &'static Provider<Self> {
        &INFO_WITH_NO_DEFAULT
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("a", Value::from(self.a)),
            ("b", self.b.clone().into_value()),
        ]
    }
}

impl Info for InfoWithOptional {
    fn provider() -> &'static Provider<Self> {
        &INFO_WITH_OPTIONAL
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("label", self.label.clone().into_value()),
            ("enabled", Value::from(self.enabled)),
        ]
    }
}

impl Info for SomeInfoWithInstantiate {
    fn provider() -> &'static Provider<Self> {
        &SOME_INFO_WITH_INSTANTIATE
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("str_list", self.str_list.clone().into_value()),
            ("my_info", Value::from(self.my_info.as_str())),
        ]
    }
}

/// Globals binding every record above.
pub fn globals() -> Globals {
    let mut builder = Globals::builder();
    let providers: [Arc<dyn Callable>; 7] = [
        Arc::new(SomeInfo::provider()),
        Arc::new(OtherInfo::provider()),
        Arc::new(InfoWithSet::provider()),
        Arc::new(InfoWithMap::provider()),
        Arc::new(InfoWithNoDefault::provider()),
        Arc::new(InfoWithOptional::provider()),
        Arc::new(SomeInfoWithInstantiate::provider()),
    ];
    for provider in providers {
        builder.add(provider).expect("unique provider names");
    }
    builder.build()
}

/// Delegates to the interpreter and counts evaluations.
#[derive(Default)]
pub struct CountingEvaluator {
    count: AtomicUsize,
    delay: Option<Duration>,
    interpreter: Interpreter,
}

impl CountingEvaluator {
    /// Sleep inside every evaluation so that concurrent callers overlap.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl LiteralEvaluator for CountingEvaluator {
    fn eval_literal(&self, source: &str) -> anyhow::Result<Value> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.interpreter.eval_literal(source)
    }
}

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
