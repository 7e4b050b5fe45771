// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use crate::common::{init_tracing, CountingEvaluator};

use anyhow::Result;
use info_providers::*;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Target {
    name: String,
    srcs: Vec<String>,
    tags: BTreeSet<String>,
}

fn declare(evaluator: Arc<CountingEvaluator>, tags: &str) -> Result<Provider<Target>> {
    Ok(Declaration::new(["name", "srcs", "tags"])
        .defaults(["['main.c']", tags])
        .constructor(|(name, srcs, tags): (String, Vec<String>, BTreeSet<String>)| {
            Target { name, srcs, tags }
        })
        .literal_evaluator(evaluator)
        .build()?)
}

#[test]
fn defaults_resolve_lazily_and_once() -> Result<()> {
    let evaluator = Arc::new(CountingEvaluator::default());
    let provider = declare(evaluator.clone(), "['a', 'a']")?;
    assert_eq!(evaluator.count(), 0);

    for _ in 0..3 {
        let target = provider.call(CallArgs::kwargs([("name", "t")]))?;
        assert_eq!(target.srcs, ["main.c"]);
        assert_eq!(target.tags.len(), 1);
    }
    assert_eq!(evaluator.count(), 2);

    // Supplying both values never touches the cache again.
    provider.call(
        CallArgs::new()
            .arg("t")
            .arg(Value::new_list())
            .arg(Value::new_list()),
    )?;
    assert_eq!(evaluator.count(), 2);
    Ok(())
}

#[test]
fn concurrent_first_use_evaluates_once() -> Result<()> {
    init_tracing();
    let evaluator = Arc::new(CountingEvaluator::with_delay(Duration::from_millis(20)));
    let provider = declare(evaluator.clone(), "['x']")?;

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| provider.call(CallArgs::kwargs([("name", "t")]))))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("binder thread panicked"))
            .collect()
    });

    assert_eq!(evaluator.count(), 2);
    let first = results[0].clone()?;
    for result in results {
        assert_eq!(result?, first);
    }
    Ok(())
}

#[test]
fn malformed_default_fails_once_and_keeps_failing() -> Result<()> {
    init_tracing();
    let evaluator = Arc::new(CountingEvaluator::default());
    let provider = declare(evaluator.clone(), "['x',")?;

    let first = provider
        .call(CallArgs::kwargs([("name", "t")]))
        .unwrap_err();
    let second = provider
        .call(CallArgs::kwargs([("name", "t")]))
        .unwrap_err();

    assert_eq!(first, second);
    assert!(matches!(
        first,
        InfoError::Bind(BindError::Default(DeclarationError::MalformedDefault { .. }))
    ));
    assert!(first
        .to_string()
        .starts_with("Target: invalid default `['x',` for parameter 'tags'"));
    // One evaluation for `srcs`, one for the broken `tags`.
    assert_eq!(evaluator.count(), 2);

    // Other parameters keep working.
    let target = provider.call(
        CallArgs::new()
            .kwarg("name", "t")
            .kwarg("tags", Value::new_list()),
    )?;
    assert!(target.tags.is_empty());
    Ok(())
}

#[test]
fn concurrent_failures_are_shared() -> Result<()> {
    let evaluator = Arc::new(CountingEvaluator::with_delay(Duration::from_millis(20)));
    let provider = declare(evaluator.clone(), "[1]")?;

    let errors: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| provider.call(CallArgs::kwargs([("name", "t")]))))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("binder thread panicked"))
            .collect()
    });

    assert_eq!(evaluator.count(), 2);
    for error in errors {
        let error = error.unwrap_err();
        assert!(error
            .to_string()
            .ends_with("expected value of type 'set[string]', got value of type 'list'"));
    }
    Ok(())
}

#[test]
fn defaults_must_be_literals() -> Result<()> {
    let provider = declare(Arc::new(CountingEvaluator::default()), "Target()")?;
    let err = provider
        .call(CallArgs::kwargs([("name", "t")]))
        .unwrap_err();
    assert!(err.to_string().contains("default value must be a literal"));
    Ok(())
}

#[test]
fn preload_resolves_everything() -> Result<()> {
    let evaluator = Arc::new(CountingEvaluator::default());
    let provider = declare(evaluator.clone(), "[]")?;
    assert!(!provider.defaults().is_resolved(1));

    provider.preload_defaults()?;
    assert!(provider.defaults().is_resolved(1));
    assert!(provider.defaults().is_resolved(2));
    assert!(!provider.defaults().is_resolved(0));
    assert_eq!(evaluator.count(), 2);

    provider.call(CallArgs::kwargs([("name", "t")]))?;
    assert_eq!(evaluator.count(), 2);
    Ok(())
}

#[test]
fn preload_from_yaml_config() -> Result<()> {
    let config = BindConfig::from_yaml_str("preload-defaults: true")?;
    assert!(config.allow_positional);

    let evaluator = Arc::new(CountingEvaluator::default());
    let provider = Declaration::new(["name", "srcs", "tags"])
        .defaults(["[]", "[]"])
        .constructor(|(name, srcs, tags): (String, Vec<String>, BTreeSet<String>)| {
            Target { name, srcs, tags }
        })
        .literal_evaluator(evaluator.clone())
        .config(config)
        .build()?;
    assert_eq!(evaluator.count(), 2);
    assert!(provider.defaults().is_resolved(2));

    assert!(BindConfig::from_yaml_str("preload: true").is_err());
    Ok(())
}

#[test]
fn cache_resolves_against_any_evaluator() -> Result<()> {
    let schema = Schema::derive(
        "Flags",
        &["level", "enabled"],
        &["3", "False"],
        ConsumerKind::Constructor,
        &[TypeTag::Int, TypeTag::Bool],
    )?;
    let cache = DefaultCache::new(&schema);
    let evaluator = Interpreter::default();

    assert_eq!(cache.resolve(0, &evaluator), Some(Ok(Value::from(3i64))));
    assert_eq!(cache.resolve(1, &evaluator), Some(Ok(Value::from(false))));
    assert_eq!(cache.resolve(2, &evaluator), None);
    cache.resolve_all(&evaluator)?;
    Ok(())
}
