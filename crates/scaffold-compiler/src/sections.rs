// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Two-phase loading of a named collection
//!
//! Every entry of a collection is initialised before any finalizer runs, so
//! finalizers can look up siblings regardless of their declaration order.

use serde_json::{Map, Value};
use tracing::debug;

use crate::document::parser::value_kind;
use crate::types::{CompileError, CompileResult, NodePath};

/// A section of the document: a mapping of keys to values
pub type Section = Map<String, Value>;

/// Finalizer of a collection, run after every entry has been initialised
pub enum Finalize<S> {
    None,
    /// Once for the whole collection, with the collection's path
    Collection(fn(&mut S, &NodePath) -> CompileResult<()>),
    /// Once per entry in document order, with the entry's name, section and path
    PerEntry(fn(&mut S, &str, &Section, &NodePath) -> CompileResult<()>),
}

/// The mapping stored under `key`, or [`CompileError::MissingSection`]
pub fn require_section<'a>(parent: &'a Section, key: &str, parent_path: &NodePath) -> CompileResult<&'a Section> {
    match parent.get(key) {
        None => Err(CompileError::MissingSection {
            node: parent_path.clone(),
            key: key.to_string(),
        }),
        Some(Value::Object(section)) => Ok(section),
        Some(other) => Err(CompileError::configuration(
            &parent_path.child(key),
            format!("Expected a mapping, found {}", value_kind(other)),
        )),
    }
}

/// Load the collection stored under `key` in `parent`
///
/// Calls `init` for every entry in document order, then `finalize`. Returns
/// the number of entries.
pub fn load_section<S, I>(
    state: &mut S,
    parent: &Section,
    key: &str,
    parent_path: &NodePath,
    mut init: I,
    finalize: Finalize<S>,
) -> CompileResult<usize>
where
    I: FnMut(&mut S, &str, &Section, &NodePath) -> CompileResult<()>,
{
    let collection = require_section(parent, key, parent_path)?;
    let collection_path = parent_path.child(key);

    let mut entries = Vec::with_capacity(collection.len());
    for (name, value) in collection {
        let entry_path = collection_path.child(name);
        let section = value.as_object().ok_or_else(|| {
            CompileError::configuration(
                &entry_path,
                format!("Expected a mapping, found {}", value_kind(value)),
            )
        })?;
        init(state, name, section, &entry_path)?;
        entries.push((name, section, entry_path));
    }

    match finalize {
        Finalize::None => {}
        Finalize::Collection(finalize) => finalize(state, &collection_path)?,
        Finalize::PerEntry(finalize) => {
            for (name, section, entry_path) in &entries {
                finalize(state, name, section, entry_path)?;
            }
        }
    }

    debug!(target: "scaffold-compiler", "[SECTION] Loaded {} entries from {}", entries.len(), collection_path);
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Section {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[derive(Default)]
    struct Trace(Vec<String>);

    fn record_finalize(trace: &mut Trace, name: &str, _section: &Section, _node: &NodePath) -> CompileResult<()> {
        trace.0.push(format!("finalize:{}", name));
        Ok(())
    }

    fn record_collection(trace: &mut Trace, node: &NodePath) -> CompileResult<()> {
        trace.0.push(format!("collection:{}", node));
        Ok(())
    }

    fn record_init(trace: &mut Trace, name: &str, _section: &Section, _node: &NodePath) -> CompileResult<()> {
        trace.0.push(format!("init:{}", name));
        Ok(())
    }

    #[test]
    fn test_all_inits_before_any_finalize() {
        let doc = document(json!({"layers": {"b": {}, "a": {}, "c": {}}}));
        let mut trace = Trace::default();
        let count = load_section(
            &mut trace,
            &doc,
            "layers",
            &NodePath::root(),
            record_init,
            Finalize::PerEntry(record_finalize),
        )
        .unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            trace.0,
            vec!["init:b", "init:a", "init:c", "finalize:b", "finalize:a", "finalize:c"]
        );
    }

    #[test]
    fn test_collection_finalize_runs_once() {
        let doc = document(json!({"layers": {"a": {}, "b": {}}}));
        let mut trace = Trace::default();
        load_section(
            &mut trace,
            &doc,
            "layers",
            &NodePath::root(),
            record_init,
            Finalize::Collection(record_collection),
        )
        .unwrap();
        assert_eq!(trace.0, vec!["init:a", "init:b", "collection:layers"]);
    }

    #[test]
    fn test_missing_section() {
        let doc = document(json!({}));
        let err = load_section(
            &mut Trace::default(),
            &doc,
            "devices",
            &NodePath::of("simulations").child("sim"),
            record_init,
            Finalize::None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing 'devices' section in simulations.sim");
    }

    #[test]
    fn test_entry_must_be_mapping() {
        let doc = document(json!({"layers": {"a": 3}}));
        let err = load_section(&mut Trace::default(), &doc, "layers", &NodePath::root(), record_init, Finalize::None)
            .unwrap_err();
        assert!(matches!(err, CompileError::Configuration { ref node, .. } if node.to_string() == "layers.a"));
    }

    #[test]
    fn test_init_failure_skips_finalize() {
        let doc = document(json!({"layers": {"a": {}, "b": {}}}));
        let mut trace = Trace::default();
        let result = load_section(
            &mut trace,
            &doc,
            "layers",
            &NodePath::root(),
            |t: &mut Trace, name: &str, _: &Section, node: &NodePath| {
                if name == "b" {
                    return Err(CompileError::configuration(node, "broken"));
                }
                t.0.push(format!("init:{}", name));
                Ok(())
            },
            Finalize::PerEntry(record_finalize),
        );
        assert!(result.is_err());
        assert_eq!(trace.0, vec!["init:a"]);
    }
}
