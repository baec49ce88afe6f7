// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Execution order of connection models
//!
//! A heteroplastic connection model names, through `teaching`, the connection
//! model that teaches it. Teachers are connected before the models they teach.
//! Models without a dependency between them keep their document order.

use std::collections::{BTreeSet, HashMap};

use crate::types::{CompileError, CompileResult, NodePath};

/// Result of ordering the connection models of a simulation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TeachingOrder {
    /// Every model name, teachers before the models they teach
    pub order: Vec<String>,
    /// Models that teach at least one other model, in document order
    pub teachers: Vec<String>,
}

/// Order `(name, teaching)` pairs given in document order
///
/// # Errors
///
/// A `teaching` target that is not among the models, or a cycle in the
/// teaching relation, is a [`CompileError::Configuration`].
pub fn order_connection_models(models: &[(String, Option<String>)], models_path: &NodePath) -> CompileResult<TeachingOrder> {
    let index: HashMap<&str, usize> = models
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();

    // teacher index of each model
    let mut teacher_of: Vec<Option<usize>> = Vec::with_capacity(models.len());
    let mut taught_by: Vec<Vec<usize>> = vec![Vec::new(); models.len()];
    for (i, (name, teaching)) in models.iter().enumerate() {
        match teaching {
            None => teacher_of.push(None),
            Some(teacher) => {
                let t = *index.get(teacher.as_str()).ok_or_else(|| {
                    CompileError::configuration(
                        &models_path.child(name).child("teaching"),
                        format!("Unknown teaching connection '{}' for '{}'", teacher, name),
                    )
                })?;
                teacher_of.push(Some(t));
                taught_by[t].push(i);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..models.len()).filter(|&i| teacher_of[i].is_none()).collect();
    let mut placed = vec![false; models.len()];
    let mut order = Vec::with_capacity(models.len());

    while let Some(i) = ready.pop_first() {
        placed[i] = true;
        order.push(models[i].0.clone());
        ready.extend(taught_by[i].iter().copied());
    }

    if order.len() < models.len() {
        let start = placed.iter().position(|p| !p).unwrap_or(0);
        let cycle = find_cycle(start, &teacher_of);
        let names: Vec<&str> = cycle.iter().map(|&i| models[i].0.as_str()).collect();
        return Err(CompileError::configuration(
            models_path,
            format!("Teaching dependencies form a cycle: {}", names.join(" -> ")),
        ));
    }

    let teachers = models
        .iter()
        .enumerate()
        .filter(|(i, _)| !taught_by[*i].is_empty())
        .map(|(_, (name, _))| name.clone())
        .collect();

    Ok(TeachingOrder { order, teachers })
}

/// Follow teacher links from `start` until a model repeats
fn find_cycle(start: usize, teacher_of: &[Option<usize>]) -> Vec<usize> {
    let mut path = vec![start];
    let mut current = start;
    while let Some(next) = teacher_of[current] {
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(next);
            return cycle;
        }
        path.push(next);
        current = next;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models(pairs: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        pairs
            .iter()
            .map(|(n, t)| (n.to_string(), t.map(str::to_string)))
            .collect()
    }

    fn path() -> NodePath {
        NodePath::of("simulations").child("sim").child("connection_models")
    }

    #[test]
    fn test_independent_models_keep_document_order() {
        let result = order_connection_models(&models(&[("c", None), ("a", None), ("b", None)]), &path()).unwrap();
        assert_eq!(result.order, vec!["c", "a", "b"]);
        assert!(result.teachers.is_empty());
    }

    #[test]
    fn test_teacher_precedes_taught() {
        let result = order_connection_models(
            &models(&[("pf_purkinje", Some("io_purkinje")), ("golgi", None), ("io_purkinje", None)]),
            &path(),
        )
        .unwrap();
        assert_eq!(result.order, vec!["golgi", "io_purkinje", "pf_purkinje"]);
        assert_eq!(result.teachers, vec!["io_purkinje"]);
    }

    #[test]
    fn test_chain() {
        let result =
            order_connection_models(&models(&[("c", Some("b")), ("b", Some("a")), ("a", None)]), &path()).unwrap();
        assert_eq!(result.order, vec!["a", "b", "c"]);
        assert_eq!(result.teachers, vec!["b", "a"]);
    }

    #[test]
    fn test_unknown_teacher() {
        let err = order_connection_models(&models(&[("a", Some("ghost"))]), &path()).unwrap_err();
        assert_eq!(
            err.node().unwrap().to_string(),
            "simulations.sim.connection_models.a.teaching"
        );
    }

    #[test]
    fn test_cycle_names_models() {
        let err = order_connection_models(
            &models(&[("free", None), ("x", Some("y")), ("y", Some("x"))]),
            &path(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("x -> y -> x"), "{}", err);
    }

    #[test]
    fn test_self_teaching_is_a_cycle() {
        let err = order_connection_models(&models(&[("x", Some("x"))]), &path()).unwrap_err();
        assert!(err.to_string().contains("x -> x"));
    }
}
