//! Dependency graph rules.
//!
//! An edge `A -> B` means `A` is an inflow (prerequisite) of `B`. Checks run
//! against a scratch copy of the graph, so a rejected batch of edges never
//! touches stored tasks.

use super::{Task, TaskId};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// A proposed or existing edge closes a dependency cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("dependency {from} -> {to} would create a cycle")]
pub struct CycleError {
    /// Prerequisite end of the offending edge.
    pub from: TaskId,
    /// Dependent end of the offending edge.
    pub to: TaskId,
}

/// Adjacency view of the inflow/outflow relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

impl DependencyGraph {
    /// Builds the graph over `tasks`.
    ///
    /// Edges are read from both inflow and outflow sets; edges leading
    /// outside the given tasks are ignored.
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let collected: Vec<&Task> = tasks.into_iter().collect();
        let mut edges: BTreeMap<TaskId, BTreeSet<TaskId>> = collected
            .iter()
            .map(|task| (task.id().clone(), BTreeSet::new()))
            .collect();
        for task in &collected {
            for inflow in task.inflows() {
                if let Some(targets) = edges.get_mut(inflow) {
                    targets.insert(task.id().clone());
                }
            }
            let known: Vec<TaskId> = task
                .outflows()
                .iter()
                .filter(|outflow| edges.contains_key(*outflow))
                .cloned()
                .collect();
            if let Some(targets) = edges.get_mut(task.id()) {
                targets.extend(known);
            }
        }
        Self { edges }
    }

    /// Returns whether `to` is reachable from `from` along outflow edges.
    #[must_use]
    pub fn reaches(&self, from: &TaskId, to: &TaskId) -> bool {
        let mut visited: BTreeSet<&TaskId> = BTreeSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(targets) = self.edges.get(current) {
                stack.extend(targets.iter());
            }
        }
        false
    }

    /// Adds the edge `from -> to`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when the edge is a self-loop or `from` is
    /// already reachable from `to`. The graph is unchanged on error.
    pub fn add_edge(&mut self, from: &TaskId, to: &TaskId) -> Result<(), CycleError> {
        if from == to || self.reaches(to, from) {
            return Err(CycleError {
                from: from.clone(),
                to: to.clone(),
            });
        }
        self.edges.entry(to.clone()).or_default();
        self.edges
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        Ok(())
    }

    /// Checks that every edge in `proposed` can be added together.
    ///
    /// # Errors
    ///
    /// Returns the first [`CycleError`] encountered; `self` is never
    /// modified.
    pub fn check_edges(&self, proposed: &[(TaskId, TaskId)]) -> Result<(), CycleError> {
        let mut scratch = self.clone();
        for (from, to) in proposed {
            scratch.add_edge(from, to)?;
        }
        Ok(())
    }

    /// Verifies the whole graph is acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] naming one edge of a remaining cycle.
    pub fn ensure_acyclic(&self) -> Result<(), CycleError> {
        self.order().map(|_| ())
    }

    /// Returns node identifiers in topological order.
    ///
    /// Kahn's algorithm; nodes that become ready together are emitted in
    /// ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when nodes remain after the ready set drains.
    pub fn order(&self) -> Result<Vec<TaskId>, CycleError> {
        let mut in_degree: BTreeMap<&TaskId, usize> =
            self.edges.keys().map(|id| (id, 0)).collect();
        for target in self.edges.values().flatten() {
            let degree = in_degree.entry(target).or_insert(0);
            *degree = degree.saturating_add(1);
        }

        let mut ready: BTreeSet<&TaskId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut ordered = Vec::with_capacity(in_degree.len());
        while let Some(id) = ready.pop_first() {
            ordered.push(id.clone());
            for target in self.edges.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert(target);
                    }
                }
            }
        }

        match in_degree.iter().find(|(_, degree)| **degree > 0) {
            None => Ok(ordered),
            Some((stuck, _)) => Err(self.blocking_edge(stuck, &in_degree)),
        }
    }

    fn blocking_edge(&self, stuck: &TaskId, in_degree: &BTreeMap<&TaskId, usize>) -> CycleError {
        let from = self
            .edges
            .iter()
            .find(|(source, targets)| {
                targets.contains(stuck) && in_degree.get(source).is_some_and(|degree| *degree > 0)
            })
            .map_or_else(|| stuck.clone(), |(source, _)| source.clone());
        CycleError {
            from,
            to: stuck.clone(),
        }
    }
}

/// Orders `tasks` so every inflow precedes its dependents.
///
/// Edges to tasks outside the slice are ignored. Ties are broken by
/// ascending task identifier.
///
/// # Errors
///
/// Returns [`CycleError`] if the tasks' edges contain a cycle.
pub fn topological_order(tasks: Vec<Task>) -> Result<Vec<Task>, CycleError> {
    let order = DependencyGraph::from_tasks(&tasks).order()?;
    let mut by_id: BTreeMap<TaskId, Task> = tasks
        .into_iter()
        .map(|task| (task.id().clone(), task))
        .collect();
    Ok(order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect())
}
