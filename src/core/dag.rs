//! Task DAG (Directed Acyclic Graph) for dependency management.
//!
//! This module provides the TaskGraph structure that represents "must finish
//! before" relationships between named tasks, enabling parallel execution of
//! independent tasks.

use crate::core::task::TaskRun;
use crate::error::{Error, Result};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// The task dependency graph.
///
/// Nodes are per-run task records and an edge `a -> b` means `a` must
/// complete before `b` may start.
pub struct TaskGraph {
    /// The underlying directed graph.
    graph: DiGraph<TaskRun, ()>,
    /// Index mapping from task name to NodeIndex for fast lookups.
    task_index: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    /// Create a new empty TaskGraph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            task_index: HashMap::new(),
        }
    }

    /// Add a task to the graph.
    ///
    /// If a task with the same name already exists, returns the existing NodeIndex.
    pub fn add_task(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.task_index.get(name) {
            return index;
        }

        let index = self.graph.add_node(TaskRun::new(name));
        self.task_index.insert(name.to_string(), index);
        index
    }

    /// Add a dependency: `from` must complete before `to` can start.
    ///
    /// # Errors
    /// Returns an error if either task is missing or the edge would create a cycle.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<()> {
        let from_index = self
            .task_index
            .get(from)
            .ok_or_else(|| Error::UnknownTask(from.to_string()))?;

        let to_index = self
            .task_index
            .get(to)
            .ok_or_else(|| Error::UnknownTask(to.to_string()))?;

        if self.graph.find_edge(*from_index, *to_index).is_some() {
            return Ok(());
        }

        let edge = self.graph.add_edge(*from_index, *to_index, ());

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(Error::Validation(format!(
                "Adding dependency from {} to {} would create a cycle",
                from, to
            )));
        }

        Ok(())
    }

    pub fn get_task(&self, name: &str) -> Option<&TaskRun> {
        self.task_index
            .get(name)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub fn get_task_mut(&mut self, name: &str) -> Option<&mut TaskRun> {
        if let Some(&index) = self.task_index.get(name) {
            self.graph.node_weight_mut(index)
        } else {
            None
        }
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_dependency(&self, from: &str, to: &str) -> bool {
        if let (Some(&from_idx), Some(&to_idx)) =
            (self.task_index.get(from), self.task_index.get(to))
        {
            self.graph.find_edge(from_idx, to_idx).is_some()
        } else {
            false
        }
    }

    /// Names of the tasks the given task waits for.
    pub fn get_dependencies(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, petgraph::Direction::Incoming)
    }

    /// Names of the tasks waiting for the given task.
    pub fn get_dependents(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: petgraph::Direction) -> Vec<&str> {
        if let Some(&index) = self.task_index.get(name) {
            self.graph
                .neighbors_directed(index, direction)
                .filter_map(|neighbor| self.graph.node_weight(neighbor))
                .map(|run| run.name.as_str())
                .collect()
        } else {
            Vec::new()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_task(&self, name: &str) -> bool {
        self.task_index.contains_key(name)
    }

    // ========== Scheduling Operations ==========

    /// Get all tasks ready to execute.
    ///
    /// A task is ready if it has not started and every task it depends on is
    /// in the completed set. Results follow insertion order.
    pub fn ready_tasks(&self, completed: &HashSet<String>) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter_map(|index| {
                let run = self.graph.node_weight(index)?;

                if completed.contains(&run.name) || !run.can_start() {
                    return None;
                }

                let deps_satisfied = self
                    .graph
                    .neighbors_directed(index, petgraph::Direction::Incoming)
                    .all(|dep_index| {
                        self.graph
                            .node_weight(dep_index)
                            .map(|dep| completed.contains(&dep.name))
                            .unwrap_or(false)
                    });

                if deps_satisfied {
                    Some(run.name.as_str())
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn start_task(&mut self, name: &str) -> Result<()> {
        self.get_task_mut(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))?
            .start();
        Ok(())
    }

    pub fn complete_task(&mut self, name: &str) -> Result<()> {
        self.get_task_mut(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))?
            .complete();
        Ok(())
    }

    pub fn fail_task(&mut self, name: &str, error: &str) -> Result<()> {
        self.get_task_mut(name)
            .ok_or_else(|| Error::UnknownTask(name.to_string()))?
            .fail(error);
        Ok(())
    }

    pub fn all_complete(&self, completed: &HashSet<String>) -> bool {
        self.task_index.keys().all(|name| completed.contains(name))
    }

    /// Get task names in topological order (each after all of its dependencies).
    pub fn topological_order(&self) -> Result<Vec<&str>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| {
            let task_name = self
                .graph
                .node_weight(cycle.node_id())
                .map(|t| t.name.as_str())
                .unwrap_or("unknown");
            Error::Validation(format!("Cycle detected at task: {}", task_name))
        })?;

        Ok(sorted
            .into_iter()
            .filter_map(|index| self.graph.node_weight(index))
            .map(|run| run.name.as_str())
            .collect())
    }

    pub fn pending_count(&self, completed: &HashSet<String>) -> usize {
        self.task_index
            .keys()
            .filter(|name| !completed.contains(*name))
            .count()
    }
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
