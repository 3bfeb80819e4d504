//! Task registry: the static set of declared tasks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::dag::TaskGraph;
use crate::core::task::{Task, TaskBody, TaskInfo};
use crate::{Error, Result};

/// Declared tasks, kept in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    tasks: Vec<Arc<Task>>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under its unique name.
    pub fn register(&mut self, task: Task) -> Result<()> {
        if self.index.contains_key(&task.name) {
            return Err(Error::DuplicateTask(task.name));
        }
        self.index.insert(task.name.clone(), self.tasks.len());
        self.tasks.push(Arc::new(task));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<Task>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tasks[i]))
            .ok_or_else(|| Error::UnknownTask(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn describe(&self) -> Vec<TaskInfo> {
        self.tasks.iter().map(|t| t.info()).collect()
    }

    /// Graph of every declared task. Prerequisites point at their dependents
    /// and sequence members point at the sequence task that contains them.
    pub fn graph(&self) -> Result<TaskGraph> {
        let mut dag = TaskGraph::new();
        for task in &self.tasks {
            dag.add_task(&task.name);
        }
        for task in &self.tasks {
            for prerequisite in &task.prerequisites {
                dag.add_dependency(prerequisite, &task.name)?;
            }
            if let TaskBody::Sequence(sequence) = &task.body {
                for member in sequence.members() {
                    dag.add_dependency(member, &task.name)?;
                }
            }
        }
        Ok(dag)
    }

    /// Check that every referenced task exists and that there are no cycles.
    pub fn validate(&self) -> Result<()> {
        self.graph().map(|_| ())
    }

    /// Scheduling graph for one group: the members plus all of their
    /// transitive prerequisites, with prerequisite edges only.
    pub fn closure(&self, members: &[String]) -> Result<TaskGraph> {
        let mut dag = TaskGraph::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<String> = members.iter().rev().cloned().collect();
        let mut order = Vec::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let task = self.get(&name)?;
            order.push(Arc::clone(&task));
            for prerequisite in task.prerequisites.iter().rev() {
                stack.push(prerequisite.clone());
            }
        }

        for task in &order {
            dag.add_task(&task.name);
        }
        for task in &order {
            for prerequisite in &task.prerequisites {
                dag.add_dependency(prerequisite, &task.name)?;
            }
        }
        Ok(dag)
    }
}
