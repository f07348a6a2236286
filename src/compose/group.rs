// ABOUTME: Named collection of container specs and their dependency graph.
// ABOUTME: Resolves links into dependency edges and starts containers dependencies-first.

use super::spec::ContainerSpec;
use crate::error::{Error, Result};
use crate::runtime::{ContainerLink, ContainerOps, FullRuntime};
use crate::types::{ContainerId, Label};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

/// Position of a spec inside its group. Dependency edges are stored as these
/// indices, never as references between specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecIndex(usize);

impl SpecIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// The compose unit: every container managed together, keyed by label.
#[derive(Debug, Default)]
pub struct ComposeGroup {
    specs: Vec<ContainerSpec>,
    labels: Vec<Label>,
    index: HashMap<Label, SpecIndex>,
}

impl ComposeGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec` under its label.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the spec has no label, `Error::DuplicateLabel`
    /// if the label is already taken. The group is unchanged on error.
    pub fn add_container(&mut self, spec: ContainerSpec) -> Result<SpecIndex> {
        let label = spec.label().cloned().ok_or_else(|| {
            Error::Configuration(format!(
                "container '{}' has no label",
                spec.attributes().display_name()
            ))
        })?;

        if self.index.contains_key(&label) {
            return Err(Error::DuplicateLabel(label.to_string()));
        }

        let index = SpecIndex(self.specs.len());
        debug!(container = %label, "registered container");
        self.specs.push(spec);
        self.labels.push(label.clone());
        self.index.insert(label, index);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<SpecIndex> {
        self.index.get(label).copied()
    }

    pub fn get(&self, label: &str) -> Option<&ContainerSpec> {
        self.index_of(label).map(|i| &self.specs[i.0])
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut ContainerSpec> {
        self.index_of(label).map(|i| &mut self.specs[i.0])
    }

    pub fn spec(&self, index: SpecIndex) -> Option<&ContainerSpec> {
        self.specs.get(index.0)
    }

    pub fn label(&self, index: SpecIndex) -> Option<&Label> {
        self.labels.get(index.0)
    }

    /// Containers in registration order.
    pub fn containers(&self) -> impl Iterator<Item = (&Label, &ContainerSpec)> {
        self.labels.iter().zip(self.specs.iter())
    }

    /// Labels of the containers `label` depends on, in link order.
    pub fn dependency_labels(&self, label: &str) -> Result<Vec<&Label>> {
        let index = self.require(label)?;
        self.specs[index.0]
            .dependencies()
            .iter()
            .map(|&dep| self.entry(dep).map(|(label, _)| label))
            .collect()
    }

    fn require(&self, label: &str) -> Result<SpecIndex> {
        self.index_of(label)
            .ok_or_else(|| Error::UnknownContainer(label.to_string()))
    }

    /// Label and spec behind `index`. Indices recorded by hand through
    /// [`ContainerSpec::add_dependency`] may point outside this group.
    fn entry(&self, index: SpecIndex) -> Result<(&Label, &ContainerSpec)> {
        self.labels
            .get(index.0)
            .zip(self.specs.get(index.0))
            .ok_or_else(|| Error::UnknownContainer(format!("#{}", index.0)))
    }

    /// Turn every declared link into a dependency edge.
    ///
    /// Dependency lists are recomputed from scratch, so calling this again
    /// after adding containers is safe.
    ///
    /// # Errors
    ///
    /// `Error::UnresolvedLink` naming the first link whose target is not in
    /// the group. No dependency list is modified in that case.
    pub fn link_containers(&mut self) -> Result<()> {
        let mut resolved = Vec::with_capacity(self.specs.len());

        for (label, spec) in self.containers() {
            let mut dependencies = Vec::new();
            for link in spec.attributes().links.iter().flat_map(|links| links.iter()) {
                let target = self.index_of(link.target.as_str()).ok_or_else(|| {
                    Error::UnresolvedLink {
                        container: label.to_string(),
                        target: link.target.to_string(),
                    }
                })?;
                if !dependencies.contains(&target) {
                    dependencies.push(target);
                }
            }
            resolved.push(dependencies);
        }

        for (spec, dependencies) in self.specs.iter_mut().zip(resolved) {
            spec.replace_dependencies(dependencies);
        }
        Ok(())
    }

    /// Every label ordered so that dependencies come before their dependents.
    ///
    /// Ties are broken by registration order, so the result is deterministic.
    pub fn start_order(&self) -> Result<Vec<&Label>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.specs.len()];
        let mut order = Vec::with_capacity(self.specs.len());

        for root in 0..self.specs.len() {
            if marks[root] == Mark::Done {
                continue;
            }

            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::OnPath;

            while let Some(&(current, cursor)) = stack.last() {
                match self.specs[current].dependencies().get(cursor) {
                    Some(&dep) => {
                        if let Some(top) = stack.last_mut() {
                            top.1 += 1;
                        }
                        self.entry(dep)?;
                        match marks[dep.0] {
                            Mark::Done => {}
                            Mark::OnPath => {
                                let path: Vec<usize> = stack.iter().map(|&(i, _)| i).collect();
                                return Err(self.cycle_error(&path, dep.0));
                            }
                            Mark::Unvisited => {
                                marks[dep.0] = Mark::OnPath;
                                stack.push((dep.0, 0));
                            }
                        }
                    }
                    None => {
                        stack.pop();
                        marks[current] = Mark::Done;
                        order.push(&self.labels[current]);
                    }
                }
            }
        }

        Ok(order)
    }

    fn cycle_error(&self, path: &[usize], repeated: usize) -> Error {
        let start = path.iter().position(|&i| i == repeated).unwrap_or(0);
        let cycle = path[start..]
            .iter()
            .chain(std::iter::once(&repeated))
            .map(|&i| self.labels[i].to_string())
            .collect();
        Error::CyclicDependency(cycle)
    }

    /// Start `label`, starting any dependency that is not running first.
    ///
    /// The walk is depth-first in link order: a dependency's own dependencies
    /// are handled before it. Dependencies already running are left alone
    /// (and their dependencies are not inspected). Containers started before
    /// a failure keep running.
    ///
    /// # Errors
    ///
    /// `Error::UnknownContainer` for an unregistered label,
    /// `Error::CyclicDependency` if the walk reaches a container already on
    /// its own path, plus anything [`ContainerSpec::start`] returns.
    pub async fn start<R: FullRuntime>(&mut self, label: &str, runtime: &R) -> Result<ContainerId> {
        let root = self.require(label)?;
        let mut handled: HashSet<usize> = HashSet::new();
        let mut stack: Vec<(usize, usize)> = vec![(root.0, 0)];

        loop {
            let Some(&(current, cursor)) = stack.last() else {
                break;
            };

            if let Some(&dep) = self.specs[current].dependencies().get(cursor) {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                if stack.iter().any(|&(i, _)| i == dep.0) {
                    let path: Vec<usize> = stack.iter().map(|&(i, _)| i).collect();
                    return Err(self.cycle_error(&path, dep.0));
                }
                let (dep_label, dep_spec) = self.entry(dep)?;
                if handled.contains(&dep.0) {
                    continue;
                }
                if dep_spec.is_running(runtime).await? {
                    debug!(container = %dep_label, "dependency already running");
                    handled.insert(dep.0);
                    continue;
                }

                stack.push((dep.0, 0));
                continue;
            }

            stack.pop();
            let links = self.links_for(current)?;
            let id = self.specs[current].start(runtime, &links).await?;
            handled.insert(current);

            if stack.is_empty() {
                return Ok(id);
            }
        }

        Err(Error::UnknownContainer(label.to_string()))
    }

    /// Links for `index`'s dependencies, each named after the dependency's label.
    fn links_for(&self, index: usize) -> Result<Vec<ContainerLink>> {
        self.specs[index]
            .dependencies()
            .iter()
            .map(|&dep| {
                let (target, spec) = self.entry(dep)?;
                let container = spec
                    .container_id()
                    .cloned()
                    .ok_or_else(|| Error::NotInstantiated(target.to_string()))?;
                Ok(ContainerLink {
                    container,
                    alias: target.to_string(),
                })
            })
            .collect()
    }

    fn ordered_labels(&self) -> Result<Vec<Label>> {
        Ok(self.start_order()?.into_iter().cloned().collect())
    }

    /// Start every container, dependencies first.
    pub async fn start_all<R: FullRuntime>(&mut self, runtime: &R) -> Result<()> {
        let order = self.ordered_labels()?;
        info!(containers = order.len(), "starting group");
        for label in order {
            let _ = self.start(label.as_str(), runtime).await?;
        }
        Ok(())
    }

    /// Stop every container gracefully, dependents before their dependencies.
    pub async fn stop_all<R: ContainerOps>(&self, runtime: &R, timeout: Duration) -> Result<()> {
        for label in self.start_order()?.into_iter().rev() {
            self.specs[self.require(label.as_str())?.0]
                .stop(runtime, timeout)
                .await?;
        }
        Ok(())
    }

    /// Kill every container, dependents before their dependencies.
    pub async fn kill_all<R: ContainerOps>(&self, runtime: &R) -> Result<()> {
        for label in self.start_order()?.into_iter().rev() {
            self.specs[self.require(label.as_str())?.0]
                .kill(runtime)
                .await?;
        }
        Ok(())
    }

    /// Remove every container, dependents before their dependencies.
    pub async fn delete_all<R: ContainerOps>(&mut self, runtime: &R) -> Result<()> {
        for label in self.ordered_labels()?.into_iter().rev() {
            let index = self.require(label.as_str())?;
            self.specs[index.0].delete(runtime).await?;
        }
        Ok(())
    }
}
