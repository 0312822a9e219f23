//! Pipeline construction and validation.

use super::Pipeline;
use crate::errors::PipelineValidationError;
use crate::stages::{Stage, StageSpec};
use crate::state::PipelineState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Builds a validated [`Pipeline`] from stage descriptors.
///
/// Validation covers duplicate names, unknown and self dependencies,
/// dependency cycles, and read coverage: every field a stage declares it
/// reads must be written by an upstream stage or declared as a pipeline
/// input. The execution order is a deterministic topological sort that
/// preserves insertion order among independent stages.
pub struct PipelineBuilder<S: PipelineState> {
    name: String,
    stages: Vec<StageSpec<S>>,
    inputs: Vec<String>,
}

impl<S: PipelineState> PipelineBuilder<S> {
    /// Creates a builder for a pipeline with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Declares the state fields present before the first stage runs.
    #[must_use]
    pub fn inputs(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inputs = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a fully specified stage.
    #[must_use]
    pub fn stage(mut self, spec: StageSpec<S>) -> Self {
        self.stages.push(spec);
        self
    }

    /// Adds a stage depending on the previously added stage, forming a
    /// linear chain. Equivalent to [`Self::stage`] for the first stage.
    #[must_use]
    pub fn then(mut self, runner: Arc<dyn Stage<S>>) -> Self {
        let mut spec = StageSpec::new(runner);
        if let Some(prev) = self.stages.last() {
            spec = spec.with_dependency(prev.name.clone());
        }
        self.stages.push(spec);
        self
    }

    /// Validates the definition and produces the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineValidationError`] describing the first problem
    /// found.
    pub fn build(self) -> Result<Pipeline<S>, PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new(
                "pipeline name cannot be empty or whitespace-only",
            ));
        }
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "pipeline '{}' has no stages",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for spec in &self.stages {
            spec.validate()?;
            if !seen.insert(spec.name.clone()) {
                return Err(PipelineValidationError::new(format!(
                    "duplicate stage name '{}'",
                    spec.name
                ))
                .with_stages(vec![spec.name.clone()]));
            }
        }

        for spec in &self.stages {
            for dep in &spec.dependencies {
                if !seen.contains(dep) {
                    return Err(PipelineValidationError::new(format!(
                        "stage '{}' depends on unknown stage '{}'",
                        spec.name, dep
                    ))
                    .with_stages(vec![spec.name.clone(), dep.clone()]));
                }
            }
        }

        let order = topological_order(&self.stages)?;
        let stages: Vec<StageSpec<S>> = order
            .into_iter()
            .map(|idx| self.stages[idx].clone())
            .collect();

        validate_read_coverage(&stages, &self.inputs)?;

        Ok(Pipeline::from_parts(self.name, stages))
    }
}

/// Deterministic topological sort; detects cycles.
fn topological_order<S: PipelineState>(
    stages: &[StageSpec<S>],
) -> Result<Vec<usize>, PipelineValidationError> {
    let index: HashMap<&str, usize> = stages
        .iter()
        .enumerate()
        .map(|(idx, spec)| (spec.name.as_str(), idx))
        .collect();

    let mut order = Vec::with_capacity(stages.len());
    let mut visited = vec![false; stages.len()];
    let mut in_progress = vec![false; stages.len()];

    fn visit<S: PipelineState>(
        idx: usize,
        stages: &[StageSpec<S>],
        index: &HashMap<&str, usize>,
        visited: &mut [bool],
        in_progress: &mut [bool],
        order: &mut Vec<usize>,
    ) -> Result<(), PipelineValidationError> {
        if visited[idx] {
            return Ok(());
        }
        if in_progress[idx] {
            return Err(PipelineValidationError::new(format!(
                "dependency cycle involving stage '{}'",
                stages[idx].name
            ))
            .with_stages(vec![stages[idx].name.clone()]));
        }

        in_progress[idx] = true;
        for dep in &stages[idx].dependencies {
            if let Some(&dep_idx) = index.get(dep.as_str()) {
                visit(dep_idx, stages, index, visited, in_progress, order)?;
            }
        }
        in_progress[idx] = false;
        visited[idx] = true;
        order.push(idx);
        Ok(())
    }

    for idx in 0..stages.len() {
        visit(idx, stages, &index, &mut visited, &mut in_progress, &mut order)?;
    }

    Ok(order)
}

/// Checks that every declared read is covered by pipeline inputs or the
/// writes of a transitive upstream stage.
fn validate_read_coverage<S: PipelineState>(
    ordered: &[StageSpec<S>],
    inputs: &[String],
) -> Result<(), PipelineValidationError> {
    let index: HashMap<&str, usize> = ordered
        .iter()
        .enumerate()
        .map(|(idx, spec)| (spec.name.as_str(), idx))
        .collect();

    // available[i] = fields visible to stage i (inputs + transitive upstream writes)
    let mut available: Vec<HashSet<String>> = Vec::with_capacity(ordered.len());
    for spec in ordered {
        let mut fields: HashSet<String> = inputs.iter().cloned().collect();
        for dep in &spec.dependencies {
            if let Some(&dep_idx) = index.get(dep.as_str()) {
                fields.extend(available[dep_idx].iter().cloned());
                fields.extend(ordered[dep_idx].writes.iter().cloned());
            }
        }

        for read in &spec.reads {
            if !fields.contains(read) {
                return Err(PipelineValidationError::new(format!(
                    "stage '{}' reads field '{}' which no upstream stage writes and which is not a declared input",
                    spec.name, read
                ))
                .with_stages(vec![spec.name.clone()]));
            }
        }

        available.push(fields);
    }

    Ok(())
}
