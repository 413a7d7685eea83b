//! The execution driver: a single-threaded, label-indexed interpreter loop
//! over a pipeline's command queue.

use crate::clock::{Clock, MonotonicClock};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::globals::engine;
use crate::hooks::HookRegistry;
use crate::log::{ExecutionLog, LogEntry};
use crate::registry::normalize_dispatch_name;
use crate::types::{PipelineCommand, END_LABEL, GLOBAL_VAR};
use crate::vars::{VariableRetrievedEvent, VariableRetrievingEvent, VariableStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Fired immediately before a filter is dispatched; may rewrite both the
/// resolved input string and the command about to run (including, e.g.,
/// its `send_to_label`, to implement branching from outside the filter
/// itself).
#[derive(Debug, Clone)]
pub struct FilterExecutingEvent {
    pub input: String,
    pub command: PipelineCommand,
}

/// Fired immediately after a filter returns successfully; may rewrite the
/// output string before it's written to the output variable slot.
#[derive(Debug, Clone)]
pub struct FilterExecutedEvent {
    pub output: String,
}

/// Fired once, after the last command in a run completes, with the final
/// `__global` value; may rewrite it.
#[derive(Debug, Clone)]
pub struct PipelineCompleteEvent {
    pub value: String,
}

/// One interpreter instance: its own command queue, local variable store,
/// execution log, clock, and per-pipeline hooks. Not safe for concurrent
/// access — see spec §5; the registries it dispatches through are.
pub struct Pipeline {
    commands: Vec<PipelineCommand>,
    expanded: bool,
    locals: VariableStore,
    log: ExecutionLog,
    clock: Arc<dyn Clock>,
    filter_executing: HookRegistry<FilterExecutingEvent>,
    filter_executed: HookRegistry<FilterExecutedEvent>,
    variable_retrieving: HookRegistry<VariableRetrievingEvent>,
    variable_retrieved: HookRegistry<VariableRetrievedEvent>,
}

impl Pipeline {
    /// Construct an empty pipeline, firing the process-global
    /// pipeline-created hook with a mutable handle to it (so a subscriber
    /// can, e.g., seed a local variable before any commands are added).
    pub fn new() -> Self {
        let mut pipeline = Self {
            commands: Vec::new(),
            expanded: false,
            locals: VariableStore::new(),
            log: ExecutionLog::new(),
            clock: Arc::new(MonotonicClock::default()),
            filter_executing: HookRegistry::new(),
            filter_executed: HookRegistry::new(),
            variable_retrieving: HookRegistry::new(),
            variable_retrieved: HookRegistry::new(),
        };
        engine().pipeline_created.fire(&mut pipeline);
        pipeline
    }

    /// Construct an empty pipeline and apply `config`'s global seeds to
    /// its local store before any command runs.
    pub fn with_config(config: PipelineConfig) -> Self {
        let pipeline = Self::new();
        for seed in config.seeds {
            pipeline.locals.set(&seed.name, seed.value, seed.read_only);
        }
        pipeline
    }

    pub fn add_command(&mut self, command: PipelineCommand) -> &mut Self {
        self.expanded = false;
        self.commands.push(command);
        self
    }

    pub fn add_commands(&mut self, commands: impl IntoIterator<Item = PipelineCommand>) -> &mut Self {
        self.expanded = false;
        self.commands.extend(commands);
        self
    }

    /// Replace a test/tooling clock with a fake one.
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    /// Set a local variable directly, bypassing read-only checks — for
    /// hooks and host setup code, not for filters (which go through
    /// `safeSet` via dispatch).
    pub fn set_local_variable(&self, name: &str, value: impl Into<String>, read_only: bool) {
        self.locals.set(name, value, read_only);
    }

    pub fn local_variable(&self, name: &str) -> Result<String, PipelineError> {
        let global = &engine().globals;
        self.locals.get(name, true, Some(global), &self.variable_retrieving, &self.variable_retrieved)
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn on_filter_executing<F>(&self, f: F)
    where
        F: Fn(&mut FilterExecutingEvent) + Send + Sync + 'static,
    {
        self.filter_executing.subscribe(f);
    }

    pub fn on_filter_executed<F>(&self, f: F)
    where
        F: Fn(&mut FilterExecutedEvent) + Send + Sync + 'static,
    {
        self.filter_executed.subscribe(f);
    }

    pub fn on_variable_retrieving<F>(&self, f: F)
    where
        F: Fn(&mut VariableRetrievingEvent) + Send + Sync + 'static,
    {
        self.variable_retrieving.subscribe(f);
    }

    pub fn on_variable_retrieved<F>(&self, f: F)
    where
        F: Fn(&mut VariableRetrievedEvent) + Send + Sync + 'static,
    {
        self.variable_retrieved.subscribe(f);
    }

    /// Run the pipeline to completion: expand command factories to a fixed
    /// point, seed `__global` with `input`, then walk the label-linked
    /// command queue until it terminates. Returns the final `__global`
    /// value, after the process-global pipeline-complete hook has had a
    /// chance to rewrite it.
    pub fn execute(&mut self, input: Option<String>) -> Result<String, PipelineError> {
        self.log.clear();

        if !self.expanded {
            let commands = std::mem::take(&mut self.commands);
            self.commands = engine().registry.factories.expand(commands);
            self.expanded = true;
        }

        self.commands.retain(|c| c.label.to_lowercase() != END_LABEL);
        self.commands.push(PipelineCommand::new("core.label").with_positional(0, END_LABEL).with_label(END_LABEL));

        let len = self.commands.len();
        for i in 0..len {
            if normalize_dispatch_name(&self.commands[i].qualified_name) == "core.label" {
                if let Some(lifted) = self.commands[i].positional(0).map(str::to_string) {
                    self.commands[i].label = lifted;
                }
            }
        }
        for i in 0..len {
            if self.commands[i].send_to_label.is_none() && i + 1 < len {
                let next_label = self.commands[i + 1].label.clone();
                self.commands[i].send_to_label = Some(next_label);
            }
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, cmd) in self.commands.iter().enumerate() {
            index.insert(cmd.label.to_lowercase(), i);
        }

        let global = &engine().globals;
        self.locals.set(GLOBAL_VAR, input.unwrap_or_default(), false);

        let mut next_label = self.commands.first().map(|c| c.label.clone());

        while let Some(label) = next_label {
            let lower = label.to_lowercase();
            let idx = *index.get(&lower).ok_or_else(|| PipelineError::UnknownLabel { label: label.clone() })?;
            let command = self.commands[idx].clone();
            next_label = self.step(&command, global)?;
        }

        let final_value =
            self.locals.get(GLOBAL_VAR, false, None, &self.variable_retrieving, &self.variable_retrieved)?;
        let mut complete = PipelineCompleteEvent { value: final_value };
        engine().pipeline_complete.fire(&mut complete);
        tracing::info!(commands = len, "pipeline run complete");
        Ok(complete.value)
    }

    fn step(&mut self, command: &PipelineCommand, global: &VariableStore) -> Result<Option<String>, PipelineError> {
        let normalized = normalize_dispatch_name(&command.qualified_name);
        match normalized.as_str() {
            "core.label" => Ok(command.send_to_label.clone()),
            "core.writeto" => {
                let current =
                    self.locals.get(GLOBAL_VAR, false, None, &self.variable_retrieving, &self.variable_retrieved)?;
                let out_name = command.positional(0).unwrap_or(GLOBAL_VAR).to_string();
                self.locals.safe_set(&out_name, current)?;
                Ok(command.send_to_label.clone())
            }
            "core.readfrom" => {
                let in_name = command.positional(0).unwrap_or(GLOBAL_VAR).to_string();
                let value =
                    self.locals.get(&in_name, true, Some(global), &self.variable_retrieving, &self.variable_retrieved)?;
                self.locals.set(GLOBAL_VAR, value, false);
                Ok(command.send_to_label.clone())
            }
            "core.include" => Err(PipelineError::CommandUnavailable {
                qualified_name: normalized,
                reason: "core.include is reserved and not implemented by this engine".to_string(),
                command_text: command.original_text.clone(),
            }),
            _ => self.dispatch_filter(command, &normalized, global),
        }
    }

    fn dispatch_filter(
        &mut self,
        command: &PipelineCommand,
        normalized: &str,
        global: &VariableStore,
    ) -> Result<Option<String>, PipelineError> {
        let filter = match engine().registry.get(normalized) {
            Some(f) => f,
            None => {
                return Err(match engine().registry.hidden_reason(normalized) {
                    Some(reason) => PipelineError::CommandUnavailable {
                        qualified_name: normalized.to_string(),
                        reason,
                        command_text: command.original_text.clone(),
                    },
                    None => PipelineError::CommandMissing {
                        qualified_name: normalized.to_string(),
                        command_text: command.original_text.clone(),
                    },
                });
            }
        };

        let mut resolved_command = command.clone();
        for value in resolved_command.args.values_mut() {
            if let Some(var_name) = value.strip_prefix('$') {
                *value =
                    self.locals.get(var_name, true, Some(global), &self.variable_retrieving, &self.variable_retrieved)?;
            }
        }

        let started_at = self.clock.now_millis();
        let input = self.locals.get(
            &resolved_command.input_variable,
            true,
            Some(global),
            &self.variable_retrieving,
            &self.variable_retrieved,
        )?;

        let mut executing = FilterExecutingEvent { input, command: resolved_command };
        self.filter_executing.fire(&mut executing);
        let FilterExecutingEvent { input, command: mut resolved_command } = executing;

        let mut entry = LogEntry::new(normalized.to_string(), resolved_command.original_text.clone(), started_at);
        let result = (filter)(&input, &mut resolved_command, &mut entry);
        let elapsed = Duration::from_millis(self.clock.now_millis().saturating_sub(started_at));

        let output = match result {
            Ok(output) => output,
            Err(source) => {
                entry.elapsed = elapsed;
                entry.success = false;
                self.log.push(entry);
                tracing::warn!(qualified_name = normalized, elapsed_ms = elapsed.as_millis() as u64, error = %source, "filter failed");
                return Err(PipelineError::FilterFailure {
                    qualified_name: normalized.to_string(),
                    command_text: resolved_command.original_text.clone(),
                    source,
                });
            }
        };

        let mut executed = FilterExecutedEvent { output };
        self.filter_executed.fire(&mut executed);
        let mut output = executed.output;

        if resolved_command.append_to_output {
            let existing = self
                .locals
                .get(
                    &resolved_command.output_variable,
                    true,
                    Some(global),
                    &self.variable_retrieving,
                    &self.variable_retrieved,
                )
                .unwrap_or_default();
            output = format!("{existing}{output}");
        }

        self.locals.safe_set(&resolved_command.output_variable, output)?;

        entry.elapsed = elapsed;
        entry.success = true;
        self.log.push(entry);
        tracing::debug!(qualified_name = normalized, elapsed_ms = elapsed.as_millis() as u64, "filter dispatched");

        Ok(resolved_command.send_to_label.clone())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
