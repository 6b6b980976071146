//! Composition and execution of a resolved command list.
//!
//! On the Java platform, consecutive goal-bearing commands fold into a
//! single Maven invocation. On JavaScript every command is its own step.
//! In both cases stages run strictly in order and the first failure stops
//! the rest.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::{Context, Toolchain};
use crate::elapsed::elapsed;
use crate::error::CoreError;
use crate::flags::maven_flags;
use crate::options::{Options, Platform};
use crate::registry::Registry;
use crate::resolver::resolve;
use crate::runner::Runner;
use crate::version::{validate, verify_minimum};

/// Ordered commands to run against one set of options.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub commands: Vec<String>,
    pub options: Options,
}

impl PipelineRequest {
    /// Expands `command` unless the options ask to run it alone.
    pub fn resolve(registry: &Registry, command: &str, options: Options) -> Result<Self, CoreError> {
        let commands = resolve(registry, command, options.alone)?;
        Ok(Self { commands, options })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Validating,
    Composing,
    Invoking,
    Succeeded,
    Failed,
}

/// One step of a composed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A single Maven wrapper call executing the goals of several commands.
    Maven {
        commands: Vec<String>,
        args: Vec<String>,
    },
    /// A command's own action.
    Action(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub stages: Vec<Stage>,
}

/// Goals and extra flags of several commands, in command order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    pub goals: Vec<String>,
    pub extras: Vec<String>,
}

pub fn collect(
    registry: &Registry,
    commands: &[String],
    options: &Options,
) -> Result<Collected, CoreError> {
    let mut collected = Collected::default();
    for name in commands {
        let descriptor = registry.get(name)?;
        collected.goals.extend(descriptor.goals_for(options));
        collected.extras.extend(descriptor.extras_for(options));
    }
    Ok(collected)
}

/// Checks the parser version against every command about to run.
pub fn preconditions(
    registry: &Registry,
    commands: &[String],
    options: &Options,
) -> Result<(), CoreError> {
    validate("EO parser", &options.parser)?;
    for name in commands {
        if let Some(minimum) = registry.get(name)?.min_parser() {
            verify_minimum("EO parser", &options.parser, minimum)?;
        }
    }
    Ok(())
}

/// Turns commands into stages without touching the outside world.
pub fn compose(
    registry: &Registry,
    commands: &[String],
    options: &Options,
) -> Result<Plan, CoreError> {
    let mut plan = Plan::default();
    let mut pending: Vec<String> = Vec::new();
    for name in commands {
        let descriptor = registry.get(name)?;
        if registry.platform() == Platform::Java && descriptor.is_mergeable() {
            pending.push(name.clone());
            continue;
        }
        flush(registry, &mut pending, options, &mut plan)?;
        plan.stages.push(Stage::Action(name.clone()));
    }
    flush(registry, &mut pending, options, &mut plan)?;
    Ok(plan)
}

fn flush(
    registry: &Registry,
    pending: &mut Vec<String>,
    options: &Options,
    plan: &mut Plan,
) -> Result<(), CoreError> {
    if pending.is_empty() {
        return Ok(());
    }
    let commands = std::mem::take(pending);
    let Collected { goals, extras } = collect(registry, &commands, options)?;
    let mut args = goals;
    args.extend(maven_flags(options));
    args.extend(extras);
    plan.stages.push(Stage::Maven { commands, args });
    Ok(())
}

/// Runs the stages of `plan` one after another.
pub async fn execute(registry: &Registry, plan: Plan, ctx: &Context) -> Result<(), CoreError> {
    for stage in plan.stages {
        match stage {
            Stage::Maven { commands, args } => {
                let phase = commands.join(" \u{2192} ");
                elapsed(|tracked| async move {
                    if let Err(err) = ctx.mvnw(args, phase.clone()).await {
                        for name in &commands {
                            if let Some(hint) = registry.get(name)?.failure_hint() {
                                warn!("{hint}");
                            }
                        }
                        return Err(err);
                    }
                    tracked.print(format!("Pipeline [{phase}] done"));
                    Ok::<(), CoreError>(())
                })
                .await?
            }
            Stage::Action(name) => registry.get(&name)?.run(ctx).await?,
        }
    }
    Ok(())
}

struct Machine {
    state: PipelineState,
}

impl Machine {
    fn advance(&mut self, next: PipelineState) {
        debug!("pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn settle<T>(&mut self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if result.is_err() {
            self.advance(PipelineState::Failed);
        }
        result
    }
}

/// Validates, composes and invokes one request.
pub async fn run_pipeline(
    registry: &Registry,
    request: PipelineRequest,
    toolchain: Toolchain,
    runner: Arc<dyn Runner>,
) -> Result<(), CoreError> {
    let mut machine = Machine {
        state: PipelineState::Idle,
    };
    let PipelineRequest { commands, options } = request;

    machine.advance(PipelineState::Validating);
    let checked = preconditions(registry, &commands, &options);
    machine.settle(checked)?;

    machine.advance(PipelineState::Composing);
    let composed = compose(registry, &commands, &options);
    let plan = machine.settle(composed)?;

    machine.advance(PipelineState::Invoking);
    let ctx = Context::new(options, toolchain, runner);
    let executed = execute(registry, plan, &ctx).await;
    machine.settle(executed)?;

    machine.advance(PipelineState::Succeeded);
    Ok(())
}
