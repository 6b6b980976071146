//! Command descriptors and the context their actions run in.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::warn;

use crate::elapsed::elapsed;
use crate::error::CoreError;
use crate::flags::{MAVEN_TRAILER, eo2js_flags, maven_flags};
use crate::options::Options;
use crate::runner::{Invocation, InvocationResult, Runner};

/// Upper bound for a single `eo2js` call.
pub const EO2JS_TIMEOUT: Duration = Duration::from_secs(1_200);

/// Pure function of the options producing argument tokens.
pub type OptionsFn = Arc<dyn Fn(&Options) -> Vec<String> + Send + Sync>;

/// What a command does when it runs on its own.
pub type ActionFn =
    Arc<dyn for<'a> Fn(&'a Context) -> BoxFuture<'a, Result<(), CoreError>> + Send + Sync>;

/// Where the external tools live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Directory holding the `mvnw` wrapper; also its working directory.
    pub mvnw_home: PathBuf,
    /// Directory holding `eo2js.js` and its `resources/`.
    pub eo2js_home: PathBuf,
    pub node: PathBuf,
    pub java: PathBuf,
}

impl Toolchain {
    pub fn mvnw(&self) -> PathBuf {
        self.mvnw_home
            .join(if cfg!(windows) { "mvnw.cmd" } else { "mvnw" })
    }

    pub fn eo2js_script(&self) -> PathBuf {
        self.eo2js_home.join("eo2js.js")
    }

    pub fn eo2js_resources(&self) -> PathBuf {
        self.eo2js_home.join("resources")
    }
}

/// Everything an action needs: options, tool locations and a runner.
pub struct Context {
    pub options: Options,
    pub toolchain: Toolchain,
    pub runner: Arc<dyn Runner>,
}

impl Context {
    pub fn new(options: Options, toolchain: Toolchain, runner: Arc<dyn Runner>) -> Self {
        Self {
            options,
            toolchain,
            runner,
        }
    }

    /// One Maven wrapper call that writes into the target directory.
    pub async fn mvnw(
        &self,
        args: Vec<String>,
        phase: impl Into<String>,
    ) -> Result<InvocationResult, CoreError> {
        let invocation = self
            .maven_invocation(args)
            .watching(self.options.target(), self.options.batch)
            .phase(phase);
        self.runner.run(invocation).await
    }

    /// A Maven wrapper call with no target directory to watch.
    pub async fn mvnw_detached(&self, args: Vec<String>) -> Result<InvocationResult, CoreError> {
        let invocation = self.maven_invocation(args);
        self.runner.run(invocation).await
    }

    fn maven_invocation(&self, args: Vec<String>) -> Invocation {
        let args = args
            .into_iter()
            .chain(MAVEN_TRAILER.iter().map(|arg| arg.to_string()));
        Invocation::new(self.toolchain.mvnw(), args).cwd(&self.toolchain.mvnw_home)
    }

    /// One `eo2js` call; `command` is the keyword plus its positional args.
    pub async fn eo2js(
        &self,
        command: Vec<String>,
        tests: bool,
    ) -> Result<InvocationResult, CoreError> {
        let phase = command.first().cloned().unwrap_or_default();
        let resources = self.toolchain.eo2js_resources();
        let args = std::iter::once(self.toolchain.eo2js_script().display().to_string())
            .chain(command)
            .chain(eo2js_flags(&self.options, &resources, true, tests));
        let invocation = Invocation::new(&self.toolchain.node, args)
            .watching(self.options.target(), self.options.batch)
            .phase(phase)
            .timeout(EO2JS_TIMEOUT);
        self.runner.run(invocation).await
    }
}

/// A named pipeline step: its Maven goals, extra flags and standalone action.
///
/// Registered once per platform and never mutated afterwards.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: &'static str,
    goals: Option<OptionsFn>,
    extras: Option<OptionsFn>,
    action: Option<ActionFn>,
    requires: Option<&'static str>,
    hint: Option<&'static str>,
}

impl CommandDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            goals: None,
            extras: None,
            action: None,
            requires: None,
            hint: None,
        }
    }

    pub fn goals<F>(mut self, goals: F) -> Self
    where
        F: Fn(&Options) -> Vec<String> + Send + Sync + 'static,
    {
        self.goals = Some(Arc::new(goals));
        self
    }

    pub fn static_goals(self, goals: &'static [&'static str]) -> Self {
        self.goals(move |_| goals.iter().map(|goal| goal.to_string()).collect())
    }

    pub fn extras<F>(mut self, extras: F) -> Self
    where
        F: Fn(&Options) -> Vec<String> + Send + Sync + 'static,
    {
        self.extras = Some(Arc::new(extras));
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: for<'a> Fn(&'a Context) -> BoxFuture<'a, Result<(), CoreError>> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Minimal parser version this command works with.
    pub fn requires(mut self, minimum: &'static str) -> Self {
        self.requires = Some(minimum);
        self
    }

    /// Advice logged when this command's external call fails.
    pub fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn failure_hint(&self) -> Option<&'static str> {
        self.hint
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn min_parser(&self) -> Option<&'static str> {
        self.requires
    }

    /// Whether its goals can be folded into a shared Maven invocation.
    pub fn is_mergeable(&self) -> bool {
        self.goals.is_some() && self.action.is_none()
    }

    pub fn goals_for(&self, options: &Options) -> Vec<String> {
        self.goals.as_ref().map(|f| f(options)).unwrap_or_default()
    }

    pub fn extras_for(&self, options: &Options) -> Vec<String> {
        self.extras.as_ref().map(|f| f(options)).unwrap_or_default()
    }

    /// Runs this command alone: its action, or its goals as one Maven call.
    pub fn run<'a>(&'a self, ctx: &'a Context) -> BoxFuture<'a, Result<(), CoreError>> {
        if let Some(action) = &self.action {
            return action(ctx);
        }
        Box::pin(async move {
            if self.goals.is_none() {
                return Ok(());
            }
            let options = &ctx.options;
            let mut args = self.goals_for(options);
            args.extend(maven_flags(options));
            args.extend(self.extras_for(options));
            elapsed(|tracked| async move {
                ctx.mvnw(args, self.name).await.inspect_err(|_| {
                    if let Some(hint) = self.hint {
                        warn!("{hint}");
                    }
                })?;
                tracked.print(format!("Command [{}] done", self.name));
                Ok::<(), CoreError>(())
            })
            .await
        })
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("goals", &self.goals.is_some())
            .field("extras", &self.extras.is_some())
            .field("action", &self.action.is_some())
            .field("requires", &self.requires)
            .field("hint", &self.hint)
            .finish()
    }
}
